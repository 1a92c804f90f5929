//! Connection settings for a Visure session.

use std::env;

use crate::error::{Result, VisureError};
use crate::models::LicenseType;

/// Settings used by [`Visure::connect`](crate::Visure::connect).
///
/// # Example
///
/// ```no_run
/// use visureapi::VisureConfig;
///
/// let config = VisureConfig::new("https://visure.example.com", "alice", "secret")
///     .with_auto_logout(false);
/// ```
#[derive(Clone)]
pub struct VisureConfig {
    /// Server root, e.g. `https://visure.example.com`.
    pub url: String,
    pub username: String,
    pub password: String,
    /// License requested at login.
    pub license_type: LicenseType,
    /// Log out when the [`Visure`](crate::Visure) handle is dropped.
    pub auto_logout: bool,
    /// Verify the server's TLS certificate.
    pub verify_tls: bool,
    /// Treat an HTTP 500 from the project activation call as "already active".
    ///
    /// Some servers answer a redundant activation with a bare server error.
    /// Only that one status on that one call is ignored.
    pub tolerate_activation_server_error: bool,
}

impl std::fmt::Debug for VisureConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisureConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("license_type", &self.license_type)
            .field("auto_logout", &self.auto_logout)
            .field("verify_tls", &self.verify_tls)
            .finish_non_exhaustive()
    }
}

impl VisureConfig {
    /// Create a config with default flags.
    pub fn new(url: &str, username: &str, password: &str) -> Self {
        Self {
            url: url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            license_type: LicenseType::Authoring,
            auto_logout: true,
            verify_tls: true,
            tolerate_activation_server_error: false,
        }
    }

    /// Create a config from environment variables.
    ///
    /// Reads `VISURE_URL`, `VISURE_USERNAME` and `VISURE_PASSWORD`, plus the
    /// optional `VISURE_VERIFY_TLS` (`false`/`0` disables verification).
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is not set.
    pub fn from_env() -> Result<Self> {
        let url = required_var("VISURE_URL")?;
        let username = required_var("VISURE_USERNAME")?;
        let password = required_var("VISURE_PASSWORD")?;

        let verify_tls = env::var("VISURE_VERIFY_TLS")
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        Ok(Self::new(&url, &username, &password).with_verify_tls(verify_tls))
    }

    #[must_use]
    pub fn with_license_type(mut self, license_type: LicenseType) -> Self {
        self.license_type = license_type;
        self
    }

    #[must_use]
    pub fn with_auto_logout(mut self, auto_logout: bool) -> Self {
        self.auto_logout = auto_logout;
        self
    }

    #[must_use]
    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    #[must_use]
    pub fn with_tolerate_activation_server_error(mut self, tolerate: bool) -> Self {
        self.tolerate_activation_server_error = tolerate;
        self
    }
}

fn required_var(name: &str) -> Result<String> {
    env::var(name)
        .map_err(|_| VisureError::ConfigMissing(format!("{name} environment variable not set")))
}
