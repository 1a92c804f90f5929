//! Authenticated session and the root [`Visure`] handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tokio::runtime::RuntimeFlavor;
use tokio::sync::Mutex;

use crate::client::VisureClient;
use crate::config::VisureConfig;
use crate::error::{Result, VisureError};
use crate::hydrate::{HydrationContext, ParserRegistry};
use crate::models::{LicenseType, Project};
use crate::rest::auth::{AccessToken, AuthResponse};
use crate::rest;
use crate::traits::FromData;

/// Profile of the authenticated user, as returned at login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<&AuthResponse> for UserProfile {
    fn from(auth: &AuthResponse) -> Self {
        Self {
            id: auth.id,
            username: auth.username.clone(),
            email: auth.email.clone(),
            first_name: auth.first_name.clone(),
            last_name: auth.last_name.clone(),
        }
    }
}

/// Shared session state.
///
/// Every project, specification and element holds a clone, so that it can
/// issue authenticated calls on its own. Clones are cheap and share the
/// token, the parser registry and the active-project cursor.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    client: VisureClient,
    registry: ParserRegistry,
    /// Server-side active project; one slot for the whole session.
    active_project: Mutex<Option<i64>>,
    refresh_token: RwLock<Option<String>>,
    authenticated: AtomicBool,
    tolerate_activation_server_error: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("client", &self.inner.client)
            .field("registry", &self.inner.registry)
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create an unauthenticated session around `client`.
    pub fn new(client: VisureClient, registry: ParserRegistry) -> Self {
        Self::build(client, registry, false)
    }

    fn build(
        client: VisureClient,
        registry: ParserRegistry,
        tolerate_activation_server_error: bool,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                client,
                registry,
                active_project: Mutex::new(None),
                refresh_token: RwLock::new(None),
                authenticated: AtomicBool::new(false),
                tolerate_activation_server_error,
            }),
        }
    }

    pub fn client(&self) -> &VisureClient {
        &self.inner.client
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.inner.registry
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.authenticated.load(Ordering::SeqCst)
    }

    /// Id of the project the server currently treats as active.
    pub async fn active_project(&self) -> Option<i64> {
        *self.inner.active_project.lock().await
    }

    /// Log in and keep the returned tokens.
    ///
    /// # Errors
    ///
    /// Returns [`VisureError::Authentication`] if the response carries no
    /// access token; the session then stays unauthenticated.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        license_type: LicenseType,
    ) -> Result<AuthResponse> {
        let auth = rest::auth::authenticate(self.client(), username, password, license_type).await?;

        let Some(token) = auth.access_token.clone() else {
            self.inner.authenticated.store(false, Ordering::SeqCst);
            return Err(VisureError::Authentication(format!(
                "could not retrieve access token from {}",
                self.client().api_url()
            )));
        };

        self.store_tokens(token);
        tracing::debug!(user = ?auth.username, "authenticated");
        Ok(auth)
    }

    /// Exchange the refresh token for a new access token.
    pub async fn refresh(&self) -> Result<()> {
        let refresh_token = self
            .inner
            .refresh_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(VisureError::NotAuthenticated)?;

        let auth = rest::auth::token_refresh(self.client(), &refresh_token).await?;
        let token = auth.access_token.ok_or_else(|| {
            VisureError::Authentication("token refresh returned no access token".to_string())
        })?;

        self.store_tokens(token);
        Ok(())
    }

    /// End the session on the server. Does nothing if already logged out.
    pub async fn logout(&self) -> Result<()> {
        if !self.is_authenticated() {
            return Ok(());
        }

        rest::auth::logout(self.client()).await?;

        self.inner.authenticated.store(false, Ordering::SeqCst);
        self.client().set_token(None);
        *self
            .inner
            .refresh_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        *self.inner.active_project.lock().await = None;
        tracing::debug!("logged out");
        Ok(())
    }

    fn store_tokens(&self, token: AccessToken) {
        self.client().set_token(Some(token.token));
        *self
            .inner
            .refresh_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token.refresh_token;
        self.inner.authenticated.store(true, Ordering::SeqCst);
    }

    /// Make `project_id` the active project unless it already is.
    ///
    /// `group` is only evaluated when an activation call is needed.
    pub(crate) async fn activate_project<F>(&self, project_id: i64, group: F) -> Result<()>
    where
        F: FnOnce() -> Result<i64>,
    {
        if !self.is_authenticated() {
            return Err(VisureError::NotAuthenticated);
        }

        // Held across the call so concurrent activations are serialized.
        let mut current = self.inner.active_project.lock().await;
        if *current == Some(project_id) {
            return Ok(());
        }

        let group = group()?;
        tracing::debug!(project_id, group, previous = ?*current, "activating project");

        match rest::project::set_active_project(self.client(), project_id, group).await {
            Ok(_) => {}
            Err(VisureError::ApiError {
                message,
                status_code: Some(500),
            }) if self.inner.tolerate_activation_server_error => {
                tracing::warn!(
                    project_id,
                    %message,
                    "project activation returned a server error, assuming it is already active"
                );
            }
            Err(err) => return Err(err),
        }

        *current = Some(project_id);
        Ok(())
    }
}

/// Root handle of an authenticated Visure session.
///
/// Owns the session and the list of projects visible to the user.
///
/// With [`VisureConfig::auto_logout`] set, dropping an authenticated handle
/// logs out before `drop` returns. That needs a multi-thread tokio runtime;
/// on a current-thread runtime, or outside any runtime, the drop only logs a
/// warning and the session stays open on the server. Call
/// [`logout`](Self::logout) explicitly there.
///
/// # Example
///
/// ```no_run
/// use visureapi::{ElementQuery, Visure};
///
/// #[tokio::main]
/// async fn main() -> visureapi::Result<()> {
///     let mut visure = Visure::from_env().await?;
///
///     let project = visure.projects_mut().first_mut().expect("no projects");
///     project.fetch_specifications().await?;
///     for spec in project.specifications_mut() {
///         let count = spec.fetch_elements(&ElementQuery::default()).await?.len();
///         println!("{spec}: {count} elements");
///     }
///
///     visure.logout().await
/// }
/// ```
pub struct Visure {
    session: Session,
    user: UserProfile,
    projects: Vec<Project>,
    auto_logout: bool,
}

impl std::fmt::Debug for Visure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visure")
            .field("session", &self.session)
            .field("user", &self.user.username)
            .field("projects", &self.projects.len())
            .finish_non_exhaustive()
    }
}

impl Visure {
    /// Authenticate with the default parser registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the request fails, or the
    /// server does not hand out an access token.
    pub async fn connect(config: VisureConfig) -> Result<Self> {
        Self::connect_with_registry(config, ParserRegistry::default()).await
    }

    /// Authenticate, hydrating responses with `registry`.
    pub async fn connect_with_registry(
        config: VisureConfig,
        registry: ParserRegistry,
    ) -> Result<Self> {
        let client = VisureClient::new(&config.url, config.verify_tls)?;
        let session = Session::build(client, registry, config.tolerate_activation_server_error);

        let auth = session
            .login(&config.username, &config.password, config.license_type)
            .await?;

        let ctx = HydrationContext::new(&session);
        let projects = auth
            .projects
            .iter()
            .map(|raw| Project::from_data(raw, &ctx))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            user: UserProfile::from(&auth),
            session,
            projects,
            auto_logout: config.auto_logout,
        })
    }

    /// Authenticate using [`VisureConfig::from_env`].
    pub async fn from_env() -> Result<Self> {
        Self::connect(VisureConfig::from_env()?).await
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn projects_mut(&mut self) -> &mut [Project] {
        &mut self.projects
    }

    pub fn project(&self, id: i64) -> Option<&Project> {
        self.projects.iter().find(|p| p.id() == id)
    }

    pub fn project_mut(&mut self, id: i64) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id() == id)
    }

    pub fn project_by_name(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name.as_deref() == Some(name))
    }

    /// Re-fetch the projects visible to the user, replacing the list.
    ///
    /// With `deep`, each project's details are refreshed as well.
    pub async fn fetch_projects(&mut self, deep: bool) -> Result<&[Project]> {
        let raw = rest::project::get_projects(self.session.client()).await?;

        let ctx = HydrationContext::new(&self.session);
        let mut projects = raw
            .iter()
            .map(|r| Project::from_data(r, &ctx))
            .collect::<Result<Vec<_>>>()?;

        if deep {
            for project in &mut projects {
                project.refresh_details().await?;
            }
        }

        self.projects = projects;
        Ok(&self.projects)
    }

    /// Exchange the refresh token for a new access token.
    pub async fn refresh_token(&self) -> Result<()> {
        self.session.refresh().await
    }

    /// End the session on the server.
    pub async fn logout(&self) -> Result<()> {
        self.session.logout().await
    }
}

impl Drop for Visure {
    fn drop(&mut self) {
        if !self.auto_logout || !self.session.is_authenticated() {
            return;
        }

        // Blocks until the request completes so a runtime shutting down
        // right after the drop cannot cancel it.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                let result =
                    tokio::task::block_in_place(|| handle.block_on(self.session.logout()));
                if let Err(err) = result {
                    tracing::warn!(error = %err, "logout on drop failed");
                }
            }
            Ok(_) => {
                tracing::warn!(
                    "cannot block on a current-thread runtime, session left open on the server; \
                     call logout() before dropping"
                );
            }
            Err(_) => {
                tracing::warn!("no async runtime available, session left open on the server");
            }
        }
    }
}
