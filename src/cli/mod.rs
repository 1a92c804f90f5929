//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the visureapi binary.

use clap::{Args, Parser, Subcommand};

use crate::config::VisureConfig;

/// Visure ALM command-line interface.
#[derive(Parser, Debug)]
#[command(name = "visureapi", about = "Visure ALM API CLI", version)]
pub struct Cli {
    #[command(flatten)]
    pub connection: Connection,

    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Log requests and hydration decisions to stderr.
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Server and credentials.
#[derive(Args, Debug, Clone)]
pub struct Connection {
    /// Server root URL.
    #[arg(long, env = "VISURE_URL", global = true)]
    pub url: Option<String>,

    #[arg(long, env = "VISURE_USERNAME", global = true)]
    pub username: Option<String>,

    #[arg(long, env = "VISURE_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Skip TLS certificate verification.
    #[arg(long, global = true, default_value = "false")]
    pub insecure: bool,
}

impl Connection {
    /// Build a session config, failing on the first missing setting.
    pub fn to_config(&self) -> crate::Result<VisureConfig> {
        let url = required(&self.url, "--url or VISURE_URL")?;
        let username = required(&self.username, "--username or VISURE_USERNAME")?;
        let password = required(&self.password, "--password or VISURE_PASSWORD")?;

        Ok(VisureConfig::new(url, username, password)
            .with_verify_tls(!self.insecure)
            .with_auto_logout(false))
    }
}

fn required<'a>(value: &'a Option<String>, hint: &str) -> crate::Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| crate::VisureError::ConfigMissing(format!("{hint} is required")))
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the projects visible to the user.
    Projects,

    /// List the specifications of a project.
    Specs {
        /// Project id.
        #[arg(long, short)]
        project: i64,
    },

    /// List the elements of a specification.
    Elements {
        #[arg(long, short)]
        project: i64,

        /// Specification id.
        spec: i64,

        /// Server-side search string.
        #[arg(long)]
        search: Option<String>,

        /// Also fetch every element's attributes.
        #[arg(long)]
        deep: bool,
    },

    /// List the attributes of an element.
    Attributes {
        #[arg(long, short)]
        project: i64,

        /// Element id.
        element: i64,
    },

    /// List the attribute types defined in a project.
    AttributeTypes {
        #[arg(long, short)]
        project: i64,
    },

    /// Rename an element.
    SetName {
        #[arg(long, short)]
        project: i64,
        element: i64,
        name: String,
    },

    /// Change an element's code.
    SetCode {
        #[arg(long, short)]
        project: i64,
        element: i64,
        code: String,
    },

    /// Replace an element's description.
    SetDescription {
        #[arg(long, short)]
        project: i64,
        element: i64,
        description: String,
    },

    /// Set an element's type (e.g. Heading, Item, Text).
    SetType {
        #[arg(long, short)]
        project: i64,
        element: i64,
        #[arg(value_name = "TYPE")]
        requirement_type: String,
    },

    /// Link two elements.
    Link {
        #[arg(long, short)]
        project: i64,

        /// Source element id.
        source: i64,

        /// Target element id.
        target: i64,

        /// Relationship type id (defaults to the first available type).
        #[arg(long = "type", value_name = "ID")]
        relationship_type: Option<i64>,

        /// Mark the link as suspect.
        #[arg(long)]
        suspect: bool,

        #[arg(long)]
        reason: Option<String>,
    },

    /// Print the in-line link markup for an element field.
    InlineLink {
        #[arg(long, short)]
        project: i64,
        element: i64,

        /// Code, Name, Description, or a numeric field index.
        field: String,
    },
}
