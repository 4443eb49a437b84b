//! CLI error types with miette diagnostics.
//!
//! Maps library errors into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

/// Exit codes for scripting.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const CONFIG: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const SYNC: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("no hub configured")]
    #[diagnostic(
        code(hearth::not_configured),
        help(
            "Save connection settings with: hearth login <url> <token>\n\
             Or set HEARTH_URL and HEARTH_TOKEN environment variables."
        )
    )]
    NotConfigured,

    #[error(transparent)]
    #[diagnostic(code(hearth::config))]
    Config(#[from] hearth_config::ConfigError),

    #[error(transparent)]
    #[diagnostic(
        code(hearth::client),
        help("Check the hub URL and access token in your settings.")
    )]
    Client(#[from] hearth_api::Error),

    #[error(transparent)]
    #[diagnostic(code(hearth::core))]
    Core(#[from] hearth_core::CoreError),

    #[error("synchronization failed: {message}")]
    #[diagnostic(
        code(hearth::sync_failed),
        help("Check that the hub is running and reachable, then retry.")
    )]
    SyncFailed { message: String },

    #[error("entity '{entity_id}' is not a light, switch, or sensor")]
    #[diagnostic(
        code(hearth::unsupported_entity),
        help("Only light.*, switch.*, and sensor.* entities are supported.")
    )]
    UnsupportedEntity { entity_id: String },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotConfigured | Self::Config(_) => exit_code::CONFIG,
            Self::Core(hearth_core::CoreError::EntityNotFound { .. })
            | Self::UnsupportedEntity { .. } => exit_code::NOT_FOUND,
            Self::SyncFailed { .. } => exit_code::SYNC,
            Self::Client(_) | Self::Core(_) => exit_code::GENERAL,
        }
    }
}
