//! Fatal startup errors with miette diagnostics.
//!
//! Tool-call failures never reach this type: they become structured error
//! payloads. Only config loading and transport setup end the process.

use miette::Diagnostic;
use thiserror::Error;

use unimux_config::ConfigError;
use unimux_core::CoreError;

#[derive(Debug, Error, Diagnostic)]
pub enum ServerError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("No targets configured")]
    #[diagnostic(
        code(unimux::no_targets),
        help(
            "Set UNIFI_TARGETS to a JSON array of targets, or add [[targets]]\n\
             entries to the config file (see --config / UNIMUX_CONFIG)."
        )
    )]
    NoTargets,

    #[error(transparent)]
    #[diagnostic(
        code(unimux::config),
        help("Check the config file and the UNIFI_TARGETS environment variable.")
    )]
    Config(ConfigError),

    #[error(transparent)]
    #[diagnostic(code(unimux::registry))]
    Registry(#[from] CoreError),

    // ── MCP transport ────────────────────────────────────────────────
    #[error("MCP transport failed: {0}")]
    #[diagnostic(
        code(unimux::transport),
        help("The MCP client must speak JSON-RPC on the server's stdin/stdout.")
    )]
    Transport(String),

    #[error(transparent)]
    #[diagnostic(code(unimux::io))]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for ServerError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoTargets => Self::NoTargets,
            other => Self::Config(other),
        }
    }
}
