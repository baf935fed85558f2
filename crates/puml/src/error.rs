//! CLI error types.

use puml_config::ConfigError;
use puml_render::RenderError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Render(#[from] RenderError),

    /// Blocks failed while `--strict` was set.
    #[error("{failed} of {total} diagram block(s) failed")]
    Strict { failed: usize, total: usize },

    #[error("{0}")]
    Validation(String),
}
