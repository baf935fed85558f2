//! Error types for diagram rendering and block processing.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

/// Failure of a single renderer invocation.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The renderer could not be started (missing executable, permissions).
    #[error("failed to launch renderer '{executable}': {source}")]
    ToolMissing {
        executable: String,
        #[source]
        source: io::Error,
    },

    /// The renderer exited with a nonzero status.
    #[error("renderer '{executable}' failed ({status}){}", stderr_suffix(.stderr))]
    ToolFailure {
        executable: String,
        status: ExitStatus,
        /// Diagnostic output captured from the renderer.
        stderr: String,
    },

    /// The renderer was killed after exceeding the timeout.
    #[error("renderer '{executable}' did not finish within {}s", .timeout.as_secs_f64())]
    Timeout {
        executable: String,
        timeout: Duration,
    },

    /// The renderer exited successfully but the expected image never appeared.
    #[error(
        "rendering {} produced no image (expected {})",
        .source_path.display(),
        .expected.display()
    )]
    MissingRenderedFile {
        source_path: PathBuf,
        expected: PathBuf,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Failure of one `puml` block. Never aborts the rest of the document.
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    /// `figwidth` combined with explicit sizing.
    #[error("figwidth cannot be combined with {conflicting} (caption '{caption}')")]
    ConfigurationConflict {
        caption: String,
        conflicting: &'static str,
    },

    /// A scale or fraction that is neither a number nor a percentage.
    #[error("invalid {option} value '{value}': expected a number or a percentage such as 0.5 or 50%")]
    InvalidNumber { option: &'static str, value: String },

    /// Neither `:file:` nor inline diagram source.
    #[error("block has neither a :file: option nor inline diagram source")]
    MissingSource,

    /// `:file:` points at nothing.
    #[error("diagram source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
