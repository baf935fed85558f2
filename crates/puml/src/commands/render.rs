//! `puml render` command implementation.

use std::path::PathBuf;

use clap::Args;
use puml_render::{DiagramRenderer, RenderRequest};

use super::{CommonArgs, renderer_for};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Diagram source file.
    source: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config()?;

        if !self.source.is_file() {
            return Err(CliError::Validation(format!(
                "diagram source not found: {}",
                self.source.display()
            )));
        }

        let (renderer, format) = renderer_for(&config, self.common.target());
        tracing::info!(source = %self.source.display(), format, "Rendering diagram");

        let image = renderer.render(RenderRequest::new(
            &self.source,
            &config.output_resolved.images_dir,
            format,
        ))?;

        output.result(&image.display().to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: RenderArgs,
    }

    #[test]
    fn test_missing_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = temp_dir.path().join("puml.toml");
        std::fs::write(&config, "").unwrap();
        let missing = temp_dir.path().join("missing.puml");

        let args = TestCli::parse_from([
            "puml",
            missing.to_str().unwrap(),
            "--target",
            "latex",
            "--config",
            config.to_str().unwrap(),
        ])
        .args;

        assert!(matches!(args.execute(), Err(CliError::Validation(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_renderer_failure_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let script = temp_dir.path().join("renderer.sh");
        std::fs::write(&script, "exit 1\n").unwrap();
        let config = temp_dir.path().join("puml.toml");
        std::fs::write(
            &config,
            format!("[renderer]\nexecutable = \"sh {}\"\n", script.display()),
        )
        .unwrap();
        let source = temp_dir.path().join("flow.puml");
        std::fs::write(&source, "@startuml\nA -> B\n@enduml\n").unwrap();

        let args = TestCli::parse_from([
            "puml",
            source.to_str().unwrap(),
            "--target",
            "html",
            "--config",
            config.to_str().unwrap(),
        ])
        .args;

        assert!(matches!(args.execute(), Err(CliError::Render(_))));
    }
}
