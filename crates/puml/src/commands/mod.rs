//! CLI command implementations.

mod build;
mod render;

pub(crate) use build::BuildArgs;
pub(crate) use render::RenderArgs;

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use puml_config::{CliSettings, Config};
use puml_render::{PlantUml, TargetFormat};

use crate::error::CliError;

/// Output target selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum TargetArg {
    /// Typeset output with `\includegraphics` figures.
    Latex,
    /// Web output with `<figure>` elements.
    Html,
}

impl From<TargetArg> for TargetFormat {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Latex => Self::PageLayout,
            TargetArg::Html => Self::BoxModel,
        }
    }
}

/// Options shared by all commands.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Output target.
    #[arg(short, long, value_enum)]
    target: TargetArg,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover puml.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Renderer command, e.g. "java -jar plantuml.jar" (overrides config).
    #[arg(long, env = "PUML_EXECUTABLE")]
    executable: Option<String>,

    /// Seconds to wait for the renderer (overrides config).
    #[arg(long)]
    timeout: Option<u64>,
}

impl CommonArgs {
    pub(crate) fn target(&self) -> TargetFormat {
        self.target.into()
    }

    /// Load configuration with command-line overrides applied.
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            executable: self.executable.clone(),
            output_dir: self.output_dir.clone(),
            timeout_secs: self.timeout,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Renderer and image format for `target`.
pub(crate) fn renderer_for(config: &Config, target: TargetFormat) -> (PlantUml, &str) {
    let renderer = PlantUml::new(&config.renderer.executable).timeout(config.renderer.timeout());
    let format = match target {
        TargetFormat::PageLayout => config.renderer.latex_format.as_str(),
        TargetFormat::BoxModel => config.renderer.html_format.as_str(),
    };
    (renderer, format)
}
