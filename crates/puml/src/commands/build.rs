//! `puml build` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use puml_render::{DocumentPaths, DocumentProcessor};

use super::{CommonArgs, renderer_for};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// reStructuredText document to process.
    document: PathBuf,

    #[command(flatten)]
    common: CommonArgs,

    /// Fail when any diagram block fails.
    #[arg(long)]
    strict: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config()?;
        let target = self.common.target();

        let source = std::fs::read_to_string(&self.document)?;
        let file_name = self.document.file_name().ok_or_else(|| {
            CliError::Validation(format!("not a document: {}", self.document.display()))
        })?;
        let source_dir = self
            .document
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let out_dir = &config.output_resolved.dir;
        let out_file = out_dir.join(file_name);
        if same_file(&self.document, &out_file) {
            return Err(CliError::Validation(format!(
                "output would overwrite the source document {}",
                self.document.display()
            )));
        }

        output.info(&format!("Document: {}", self.document.display()));
        output.info(&format!("Output: {}", out_file.display()));

        let (renderer, format) = renderer_for(&config, target);
        let processor = DocumentProcessor::new(renderer, target, format)
            .images_dir(&config.output_resolved.images_dir)
            .output_root(out_dir);

        let result = processor.process(
            &source,
            DocumentPaths {
                source_dir,
                output_dir: out_dir,
            },
        );

        std::fs::create_dir_all(out_dir)?;
        std::fs::write(&out_file, &result.output)?;

        for warning in &result.warnings {
            output.warning(&format!("{}: {warning}", self.document.display()));
        }
        for failure in &result.failures {
            output.error(&format!("{}: {failure}", self.document.display()));
        }

        let total = result.rendered + result.failures.len();
        if self.strict && result.has_failures() {
            return Err(CliError::Strict {
                failed: result.failures.len(),
                total,
            });
        }

        output.success(&format!(
            "Rendered {} of {total} diagram(s) to {}",
            result.rendered,
            out_file.display()
        ));
        Ok(())
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: BuildArgs,
    }

    fn parse(args: &[&str]) -> BuildArgs {
        TestCli::parse_from(std::iter::once("puml").chain(args.iter().copied())).args
    }

    #[test]
    fn test_rejects_overwriting_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let doc = temp_dir.path().join("index.rst");
        std::fs::write(&doc, "Title\n").unwrap();
        let config = temp_dir.path().join("puml.toml");
        std::fs::write(&config, "[output]\ndir = \".\"\n").unwrap();

        let args = parse(&[
            doc.to_str().unwrap(),
            "--target",
            "html",
            "--config",
            config.to_str().unwrap(),
        ]);

        assert!(matches!(args.execute(), Err(CliError::Validation(_))));
    }

    #[cfg(unix)]
    mod stub {
        use super::*;

        const SUCCEED: &str = r#"fmt="${3#-t}"
dir="$5"
name=$(basename "$6")
printf 'image' > "$dir/${name%%.*}.$fmt"
"#;

        struct Project {
            dir: tempfile::TempDir,
        }

        impl Project {
            fn new(script: &str) -> Self {
                let dir = tempfile::tempdir().unwrap();
                let root = dir.path();
                std::fs::write(root.join("renderer.sh"), script).unwrap();
                std::fs::write(
                    root.join("puml.toml"),
                    format!(
                        "[renderer]\nexecutable = \"sh {}\"\n",
                        root.join("renderer.sh").display()
                    ),
                )
                .unwrap();
                std::fs::write(root.join("flow.puml"), "@startuml\nA -> B\n@enduml\n").unwrap();
                std::fs::write(
                    root.join("index.rst"),
                    "Title\n=====\n\n.. puml::\n   :file: flow.puml\n   :scale: 50%\n\n   Flow\n",
                )
                .unwrap();
                Self { dir }
            }

            fn path(&self, name: &str) -> String {
                self.dir.path().join(name).to_string_lossy().into_owned()
            }

            fn build(&self, extra: &[&str]) -> Result<(), CliError> {
                let doc = self.path("index.rst");
                let config = self.path("puml.toml");
                let mut args = vec![doc.as_str(), "--config", config.as_str()];
                args.extend_from_slice(extra);
                parse(&args).execute()
            }
        }

        #[test]
        fn test_build_latex_document() {
            let project = Project::new(SUCCEED);

            project.build(&["--target", "latex"]).unwrap();

            let written =
                std::fs::read_to_string(project.dir.path().join("_build/index.rst")).unwrap();
            assert!(written.contains(".. raw:: latex"));
            assert!(written.contains("scale=0.500,"));
            assert!(written.contains("\\caption{Flow}"));
            assert!(written.contains("{_images/puml-"));

            let images: Vec<_> = std::fs::read_dir(project.dir.path().join("_build/_images"))
                .unwrap()
                .collect();
            assert_eq!(images.len(), 1);
        }

        #[test]
        fn test_strict_fails_on_block_failure() {
            let project = Project::new("exit 2\n");

            assert!(project.build(&["--target", "html"]).is_ok());
            assert!(matches!(
                project.build(&["--target", "html", "--strict"]),
                Err(CliError::Strict {
                    failed: 1,
                    total: 1
                })
            ));

            let written =
                std::fs::read_to_string(project.dir.path().join("_build/index.rst")).unwrap();
            assert!(written.contains(".. error::"));
        }
    }
}
