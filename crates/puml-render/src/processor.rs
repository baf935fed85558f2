//! Document-level processing of `puml` blocks.
//!
//! [`DocumentProcessor`] rewrites a reStructuredText document: every
//! `.. puml::` block is rendered and replaced by a `.. raw::` directive
//! holding the fragment for the active target. A block that fails becomes an
//! `.. error::` admonition; the remaining blocks are still processed.

use std::fmt;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::consts::INLINE_SOURCE_PREFIX;
use crate::directive::{PumlBlock, scan};
use crate::error::{BlockError, RenderError};
use crate::format::TargetFormat;
use crate::invocation::{DiagramRenderer, RenderRequest};
use crate::placement::{image_reference, place};

/// Locations of the document being processed.
#[derive(Debug, Clone, Copy)]
pub struct DocumentPaths<'a> {
    /// Directory of the source document; `:file:` resolves against it.
    pub source_dir: &'a Path,
    /// Directory the rewritten document is written to.
    pub output_dir: &'a Path,
}

/// A block that could not be rendered.
#[derive(Debug)]
pub struct BlockFailure {
    /// 1-based line of the directive marker.
    pub line: usize,
    /// `:file:` option of the block, if any.
    pub file: Option<String>,
    pub error: BlockError,
}

impl fmt::Display for BlockFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)?;
        if let Some(file) = &self.file {
            write!(f, " ({file})")?;
        }
        write!(f, ": {}", self.error)
    }
}

/// Result of processing one document.
#[derive(Debug, Default)]
pub struct ProcessResult {
    /// Rewritten document.
    pub output: String,
    /// Number of blocks rendered successfully.
    pub rendered: usize,
    /// Non-fatal issues (ignored options and arguments).
    pub warnings: Vec<String>,
    /// Blocks that failed.
    pub failures: Vec<BlockFailure>,
}

impl ProcessResult {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Renders the `puml` blocks of documents for one target.
///
/// # Example
///
/// ```ignore
/// use puml_render::{DocumentPaths, DocumentProcessor, PlantUml, TargetFormat};
///
/// let processor = DocumentProcessor::new(PlantUml::default(), TargetFormat::BoxModel, "png")
///     .images_dir("_build/_images")
///     .output_root("_build");
///
/// let result = processor.process(&source, DocumentPaths {
///     source_dir: Path::new("docs"),
///     output_dir: Path::new("_build"),
/// });
/// ```
pub struct DocumentProcessor<R> {
    renderer: R,
    target: TargetFormat,
    /// Image format requested from the renderer.
    output_format: String,
    /// Directory receiving rendered images.
    images_dir: PathBuf,
    /// Directory LaTeX image references are relative to.
    output_root: PathBuf,
}

impl<R: DiagramRenderer> DocumentProcessor<R> {
    #[must_use]
    pub fn new(renderer: R, target: TargetFormat, output_format: impl Into<String>) -> Self {
        Self {
            renderer,
            target,
            output_format: output_format.into(),
            images_dir: PathBuf::from("_build/_images"),
            output_root: PathBuf::from("_build"),
        }
    }

    /// Set the directory receiving rendered images.
    #[must_use]
    pub fn images_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.images_dir = dir.into();
        self
    }

    /// Set the build output root. LaTeX references images relative to it.
    #[must_use]
    pub fn output_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_root = dir.into();
        self
    }

    #[must_use]
    pub fn target(&self) -> TargetFormat {
        self.target
    }

    /// Render every block of `source` and return the rewritten document.
    pub fn process(&self, source: &str, paths: DocumentPaths<'_>) -> ProcessResult {
        let lines: Vec<&str> = source.lines().collect();
        let scanned = scan(&lines);

        let mut result = ProcessResult {
            warnings: scanned.warnings,
            ..ProcessResult::default()
        };
        let mut out: Vec<String> = Vec::with_capacity(lines.len());
        let mut cursor = 0;

        for block in &scanned.blocks {
            out.extend(lines[cursor..block.start].iter().map(|l| (*l).to_owned()));
            cursor = block.end;

            match self.process_block(block, paths) {
                Ok(fragment) => {
                    tracing::info!(line = block.line, caption = %block.caption, "Rendered diagram");
                    result.rendered += 1;
                    out.extend(raw_directive(&block.indent, self.target, &fragment));
                }
                Err(error) => {
                    let failure = BlockFailure {
                        line: block.line,
                        file: block.file.clone(),
                        error,
                    };
                    tracing::warn!(%failure, "Diagram block failed");
                    out.extend(error_admonition(&block.indent, &failure));
                    result.failures.push(failure);
                }
            }
        }
        out.extend(lines[cursor..].iter().map(|l| (*l).to_owned()));

        result.output = out.join("\n");
        if source.ends_with('\n') {
            result.output.push('\n');
        }
        result
    }

    /// Render one block and compose its fragment.
    ///
    /// Sizing is validated before anything touches the filesystem or the
    /// renderer.
    fn process_block(
        &self,
        block: &PumlBlock,
        paths: DocumentPaths<'_>,
    ) -> Result<String, BlockError> {
        block.sizing.resolve(&block.caption)?;

        let (source_path, image) = match &block.file {
            Some(file) => {
                let source_path = paths.source_dir.join(file);
                if !source_path.is_file() {
                    return Err(BlockError::SourceNotFound(source_path));
                }
                let image = self.render(source_path.clone())?;
                (source_path, image)
            }
            None => {
                let inline = block.inline_source().ok_or(BlockError::MissingSource)?;
                self.render_inline(&inline)?
            }
        };

        if !image.is_file() {
            return Err(RenderError::MissingRenderedFile {
                source_path,
                expected: image,
            }
            .into());
        }

        let base = match self.target {
            TargetFormat::PageLayout => std::path::absolute(&self.output_root)?,
            TargetFormat::BoxModel => std::path::absolute(paths.output_dir)?,
        };
        let image = std::path::absolute(&image)?;
        let reference = image_reference(&image, &base);

        place(&block.sizing, &block.caption, &reference, self.target)
    }

    fn render(&self, source_path: PathBuf) -> Result<PathBuf, RenderError> {
        self.renderer.render(RenderRequest::new(
            source_path,
            &self.images_dir,
            &self.output_format,
        ))
    }

    /// Write inline diagram source next to the images, render it, and remove
    /// the temporary source. Returns the temporary source path and the image.
    fn render_inline(&self, inline: &str) -> Result<(PathBuf, PathBuf), BlockError> {
        std::fs::create_dir_all(&self.images_dir)?;
        let source_path = self
            .images_dir
            .join(format!("{INLINE_SOURCE_PREFIX}{}.puml", Uuid::new_v4()));
        std::fs::write(&source_path, inline)?;

        let rendered = self.render(source_path.clone());
        if let Err(e) = std::fs::remove_file(&source_path) {
            tracing::debug!(path = %source_path.display(), error = %e, "Failed to remove inline source");
        }
        Ok((source_path, rendered?))
    }
}

/// `.. raw::` directive holding `fragment`, indented like the original block.
fn raw_directive(indent: &str, target: TargetFormat, fragment: &str) -> Vec<String> {
    let mut lines = vec![format!("{indent}.. raw:: {}", target.raw_format()), String::new()];
    lines.extend(indented(indent, fragment));
    lines
}

/// `.. error::` admonition describing a failed block.
fn error_admonition(indent: &str, failure: &BlockFailure) -> Vec<String> {
    let message = format!("Diagram rendering failed: {failure}");
    let mut lines = vec![format!("{indent}.. error::"), String::new()];
    lines.extend(indented(indent, &message));
    lines
}

fn indented(indent: &str, text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{indent}   {line}")
            }
        })
        .collect()
}
