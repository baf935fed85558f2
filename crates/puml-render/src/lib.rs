//! `PlantUML` block rendering for reStructuredText documents.
//!
//! This crate turns `.. puml::` blocks into embedded figures:
//! - `PlantUml` runs the external renderer with a timeout and gives every
//!   image a collision-free name
//! - `place` translates sizing and alignment options into a LaTeX `figure`
//!   or an HTML `<figure>`
//! - `DocumentProcessor` rewrites whole documents, isolating failures per block
//!
//! # Architecture
//!
//! The crate is organized into modules:
//! - [`format`]: Targets (`TargetFormat`) and alignment keywords
//! - [`sizing`]: Author options, exclusivity checks, numeric parsing
//! - [`invocation`]: `DiagramRenderer` trait and the `PlantUml` command
//! - [`placement`]: Fragment composition and image references
//! - [`directive`]: `.. puml::` block scanning
//! - [`processor`]: Document-level rewriting
//!
//! # Example
//!
//! ```ignore
//! use puml_render::{PlantUml, SizingOptions, TargetFormat, place, DiagramRenderer, RenderRequest};
//!
//! let image = PlantUml::default().render(RenderRequest::new("flow.puml", "_build/_images", "eps"))?;
//! let options = SizingOptions { scale: Some("50%".to_owned()), ..Default::default() };
//! let fragment = place(&options, "Flow", "_images/puml-1.eps", TargetFormat::PageLayout)?;
//! ```

mod consts;
pub mod directive;
mod error;
pub mod format;
pub mod invocation;
pub mod placement;
pub mod processor;
pub mod sizing;

pub use consts::DEFAULT_TIMEOUT;
pub use directive::{PumlBlock, ScanResult, scan};
pub use error::{BlockError, RenderError};
pub use format::{Alignment, TargetFormat};
pub use invocation::{DiagramRenderer, PlantUml, RenderRequest};
pub use placement::{html_max_width, image_reference, latex_text_width, place};
pub use processor::{BlockFailure, DocumentPaths, DocumentProcessor, ProcessResult};
pub use sizing::{Sizing, SizingOptions, parse_fraction};
