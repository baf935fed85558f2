//! Internal constants for diagram rendering.

use std::time::Duration;

/// Default time to wait for the renderer before killing it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Interval between exit checks while the renderer runs.
pub const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Charset passed to the renderer.
pub const CHARSET: &str = "utf-8";

/// Prefix for rendered image file names.
pub const IMAGE_PREFIX: &str = "puml-";

/// Prefix for inline diagram sources written next to the images.
pub const INLINE_SOURCE_PREFIX: &str = "puml-src-";

/// Share of a LaTeX `figwidth` actually emitted. A figure exactly as wide as
/// the text block forces an overfull line.
pub const FIGWIDTH_CAP: f64 = 0.99;
