//! Fragment composition for rendered diagrams.
//!
//! Translates a block's sizing and alignment options into the markup of the
//! active target:
//! - LaTeX: a `figure` environment with `\includegraphics` options
//! - HTML: a `<figure>` with an alignment class and `max-width` style

use std::fmt::Write;
use std::path::{Component, Path};

use crate::consts::FIGWIDTH_CAP;
use crate::error::BlockError;
use crate::format::{Alignment, TargetFormat};
use crate::sizing::{Sizing, SizingOptions};

/// Compose the fragment embedding `image` for `target`.
///
/// `image` is the reference as it should appear in the markup (see
/// [`image_reference`]). Fails when the sizing options are inconsistent;
/// composition itself has no side effects.
pub fn place(
    options: &SizingOptions,
    caption: &str,
    image: &str,
    target: TargetFormat,
) -> Result<String, BlockError> {
    let sizing = options.resolve(caption)?;
    let alignment = Alignment::resolve(sizing.align, target);

    let fragment = match target {
        TargetFormat::PageLayout => latex_fragment(&sizing, alignment, caption, image),
        TargetFormat::BoxModel => {
            if options.has_absolute_sizing() {
                tracing::warn!(
                    caption,
                    "width, height and scale are not supported for HTML output, ignoring"
                );
            }
            html_fragment(&sizing, alignment, caption, image)
        }
    };
    Ok(fragment)
}

/// Text-width fraction emitted for a LaTeX `figwidth`.
#[must_use]
pub fn latex_text_width(figwidth: f64) -> f64 {
    figwidth * FIGWIDTH_CAP
}

/// Whole-number `max-width` percentage for an HTML `figwidth`.
///
/// The percentage is snapped to six decimals before rounding so that a value
/// written as `14.5%` rounds up like the author wrote it.
#[must_use]
pub fn html_max_width(figwidth: f64) -> f64 {
    let percent = (figwidth * 100.0 * 1e6).round() / 1e6;
    percent.round()
}

/// `\includegraphics` option list, each entry followed by a comma.
fn latex_graphics_options(sizing: &Sizing<'_>) -> String {
    let mut opts = String::new();
    if let Some(width) = sizing.width {
        let _ = write!(opts, "width={width},");
    }
    if let Some(height) = sizing.height {
        let _ = write!(opts, "height={height},");
    }
    match (sizing.figwidth, sizing.scale) {
        (Some(figwidth), _) => {
            let _ = write!(opts, "width={:.3}\\textwidth,", latex_text_width(figwidth));
        }
        (None, Some(scale)) => {
            let _ = write!(opts, "scale={scale:.3},");
        }
        (None, None) => {}
    }
    opts
}

fn latex_environment(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "flushleft",
        Alignment::Right => "flushright",
        Alignment::Center => "center",
    }
}

fn latex_fragment(sizing: &Sizing<'_>, alignment: Alignment, caption: &str, image: &str) -> String {
    let env = latex_environment(alignment);
    let opts = latex_graphics_options(sizing);

    let mut out = String::new();
    out.push_str("\\begin{figure}[H]\n");
    let _ = writeln!(out, "\\begin{{{env}}}\\capstart");
    let _ = writeln!(out, "\\includegraphics[{opts}]{{{image}}}");
    if !caption.is_empty() {
        let _ = write!(out, "\\caption{{{}}}", escape_latex(caption));
    }
    let _ = writeln!(out, "\\end{{{env}}}\\end{{figure}}");
    out
}

fn html_fragment(sizing: &Sizing<'_>, alignment: Alignment, caption: &str, image: &str) -> String {
    let mut out = String::new();
    let _ = write!(out, r#"<figure class="puml align-{}""#, alignment.as_str());
    if let Some(figwidth) = sizing.figwidth {
        let _ = write!(out, r#" style="max-width: {}%;""#, html_max_width(figwidth));
    }
    out.push_str(">\n");

    let alt = if caption.is_empty() { "diagram" } else { caption };
    let _ = writeln!(
        out,
        r#"<img src="{}" alt="{}">"#,
        escape_html(image),
        escape_html(alt)
    );
    if !caption.is_empty() {
        let _ = writeln!(out, "<figcaption>{}</figcaption>", escape_html(caption));
    }
    out.push_str("</figure>\n");
    out
}

/// Path of `image` relative to `base`, with `/` separators.
///
/// Both paths should be absolute. Falls back to the full image path when no
/// relative form exists (e.g. different Windows drives).
#[must_use]
pub fn image_reference(image: &Path, base: &Path) -> String {
    let image_parts: Vec<Component<'_>> = image.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();

    let common = image_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 && image.has_root() {
        return image.to_string_lossy().replace('\\', "/");
    }

    let ups = base_parts.len() - common;
    let mut segments: Vec<String> = std::iter::repeat_n("..".to_owned(), ups).collect();
    segments.extend(
        image_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    segments.join("/")
}

/// Escape LaTeX special characters in caption text.
#[must_use]
pub fn escape_latex(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\textbackslash{}"),
            '{' | '}' | '$' | '&' | '#' | '_' | '%' => {
                result.push('\\');
                result.push(c);
            }
            '^' => result.push_str("\\textasciicircum{}"),
            '~' => result.push_str("\\textasciitilde{}"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape HTML special characters in text and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
