//! `.. puml::` directive scanning.
//!
//! Finds directive blocks in reStructuredText source:
//!
//! ```rst
//! .. puml::
//!    :file: diagrams/flow.puml
//!    :scale: 50%
//!    :align: center
//!
//!    Request flow
//! ```
//!
//! Leading `:name: value` lines are options, the first content line is the
//! caption, and any further lines are inline diagram source.

use std::sync::LazyLock;

use regex::Regex;

use crate::sizing::SizingOptions;

static DIRECTIVE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)\.\.\s+puml::(.*)$").unwrap());

static OPTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([A-Za-z][\w-]*):(?:\s+(.*))?$").unwrap());

/// Options accepted by the directive.
const KNOWN_OPTIONS: &str = "file, width, height, scale, figwidth, align";

/// One `.. puml::` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PumlBlock {
    /// 1-based line of the directive marker.
    pub line: usize,
    /// Index of the first line of the block (the marker).
    pub start: usize,
    /// Index one past the last non-blank line of the block.
    pub end: usize,
    /// Leading whitespace of the marker.
    pub indent: String,
    /// `:file:` option.
    pub file: Option<String>,
    /// Sizing and alignment options.
    pub sizing: SizingOptions,
    /// First content line, or empty.
    pub caption: String,
    /// Content after the caption, dedented.
    pub body: Vec<String>,
}

impl PumlBlock {
    /// Inline diagram source, if the block carries any.
    #[must_use]
    pub fn inline_source(&self) -> Option<String> {
        let source = self.body.join("\n");
        let trimmed = source.trim_matches('\n');
        if trimmed.trim().is_empty() {
            None
        } else {
            Some(format!("{trimmed}\n"))
        }
    }
}

/// Result of scanning a document.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Blocks in document order.
    pub blocks: Vec<PumlBlock>,
    /// Ignored arguments and unknown options.
    pub warnings: Vec<String>,
}

/// Scan document lines for `.. puml::` blocks.
#[must_use]
pub fn scan(lines: &[&str]) -> ScanResult {
    let mut result = ScanResult::default();
    let mut i = 0;

    while i < lines.len() {
        let Some(caps) = DIRECTIVE_PATTERN.captures(lines[i]) else {
            i += 1;
            continue;
        };
        let indent = caps.get(1).map_or("", |m| m.as_str());
        let argument = caps.get(2).map_or("", |m| m.as_str()).trim();
        let line = i + 1;

        if !argument.is_empty() {
            result.warnings.push(format!(
                "line {line}: puml directive argument '{argument}' ignored (use :file:)"
            ));
        }

        let marker_width = indent_width(lines[i]);
        let mut end = i + 1;
        let mut last_content = i + 1;
        while end < lines.len() {
            let candidate = lines[end];
            if candidate.trim().is_empty() {
                end += 1;
            } else if indent_width(candidate) > marker_width {
                end += 1;
                last_content = end;
            } else {
                break;
            }
        }

        let mut block = parse_block(&lines[i + 1..last_content], line, &mut result.warnings);
        block.line = line;
        block.start = i;
        block.end = last_content;
        indent.clone_into(&mut block.indent);
        result.blocks.push(block);

        i = last_content;
    }

    result
}

/// Parse the indented lines following a directive marker.
fn parse_block(lines: &[&str], line: usize, warnings: &mut Vec<String>) -> PumlBlock {
    let mut block = PumlBlock::default();
    let mut rest = lines;

    while let Some((first, tail)) = rest.split_first() {
        let trimmed = first.trim();
        if trimmed.is_empty() {
            break;
        }
        let Some(caps) = OPTION_PATTERN.captures(trimmed) else {
            break;
        };
        let name = caps.get(1).map_or("", |m| m.as_str());
        let value = caps
            .get(2)
            .map(|m| m.as_str().trim())
            .filter(|v| !v.is_empty())
            .map(str::to_owned);

        match name {
            "file" => block.file = value,
            "width" => block.sizing.width = value,
            "height" => block.sizing.height = value,
            "scale" => block.sizing.scale = value,
            "figwidth" => block.sizing.figwidth = value,
            "align" => block.sizing.align = value,
            _ => warnings.push(format!(
                "line {line}: unknown option '{name}' ignored (valid: {KNOWN_OPTIONS})"
            )),
        }
        rest = tail;
    }

    let content = dedent(rest);
    let mut content = content.into_iter().skip_while(|l| l.trim().is_empty());
    if let Some(caption) = content.next() {
        caption.trim().clone_into(&mut block.caption);
    }
    block.body = content.collect();

    block
}

/// Strip the common leading whitespace of non-blank lines.
fn dedent(lines: &[&str]) -> Vec<String> {
    let common = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_width(l))
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else {
                l.chars().skip(common).collect()
            }
        })
        .collect()
}

/// Number of leading whitespace characters.
fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}
