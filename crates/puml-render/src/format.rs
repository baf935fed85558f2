//! Output targets and alignment keywords.

/// Document target a fragment is composed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    /// Typeset output (LaTeX): absolute sizing directives, figure environments.
    PageLayout,
    /// Box-model output (HTML): style attributes, relative image links.
    BoxModel,
}

impl TargetFormat {
    /// Parse target from a builder name.
    ///
    /// Accepts `latex`/`pdf` for [`PageLayout`](Self::PageLayout) and
    /// `html` for [`BoxModel`](Self::BoxModel).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "latex" | "pdf" => Some(Self::PageLayout),
            "html" => Some(Self::BoxModel),
            _ => None,
        }
    }

    /// Writer name used in `.. raw::` directives.
    #[must_use]
    pub fn raw_format(self) -> &'static str {
        match self {
            Self::PageLayout => "latex",
            Self::BoxModel => "html",
        }
    }

    /// Alignment used when a block sets none or an unknown one.
    #[must_use]
    pub fn default_alignment(self) -> Alignment {
        match self {
            Self::PageLayout => Alignment::Center,
            Self::BoxModel => Alignment::Left,
        }
    }
}

/// Horizontal placement of a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
    Center,
}

impl Alignment {
    /// Parse an `:align:` value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "center" => Some(Self::Center),
            _ => None,
        }
    }

    /// Resolve an optional `:align:` value for a target.
    ///
    /// Missing and unrecognized values fall back to the target default
    /// without an error.
    #[must_use]
    pub fn resolve(value: Option<&str>, target: TargetFormat) -> Self {
        value
            .and_then(Self::parse)
            .unwrap_or_else(|| target.default_alignment())
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert_eq!(TargetFormat::parse("latex"), Some(TargetFormat::PageLayout));
        assert_eq!(TargetFormat::parse("pdf"), Some(TargetFormat::PageLayout));
        assert_eq!(TargetFormat::parse("html"), Some(TargetFormat::BoxModel));
        assert_eq!(TargetFormat::parse("epub"), None);
    }

    #[test]
    fn test_raw_format() {
        assert_eq!(TargetFormat::PageLayout.raw_format(), "latex");
        assert_eq!(TargetFormat::BoxModel.raw_format(), "html");
    }

    #[test]
    fn test_alignment_defaults_per_target() {
        assert_eq!(
            Alignment::resolve(None, TargetFormat::PageLayout),
            Alignment::Center
        );
        assert_eq!(
            Alignment::resolve(None, TargetFormat::BoxModel),
            Alignment::Left
        );
    }

    #[test]
    fn test_unknown_alignment_falls_back() {
        assert_eq!(
            Alignment::resolve(Some("middle"), TargetFormat::PageLayout),
            Alignment::Center
        );
        assert_eq!(
            Alignment::resolve(Some("justify"), TargetFormat::BoxModel),
            Alignment::Left
        );
    }

    #[test]
    fn test_explicit_alignment_wins() {
        for target in [TargetFormat::PageLayout, TargetFormat::BoxModel] {
            assert_eq!(
                Alignment::resolve(Some("right"), target),
                Alignment::Right
            );
            assert_eq!(Alignment::resolve(Some(" left "), target), Alignment::Left);
        }
    }
}
