//! Author-supplied sizing options and their validation.

use crate::error::BlockError;

/// Sizing and alignment options of one block, as written by the author.
///
/// `figwidth` sizes the figure relative to the text width and cannot be
/// combined with `width`, `height` or `scale`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizingOptions {
    /// Explicit width in the target's unit system (e.g. `5cm`).
    pub width: Option<String>,
    /// Explicit height in the target's unit system.
    pub height: Option<String>,
    /// Scale factor, bare (`0.5`) or percentage (`50%`).
    pub scale: Option<String>,
    /// Fraction of the text width, bare (`0.5`) or percentage (`50%`).
    pub figwidth: Option<String>,
    /// Alignment keyword (`left`, `right`, `center`).
    pub align: Option<String>,
}

/// Validated sizing with numeric options normalized to fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sizing<'a> {
    pub width: Option<&'a str>,
    pub height: Option<&'a str>,
    pub scale: Option<f64>,
    pub figwidth: Option<f64>,
    pub align: Option<&'a str>,
}

impl SizingOptions {
    /// Check option exclusivity and parse numeric options.
    ///
    /// `caption` only identifies the block in the error.
    pub fn resolve(&self, caption: &str) -> Result<Sizing<'_>, BlockError> {
        if self.figwidth.is_some() {
            let conflicting = [
                ("width", &self.width),
                ("height", &self.height),
                ("scale", &self.scale),
            ]
            .into_iter()
            .find_map(|(name, value)| value.is_some().then_some(name));

            if let Some(conflicting) = conflicting {
                return Err(BlockError::ConfigurationConflict {
                    caption: caption.to_owned(),
                    conflicting,
                });
            }
        }

        Ok(Sizing {
            width: self.width.as_deref(),
            height: self.height.as_deref(),
            scale: self
                .scale
                .as_deref()
                .map(|v| parse_fraction(v, "scale"))
                .transpose()?,
            figwidth: self
                .figwidth
                .as_deref()
                .map(|v| parse_fraction(v, "figwidth"))
                .transpose()?,
            align: self.align.as_deref(),
        })
    }

    /// Whether any option that the box-model target ignores is set.
    #[must_use]
    pub fn has_absolute_sizing(&self) -> bool {
        self.width.is_some() || self.height.is_some() || self.scale.is_some()
    }
}

/// Parse a bare decimal (`0.5`) or a percentage (`50%`) into a fraction.
///
/// Both spellings of the same value yield the same `f64`. Negative,
/// non-finite and non-numeric values are rejected.
pub fn parse_fraction(value: &str, option: &'static str) -> Result<f64, BlockError> {
    let invalid = || BlockError::InvalidNumber {
        option,
        value: value.to_owned(),
    };

    let trimmed = value.trim();
    let parsed = match trimmed.strip_suffix('%') {
        Some(percent) => percent.trim_end().parse::<f64>().map(|n| n / 100.0),
        None => trimmed.parse::<f64>(),
    }
    .map_err(|_| invalid())?;

    if !parsed.is_finite() || parsed < 0.0 {
        return Err(invalid());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> SizingOptions {
        SizingOptions::default()
    }

    #[test]
    fn test_percentage_and_bare_agree() {
        for (percent, bare) in [("50%", "0.5"), ("100%", "1"), ("25%", "0.25"), ("0%", "0")] {
            assert_eq!(
                parse_fraction(percent, "scale").unwrap(),
                parse_fraction(bare, "scale").unwrap(),
                "{percent} vs {bare}"
            );
        }
    }

    #[test]
    fn test_parse_fraction_values() {
        assert!((parse_fraction("75%", "scale").unwrap() - 0.75).abs() < f64::EPSILON);
        assert!((parse_fraction(" 1.5 ", "scale").unwrap() - 1.5).abs() < f64::EPSILON);
        assert!((parse_fraction("150 %", "scale").unwrap() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_fraction_rejects_garbage() {
        for value in ["", "%", "half", "50px", "5cm", "-0.5", "NaN", "inf", "50%%"] {
            let err = parse_fraction(value, "scale").unwrap_err();
            assert!(
                matches!(err, BlockError::InvalidNumber { option: "scale", .. }),
                "expected InvalidNumber for {value:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_figwidth_conflicts() {
        for (field, name) in [("width", "width"), ("height", "height"), ("scale", "scale")] {
            let mut opts = SizingOptions {
                figwidth: Some("50%".to_owned()),
                ..options()
            };
            match field {
                "width" => opts.width = Some("5cm".to_owned()),
                "height" => opts.height = Some("3cm".to_owned()),
                _ => opts.scale = Some("0.5".to_owned()),
            }

            let err = opts.resolve("Flow").unwrap_err();
            match err {
                BlockError::ConfigurationConflict {
                    caption,
                    conflicting,
                } => {
                    assert_eq!(caption, "Flow");
                    assert_eq!(conflicting, name);
                }
                other => panic!("expected ConfigurationConflict, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_conflict_reported_before_number_parsing() {
        let opts = SizingOptions {
            scale: Some("not-a-number".to_owned()),
            figwidth: Some("50%".to_owned()),
            ..options()
        };
        assert!(matches!(
            opts.resolve("x"),
            Err(BlockError::ConfigurationConflict { .. })
        ));
    }

    #[test]
    fn test_resolve_normalizes_numbers() {
        let opts = SizingOptions {
            width: Some("5cm".to_owned()),
            scale: Some("50%".to_owned()),
            align: Some("right".to_owned()),
            ..options()
        };
        let sizing = opts.resolve("Flow").unwrap();
        assert_eq!(sizing.width, Some("5cm"));
        assert_eq!(sizing.scale, Some(0.5));
        assert_eq!(sizing.figwidth, None);
        assert_eq!(sizing.align, Some("right"));
    }

    #[test]
    fn test_resolve_invalid_figwidth() {
        let opts = SizingOptions {
            figwidth: Some("wide".to_owned()),
            ..options()
        };
        assert!(matches!(
            opts.resolve("x"),
            Err(BlockError::InvalidNumber {
                option: "figwidth",
                ..
            })
        ));
    }

    #[test]
    fn test_has_absolute_sizing() {
        assert!(!options().has_absolute_sizing());
        let opts = SizingOptions {
            height: Some("2in".to_owned()),
            ..options()
        };
        assert!(opts.has_absolute_sizing());
    }
}
