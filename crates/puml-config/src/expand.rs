//! `${VAR}` expansion for configuration strings.
//!
//! Only braced references are expanded; a bare `$` is literal, so renderer
//! commands such as `java -jar /opt/$tools/plantuml.jar` pass through as
//! written.

use std::sync::LazyLock;

use regex::Regex;

use crate::ConfigError;

static BRACED_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{[^}]*\}").unwrap());

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// `field` names the configuration key in errors.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(value.len());
    let mut last = 0;

    for span in BRACED_VAR.find_iter(value) {
        expanded.push_str(&value[last..span.start()]);
        expanded.push_str(&expand_braced(span.as_str(), field)?);
        last = span.end();
    }
    expanded.push_str(&value[last..]);

    Ok(expanded)
}

/// Expand a single `${...}` span.
fn expand_braced(span: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env_with_context(span, lookup)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.cause.0),
        })
}

/// Unset variable without a default.
struct Unset(String);

fn lookup(name: &str) -> Result<Option<String>, Unset> {
    std::env::var(name)
        .map(Some)
        .map_err(|_| Unset(name.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expand_jar_path() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("PUML_TEST_HOME", "/opt/plantuml");
        }
        let result = expand_env(
            "java -jar ${PUML_TEST_HOME}/plantuml.jar",
            "renderer.executable",
        )
        .unwrap();
        assert_eq!(result, "java -jar /opt/plantuml/plantuml.jar");
        unsafe {
            std::env::remove_var("PUML_TEST_HOME");
        }
    }

    #[test]
    fn test_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("PUML_TEST_UNSET");
        }
        let result = expand_env("${PUML_TEST_UNSET:-plantuml}", "renderer.executable").unwrap();
        assert_eq!(result, "plantuml");
    }

    #[test]
    fn test_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("PUML_TEST_MISSING");
        }
        let err = expand_env("${PUML_TEST_MISSING}", "renderer.executable").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("PUML_TEST_MISSING"));
        assert!(err.to_string().contains("renderer.executable"));
    }

    #[test]
    fn test_bare_dollar_is_literal() {
        let result = expand_env("/opt/$weird/plantuml", "renderer.executable").unwrap();
        assert_eq!(result, "/opt/$weird/plantuml");
    }

    #[test]
    fn test_bare_dollar_is_literal_next_to_braced_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("PUML_TEST_ROOT", "/opt");
            std::env::remove_var("weird");
        }
        let result = expand_env("${PUML_TEST_ROOT}/$weird/plantuml", "renderer.executable").unwrap();
        assert_eq!(result, "/opt/$weird/plantuml");
        unsafe {
            std::env::remove_var("PUML_TEST_ROOT");
        }
    }

    #[test]
    fn test_unbalanced_brace_is_literal() {
        let result = expand_env("plantuml ${oops", "renderer.executable").unwrap();
        assert_eq!(result, "plantuml ${oops");
    }
}
