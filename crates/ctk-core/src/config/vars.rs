//! Environment variable interpolation for config files.
//!
//! Supported forms:
//! - `$VAR` or `${VAR}` - value of VAR, error if unset
//! - `${VAR:-fallback}` - fallback if VAR is unset or empty
//! - `${VAR-fallback}` - fallback only if VAR is unset
//! - `$$` - a literal `$`

use regex::{Captures, Regex};
use std::env;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?P<escape>\$\$)
        |
        \$\{
            (?P<braced>[A-Za-z_][A-Za-z0-9_]*)
            (?: (?P<op>:?-) (?P<fallback>[^}]*) )?
        \}
        |
        \$(?P<bare>[A-Za-z_][A-Za-z0-9_]*)
        ",
    )
    .expect("Invalid placeholder pattern")
});

/// Outcome of interpolating a document.
#[derive(Debug)]
pub struct InterpolationResult {
    /// The document with all resolvable placeholders substituted.
    pub text: String,
    /// One message per placeholder that could not be resolved.
    pub errors: Vec<String>,
}

impl InterpolationResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Substitute environment variables in `input`.
///
/// Unresolvable placeholders are left in place and reported, so a user sees
/// every missing variable in one go.
pub fn interpolate(input: &str) -> InterpolationResult {
    let mut errors = Vec::new();
    let text = PLACEHOLDER
        .replace_all(input, |caps: &Captures| resolve(caps, &mut errors))
        .into_owned();
    InterpolationResult { text, errors }
}

fn resolve(caps: &Captures, errors: &mut Vec<String>) -> String {
    let original = &caps[0];
    if caps.name("escape").is_some() {
        return "$".to_string();
    }

    let Some(name) = caps.name("braced").or_else(|| caps.name("bare")) else {
        return original.to_string();
    };
    let name = name.as_str();
    let fallback = caps.name("fallback").map(|m| m.as_str());
    let empty_means_unset = caps.name("op").is_some_and(|m| m.as_str() == ":-");

    match env::var(name) {
        Ok(value) if value.contains(['\n', '\r']) => {
            errors.push(format!(
                "environment variable '{name}' contains newlines, which is not allowed"
            ));
            original.to_string()
        }
        Ok(value) if value.is_empty() && empty_means_unset => {
            fallback.unwrap_or_default().to_string()
        }
        Ok(value) => value,
        Err(_) => match fallback {
            Some(fallback) => fallback.to_string(),
            None => {
                errors.push(format!("environment variable '{name}' is not set"));
                original.to_string()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_env_vars<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let saved: Vec<_> = vars.iter().map(|(k, _)| (*k, env::var(k).ok())).collect();

        // SAFETY: each test uses its own variable names and restores them afterwards
        for (key, value) in vars {
            match value {
                Some(v) => unsafe { env::set_var(key, v) },
                None => unsafe { env::remove_var(key) },
            }
        }

        let result = f();

        for (key, value) in saved {
            match value {
                Some(v) => unsafe { env::set_var(key, v) },
                None => unsafe { env::remove_var(key) },
            }
        }

        result
    }

    #[test]
    fn test_bare_and_braced() {
        with_env_vars(&[("CTK_TEST_API_KEY", Some("abc"))], || {
            let result = interpolate("key: $CTK_TEST_API_KEY, again: ${CTK_TEST_API_KEY}");
            assert!(result.is_ok());
            assert_eq!(result.text, "key: abc, again: abc");
        });
    }

    #[test]
    fn test_missing_variable_is_reported() {
        with_env_vars(&[("CTK_TEST_MISSING", None)], || {
            let result = interpolate("secret: ${CTK_TEST_MISSING}");
            assert!(!result.is_ok());
            assert_eq!(result.errors.len(), 1);
            assert!(result.errors[0].contains("CTK_TEST_MISSING"));
            assert_eq!(result.text, "secret: ${CTK_TEST_MISSING}");
        });
    }

    #[test]
    fn test_fallback_forms() {
        with_env_vars(&[("CTK_TEST_EMPTY", Some("")), ("CTK_TEST_UNSET", None)], || {
            assert_eq!(interpolate("${CTK_TEST_UNSET:-ext}").text, "ext");
            assert_eq!(interpolate("${CTK_TEST_UNSET-ext}").text, "ext");
            assert_eq!(interpolate("${CTK_TEST_EMPTY:-ext}").text, "ext");
            assert_eq!(interpolate("[${CTK_TEST_EMPTY-ext}]").text, "[]");
        });
    }

    #[test]
    fn test_newline_injection_rejected() {
        with_env_vars(&[("CTK_TEST_NEWLINE", Some("a\nb"))], || {
            let result = interpolate("$CTK_TEST_NEWLINE");
            assert!(!result.is_ok());
            assert!(result.errors[0].contains("newlines"));
        });
    }

    #[test]
    fn test_escape_sequence() {
        let result = interpolate("password: pa$$word");
        assert!(result.is_ok());
        assert_eq!(result.text, "password: pa$word");
    }
}
