use std::sync::OnceLock;

use regex::{Captures, Regex};

/// `{{ env.NAME }}` with an optional `| default("value")`
fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#).expect("must be valid regex")
    })
}

/// Expand environment placeholders in raw config text
///
/// Lines whose first non-blank character is `#` are copied verbatim so
/// commented-out settings never require their variables to be set.
pub(crate) fn expand_env(input: &str) -> Result<String, String> {
    let mut output = String::with_capacity(input.len());

    for (index, line) in input.split('\n').enumerate() {
        if index > 0 {
            output.push('\n');
        }

        if line.trim_start().starts_with('#') {
            output.push_str(line);
            continue;
        }

        let mut cursor = 0;
        for captures in placeholder().captures_iter(line) {
            let Some(whole) = captures.get(0) else { continue };
            output.push_str(&line[cursor..whole.start()]);
            output.push_str(&resolve(&captures)?);
            cursor = whole.end();
        }
        output.push_str(&line[cursor..]);
    }

    Ok(output)
}

fn resolve(captures: &Captures<'_>) -> Result<String, String> {
    let key = captures.get(1).map_or("", |m| m.as_str());
    let fallback = captures.get(2).map(|m| m.as_str());

    let Some(name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    match (std::env::var(name), fallback) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(fallback)) => Ok(fallback.to_owned()),
        (Err(_), None) => Err(format!("environment variable not found: `{name}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let input = "[server]\nlisten_address = \"127.0.0.1:8080\"\n";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn expands_several_variables() {
        temp_env::with_vars([("AG_KEY", Some("sk-test")), ("AG_REGION", Some("eu-west-1"))], || {
            let out = expand_env("api_key = \"{{ env.AG_KEY }}\"\nregion = \"{{env.AG_REGION}}\"").unwrap();
            assert_eq!(out, "api_key = \"sk-test\"\nregion = \"eu-west-1\"");
        });
    }

    #[test]
    fn missing_variable_is_an_error() {
        temp_env::with_var_unset("AG_MISSING", || {
            let err = expand_env("api_key = \"{{ env.AG_MISSING }}\"").unwrap_err();
            assert!(err.contains("AG_MISSING"));
        });
    }

    #[test]
    fn default_applies_only_when_unset() {
        temp_env::with_var_unset("AG_OPTIONAL", || {
            let out = expand_env("title = \"{{ env.AG_OPTIONAL | default(\"agentguard\") }}\"").unwrap();
            assert_eq!(out, "title = \"agentguard\"");
        });
        temp_env::with_var("AG_OPTIONAL", Some("custom"), || {
            let out = expand_env("title = \"{{ env.AG_OPTIONAL | default(\"agentguard\") }}\"").unwrap();
            assert_eq!(out, "title = \"custom\"");
        });
    }

    #[test]
    fn non_env_scope_is_rejected() {
        let err = expand_env("key = \"{{ vault.SECRET }}\"").unwrap_err();
        assert!(err.contains("only variables scoped with 'env.'"));
    }

    #[test]
    fn comment_lines_are_not_expanded() {
        temp_env::with_var_unset("AG_MISSING", || {
            let input = "  # api_key = \"{{ env.AG_MISSING }}\"";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }
}
