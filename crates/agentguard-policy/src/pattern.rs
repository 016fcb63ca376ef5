/// Glob-like name pattern
///
/// Only a trailing `*` is special; anywhere else it is a literal character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Pattern {
    /// Matches every name
    Any,
    /// Matches names starting with the prefix
    Prefix(String),
    /// Matches one name exactly
    Exact(String),
}

impl Pattern {
    pub(crate) fn parse(raw: &str) -> Self {
        if raw == "*" {
            return Self::Any;
        }

        match raw.strip_suffix('*') {
            Some(prefix) => Self::Prefix(prefix.to_owned()),
            None => Self::Exact(raw.to_owned()),
        }
    }

    pub(crate) fn matches(&self, name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Prefix(prefix) => name.starts_with(prefix.as_str()),
            Self::Exact(exact) => name == exact,
        }
    }
}
