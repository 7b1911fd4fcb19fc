//! Route patterns with named placeholders.
//!
//! A pattern is literal text interleaved with placeholders of the form
//! `:name`, where `name` is one or more ASCII letters, digits or `_`.
//! A placeholder matches one or more characters from the same class, so it
//! never crosses a `/`.
//!
//! Because a placeholder name consumes every word character after the `:`,
//! the literal that follows a placeholder always starts with a non-word
//! character. A greedy scan is therefore exact and needs no backtracking.

use std::collections::BTreeMap;

/// Path parameter key holding the authenticated user's id.
pub const AUTHENTICATED_USER_ID: &str = "authenticatedUserId";

/// Path parameter key holding the authenticated user's email.
pub const AUTHENTICATED_USER_EMAIL: &str = "authenticatedUserEmail";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Param(String),
}

/// A compiled, anchored route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    tokens: Vec<Token>,
}

impl RoutePattern {
    /// Compile a pattern such as `/users/:iduser/drink`.
    ///
    /// The pattern is normalized the same way request paths are, so
    /// `/users/` and `/users` compile to the same matcher.
    pub fn parse(pattern: &str) -> Self {
        let normalized = normalize_path(pattern);
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = normalized.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            let starts_param = c == ':' && chars.peek().is_some_and(|&(_, next)| is_word(next));
            if !starts_param {
                literal.push(c);
                continue;
            }

            let name_start = i + 1;
            let mut name_end = normalized.len();
            while let Some(&(j, next)) = chars.peek() {
                if !is_word(next) {
                    name_end = j;
                    break;
                }
                chars.next();
            }

            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(Token::Param(normalized[name_start..name_end].to_string()));
        }

        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Self {
            source: normalized.to_string(),
            tokens,
        }
    }

    /// The normalized pattern text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder names in the order they appear.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Param(name) => Some(name.as_str()),
            Token::Literal(_) => None,
        })
    }

    /// Whether the pattern matches the whole normalized `path`.
    pub fn matches(&self, path: &str) -> bool {
        self.captures(path).is_some()
    }

    /// Captured placeholder values, in placeholder order, or `None` when the
    /// path does not match.
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<&'p str>> {
        let mut rest = normalize_path(path);
        let mut captured = Vec::new();

        for token in &self.tokens {
            match token {
                Token::Literal(literal) => {
                    rest = rest.strip_prefix(literal.as_str())?;
                }
                Token::Param(_) => {
                    let end = rest.find(|c: char| !is_word(c)).unwrap_or(rest.len());
                    if end == 0 {
                        return None;
                    }
                    let (value, tail) = rest.split_at(end);
                    captured.push(value);
                    rest = tail;
                }
            }
        }

        rest.is_empty().then_some(captured)
    }
}

/// Capture the placeholder values of `pattern` from `path`.
///
/// Returns `None` when the path does not match.
pub fn extract_params(pattern: &RoutePattern, path: &str) -> Option<PathParams> {
    let values = pattern.captures(path)?;
    let params = pattern
        .param_names()
        .zip(values)
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    Some(PathParams(params))
}

/// Strip a single trailing slash unless the path is the root `/`.
pub fn normalize_path(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// =============================================================================
// Path Parameters
// =============================================================================

/// Named values captured from the path, plus identity added by auth gating.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(BTreeMap<String, String>);

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Id of the caller, present only after auth gating succeeded.
    pub fn authenticated_user_id(&self) -> Option<i64> {
        self.get(AUTHENTICATED_USER_ID)?.parse().ok()
    }

    /// Email of the caller, present only after auth gating succeeded.
    pub fn authenticated_user_email(&self) -> Option<&str> {
        self.get(AUTHENTICATED_USER_EMAIL)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
