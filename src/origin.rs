//! Origin patterns and origin matching

use regex::bytes::Regex;
use std::fmt::{Display, Formatter};

const WILDCARD: &str = "*";

/// A single `allowed_origins` entry
///
/// The form is derived from the configured string:
/// * `*` - [`OriginPattern::Wildcard`]
/// * `^...$` - [`OriginPattern::Regex`], compiled once when the pattern is parsed
/// * anything else - [`OriginPattern::Exact`]
#[derive(Debug, Clone)]
pub enum OriginPattern {
    /// Allows any origin
    Wildcard,

    /// Anchored regular expression
    Regex {
        /// Pattern as configured
        source: String,
        /// `None` if the pattern failed to compile, such a pattern never matches
        compiled: Option<Regex>,
    },

    /// Literal origin compared byte for byte
    Exact(String),
}

impl OriginPattern {
    /// Parses a configured origin string into an [`OriginPattern`]
    ///
    /// A regex that fails to compile is not an error: it is kept as a pattern
    /// that never matches and a warning is logged.
    pub fn parse(pattern: &str) -> Self {
        if pattern == WILDCARD {
            return Self::Wildcard;
        }

        if pattern.starts_with('^') && pattern.ends_with('$') {
            let compiled = match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(err) => {
                    tracing::warn!("CORS: origin pattern `{pattern}` is not a valid regex and will never match: {err}");
                    None
                }
            };
            return Self::Regex { source: pattern.to_owned(), compiled };
        }

        Self::Exact(pattern.to_owned())
    }

    /// Returns `true` if this is the wildcard pattern
    #[inline]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }

    /// Returns the pattern as it was configured
    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Wildcard => WILDCARD,
            Self::Regex { source, .. } => source,
            Self::Exact(origin) => origin,
        }
    }

    /// Checks whether `origin` satisfies this pattern
    ///
    /// Works on raw bytes, so an origin that is not visible ASCII is still matched.
    #[inline]
    pub fn matches(&self, origin: impl AsRef<[u8]>) -> bool {
        let origin = origin.as_ref();
        match self {
            Self::Wildcard => true,
            Self::Regex { compiled, .. } => compiled
                .as_ref()
                .is_some_and(|re| re.is_match(origin)),
            Self::Exact(allowed) => allowed.as_bytes() == origin,
        }
    }
}

impl Display for OriginPattern {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq for OriginPattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Wildcard, Self::Wildcard) => true,
            (Self::Regex { source: a, .. }, Self::Regex { source: b, .. }) => a == b,
            (Self::Exact(a), Self::Exact(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for OriginPattern {}

impl From<&str> for OriginPattern {
    #[inline]
    fn from(pattern: &str) -> Self {
        Self::parse(pattern)
    }
}

/// Decides whether `origin` is allowed by `patterns`
///
/// Patterns are evaluated in the configured order and the first match wins.
/// A wildcard admits every origin as soon as iteration reaches it.
pub fn is_allowed(patterns: &[OriginPattern], origin: impl AsRef<[u8]>) -> bool {
    let origin = origin.as_ref();
    for pattern in patterns {
        if pattern.matches(origin) {
            tracing::debug!("CORS: origin `{}` allowed by `{pattern}`", String::from_utf8_lossy(origin));
            return true;
        }
    }

    tracing::debug!("CORS: origin `{}` is not allowed", String::from_utf8_lossy(origin));
    false
}
