//! Per-venue mapping from raw error text to [`ErrorKind`].
//!
//! Venues report failures as free text. Adapters run that text through an
//! ordered rule table once, at the boundary, and hand the core a
//! [`VenueError`] with a stable kind. Rules are case-insensitive substring
//! matches; the first match wins, and configured rules are tried before the
//! built-in defaults.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, VenueError};

/// One `(substring → kind)` mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRule {
    /// Substring to look for (matched case-insensitively).
    pub pattern: String,
    /// Kind assigned when the pattern matches.
    pub kind: ErrorKind,
}

impl ErrorRule {
    pub fn new(pattern: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            pattern: pattern.into().to_lowercase(),
            kind,
        }
    }
}

/// Ordered rule table for one venue.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    rules: Vec<ErrorRule>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl ErrorClassifier {
    /// Venue-specific rules evaluated ahead of the defaults.
    pub fn with_rules(venue_rules: Vec<ErrorRule>) -> Self {
        let mut rules: Vec<ErrorRule> = venue_rules
            .into_iter()
            .map(|r| ErrorRule::new(r.pattern, r.kind))
            .collect();
        rules.extend(default_rules());
        Self { rules }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Map raw venue text to a kind.
    pub fn classify(&self, raw: &str) -> ErrorKind {
        let haystack = raw.to_lowercase();
        self.rules
            .iter()
            .find(|rule| haystack.contains(&rule.pattern))
            .map(|rule| rule.kind)
            .unwrap_or(ErrorKind::Unclassified)
    }

    /// Build a classified error from raw venue text.
    pub fn error(&self, raw: impl Into<String>) -> VenueError {
        let message = raw.into();
        VenueError::new(self.classify(&message), message)
    }
}

/// Built-in table covering common exchange phrasing.
///
/// Authentication rules come first so "api key not found" stays fatal.
fn default_rules() -> Vec<ErrorRule> {
    use ErrorKind::*;

    [
        ("invalid api key", Fatal),
        ("api key not found", Fatal),
        ("invalid signature", Fatal),
        ("authentication", Fatal),
        ("unauthorized", Fatal),
        ("forbidden", Fatal),
        ("permission denied", Fatal),
        ("order not found", NotFound),
        ("unknown order", NotFound),
        ("does not exist", NotFound),
        ("already cancel", NotFound),
        ("already filled", NotFound),
        ("not modified", NoOpUnchanged),
        ("no change", NoOpUnchanged),
        ("unchanged", NoOpUnchanged),
        ("same as the original", NoOpUnchanged),
        ("not supported", Unsupported),
        ("unsupported", Unsupported),
        ("not implemented", Unsupported),
        ("rate limit", Transient),
        ("too many requests", Transient),
        ("timed out", Transient),
        ("timeout", Transient),
        ("temporarily unavailable", Transient),
        ("service unavailable", Transient),
        ("bad gateway", Transient),
        ("connection", Transient),
        ("network", Transient),
    ]
    .into_iter()
    .map(|(pattern, kind)| ErrorRule::new(pattern, kind))
    .collect()
}
