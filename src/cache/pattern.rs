//! Glob Pattern Module
//!
//! Key patterns for bulk invalidation. `*` matches any run of characters
//! (including none); everything else matches literally. Matching is
//! case-sensitive and covers the whole key.

use regex::Regex;

/// A compiled key pattern such as `property:*`.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    regex: Regex,
}

impl GlobPattern {
    /// Compiles `pattern`, escaping every non-wildcard character.
    ///
    /// Fails when the compiled matcher would exceed the regex size limit.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("^(?s:{})$", body))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Tests a key against the pattern.
    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}
