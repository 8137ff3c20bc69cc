//! Convenience builder for HTTP query parameters.
//!
//! Lightweight helper for constructing URL query pairs, including the
//! numbered `tag.N.key` / `tag.N.value` pairs the inventory API uses for
//! server-side tag filters.

use std::fmt::Display;

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a required key/value pair.
    pub fn push<T>(&mut self, key: impl Into<String>, value: T)
    where
        T: Display,
    {
        self.pairs.push((key.into(), value.to_string()));
    }

    /// Append a key/value pair when the value is present.
    pub fn push_opt<T>(&mut self, key: impl Into<String>, value: Option<T>)
    where
        T: Display,
    {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    /// Append a 1-based numbered pair, `prefix.N.suffix`.
    pub fn push_indexed<T>(&mut self, prefix: &str, index: usize, suffix: &str, value: T)
    where
        T: Display,
    {
        self.push(format!("{prefix}.{index}.{suffix}"), value);
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
