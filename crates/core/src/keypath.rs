//! Dotted key-path parsing.
//!
//! Content keys address a leaf in a page's nested document:
//! - `hero.title`
//! - `services.items` (the leaf holds a JSON array)
//!
//! Segments are non-empty ASCII alphanumeric identifiers (underscore
//! allowed); a segment can never contain a dot.

use crate::record::validate::{validate_segment, KeyPathError};

const SEPARATOR: char = '.';

/// A validated dotted key path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a dotted key string, rejecting empty or malformed segments.
    pub fn parse(key: &str) -> Result<Self, KeyPathError> {
        if key.is_empty() {
            return Err(KeyPathError::Empty);
        }
        let segments = key
            .split(SEPARATOR)
            .map(|segment| validate_segment(key, segment).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// All segments but the last: the containers to walk through.
    pub fn parents(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The final segment: where the leaf value lives.
    pub fn leaf(&self) -> &str {
        self.segments
            .last()
            .expect("KeyPath always has at least one segment")
    }

    /// Join back into the stored dotted form.
    pub fn as_key(&self) -> String {
        self.segments.join(".")
    }
}

impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_key())
    }
}
