//! Key-path validation.
//!
//! The original editor split keys on `.` unchecked; a stray empty segment
//! (`hero..title`) would silently land in the wrong place. Here it is a
//! hard validation error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyPathError {
    #[error("content key cannot be empty")]
    Empty,
    #[error("content key {key:?} contains an empty segment")]
    EmptySegment { key: String },
    #[error("content key {key:?} segment {segment:?} contains illegal character {character:?}")]
    IllegalCharacter {
        key: String,
        segment: String,
        character: char,
    },
}

/// Check one segment of a dotted key; returns the segment on success so
/// callers can map-collect.
pub fn validate_segment<'a>(key: &str, segment: &'a str) -> Result<&'a str, KeyPathError> {
    if segment.is_empty() {
        return Err(KeyPathError::EmptySegment {
            key: key.to_string(),
        });
    }
    if let Some(character) = segment
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '_')
    {
        return Err(KeyPathError::IllegalCharacter {
            key: key.to_string(),
            segment: segment.to_string(),
            character,
        });
    }
    Ok(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_alphanumeric_segments() {
        assert!(validate_segment("hero.button1Text", "button1Text").is_ok());
        assert!(validate_segment("meta.og_title", "og_title").is_ok());
    }

    #[test]
    fn rejects_empty_segment() {
        assert!(matches!(
            validate_segment("hero..title", ""),
            Err(KeyPathError::EmptySegment { .. })
        ));
    }

    #[test]
    fn rejects_punctuation() {
        let err = validate_segment("hero.a-b", "a-b").unwrap_err();
        match err {
            KeyPathError::IllegalCharacter { character, .. } => assert_eq!(character, '-'),
            other => panic!("unexpected error: {other}"),
        }
    }
}
