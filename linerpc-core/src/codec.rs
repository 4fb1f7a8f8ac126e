//! Low-level line codec
//!
//! This module is the layer below [`crate::types`]: it knows how to turn raw
//! bytes into a generic `serde_json::Value` (or fail with a `SyntaxError`),
//! how to serialize a `Value` back into one LF-terminated line, and how to
//! split a read segment into individual candidate lines. It does not know
//! anything about `Request`/`Response` shapes — that validation lives in
//! `types`, which is what lets a malformed method name and a malformed id be
//! reported as distinct error variants instead of one opaque deserialize
//! failure.
//!
//! Keeping this split mirrors how the codec/types boundary sits in spirit:
//! transport and framing concerns stay out of the object model, and the
//! object model stays out of byte-level concerns.

use crate::error::Result;
use serde_json::Value;

/// Parse one frame's bytes into a generic JSON value.
///
/// Any JSON syntax error is reported as [`crate::Error::SyntaxError`] — the
/// caller is responsible for further structural validation.
pub fn parse_value(bytes: &[u8]) -> Result<Value> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Serialize a JSON value to a compact line, terminated by exactly one `\n`.
pub fn write_value(value: &Value) -> Result<String> {
    let mut s = serde_json::to_string(value)?;
    s.push('\n');
    Ok(s)
}

/// Split a read segment into non-empty candidate lines on `\n`.
///
/// A trailing `\n` produces no empty trailing element; interior blank lines
/// are silently skipped, matching the newline-delimited JSON convention that
/// blank lines carry no frame.
pub fn split_lines(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    bytes.split(|&b| b == b'\n').filter(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_value_rejects_garbage() {
        assert!(parse_value(b"{ not json").is_err());
    }

    #[test]
    fn parse_value_accepts_object() {
        let v = parse_value(br#"{"a":1}"#).unwrap();
        assert!(v.is_object());
    }

    #[test]
    fn write_value_terminates_with_newline() {
        let line = write_value(&Value::from(1)).unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line, "1\n");
    }

    #[test]
    fn split_lines_skips_blank_lines() {
        let lines: Vec<&[u8]> = split_lines(b"a\n\nb\n").collect();
        assert_eq!(lines, vec![b"a".as_slice(), b"b".as_slice()]);
    }

    #[test]
    fn split_lines_handles_no_trailing_newline() {
        let lines: Vec<&[u8]> = split_lines(b"a\nb").collect();
        assert_eq!(lines, vec![b"a".as_slice(), b"b".as_slice()]);
    }
}
