// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Parser for values of the Free Music Player Specification (FMPS).
//!
//! FMPS values are lists of fields. Lists are separated by `;;` and fields inside a list by `::`,
//! e.g. `user@example.com::0.8;;other@example.com::0.6`. A backslash escapes the next character.

use thiserror::Error;

/// Encountered when an FMPS value is malformed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmpsError {
    /// The value ends with a backslash.
    #[error("FMPS value ends with an unterminated escape sequence")]
    DanglingEscape,
}

/// A single field of an FMPS value.
#[derive(Debug, Clone, PartialEq)]
pub enum FmpsValue {
    /// Field that contains a number.
    Number(f64),
    /// Field that contains text.
    Text(String),
}

impl FmpsValue {
    /// Create a value from a raw field, preferring the numeric interpretation.
    fn from_field(field: String) -> Self {
        field
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map_or(FmpsValue::Text(field), FmpsValue::Number)
    }

    /// The numeric value, if this is a number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            Self::Text(_) => None,
        }
    }
}

/// Parsed FMPS value.
pub type FmpsResult = Vec<Vec<FmpsValue>>;

/// Parse an FMPS value.
///
/// # Errors
///
/// Returns an error if the text ends with an unterminated escape sequence.
pub fn parse(text: &str) -> Result<FmpsResult, FmpsError> {
    let mut result: FmpsResult = Vec::new();
    if text.is_empty() {
        return Ok(result);
    }

    let mut list = Vec::new();
    let mut field = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => field.push(chars.next().ok_or(FmpsError::DanglingEscape)?),
            ';' if chars.peek() == Some(&';') => {
                let _ = chars.next();
                list.push(FmpsValue::from_field(std::mem::take(&mut field)));
                result.push(std::mem::take(&mut list));
            }
            ':' if chars.peek() == Some(&':') => {
                let _ = chars.next();
                list.push(FmpsValue::from_field(std::mem::take(&mut field)));
            }
            c => field.push(c),
        }
    }
    list.push(FmpsValue::from_field(field));
    result.push(list);

    Ok(result)
}

/// Parse an FMPS value and return the number at the given list and field position.
///
/// Malformed values are logged and treated like missing values.
#[must_use]
pub fn number_at(text: &str, list: usize, field: usize) -> Option<f64> {
    match parse(text) {
        Ok(result) => result
            .get(list)
            .and_then(|values| values.get(field))
            .and_then(FmpsValue::as_number),
        Err(err) => {
            log::warn!("Ignoring malformed FMPS value {text:?}: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse(""), Ok(vec![]));
    }

    #[test]
    fn test_parse_single_number() {
        assert_eq!(parse("0.8"), Ok(vec![vec![FmpsValue::Number(0.8)]]));
    }

    #[test]
    fn test_parse_user_values() {
        assert_eq!(
            parse("alice@example.com::0.8;;bob@example.com::0.2"),
            Ok(vec![
                vec![
                    FmpsValue::Text("alice@example.com".to_string()),
                    FmpsValue::Number(0.8)
                ],
                vec![
                    FmpsValue::Text("bob@example.com".to_string()),
                    FmpsValue::Number(0.2)
                ],
            ])
        );
    }

    #[test]
    fn test_parse_escapes() {
        assert_eq!(
            parse(r"a\:\:b::c\;\;d\\"),
            Ok(vec![vec![
                FmpsValue::Text("a::b".to_string()),
                FmpsValue::Text(r"c;;d\".to_string()),
            ]])
        );
    }

    #[test]
    fn test_parse_single_separator_characters_are_text() {
        assert_eq!(
            parse("a:b;c"),
            Ok(vec![vec![FmpsValue::Text("a:b;c".to_string())]])
        );
    }

    #[test]
    fn test_parse_dangling_escape() {
        assert_eq!(parse(r"0.5\"), Err(FmpsError::DanglingEscape));
    }

    #[test]
    fn test_number_at() {
        assert_eq!(number_at("user::0.6", 0, 1), Some(0.6));
        assert_eq!(number_at("user::0.6", 0, 0), None);
        assert_eq!(number_at("user::0.6", 1, 0), None);
        assert_eq!(number_at("12", 0, 0), Some(12.0));
        assert_eq!(number_at(r"\", 0, 0), None);
    }
}
