//! # Hidden Payload
//!
//! The data carried inside the image: a text message plus the ordered click
//! points that unlock it.
//!
//! ## Wire Format
//!
//! The payload is written as compact JSON with keys in this order:
//!
//! ```text
//! {"message":"hi","clickSequence":[{"x":0.25,"y":0.5,"order":0},...]}
//! ```
//!
//! Each character of that text becomes exactly one byte. Non-ASCII characters
//! are emitted as `\uXXXX` escapes so no character needs more than 8 bits,
//! and bytes are read back as the character with the same code point.

use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use std::io;

use crate::common::error::{Result, StegoError};

/// Smallest click sequence a user may record.
pub const MIN_CLICK_POINTS: usize = 3;
/// Largest click sequence a user may record.
pub const MAX_CLICK_POINTS: usize = 4;

/// One point of the click password, relative to the image size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickPoint {
    /// Horizontal position as a fraction of the width (0.0 - 1.0)
    pub x: f64,
    /// Vertical position as a fraction of the height (0.0 - 1.0)
    pub y: f64,
    /// Position of this point in the sequence, starting at 0
    pub order: u32,
}

impl ClickPoint {
    pub fn new(x: f64, y: f64, order: u32) -> Self {
        Self { x, y, order }
    }

    /// Scale the normalized point to a display of `width` x `height` pixels.
    pub fn denormalize(&self, width: f64, height: f64) -> (f64, f64) {
        (self.x * width, self.y * height)
    }

    fn is_normalized(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && (0.0..=1.0).contains(&self.x)
            && (0.0..=1.0).contains(&self.y)
    }
}

/// Message plus the click sequence guarding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub message: String,
    pub click_sequence: Vec<ClickPoint>,
}

impl Payload {
    /// Build a payload without checking the sequence length.
    ///
    /// The codec itself accepts any number of points; use [`Payload::checked`]
    /// when the value comes from user input.
    pub fn new(message: impl Into<String>, click_sequence: Vec<ClickPoint>) -> Self {
        Self {
            message: message.into(),
            click_sequence,
        }
    }

    /// Build a payload, enforcing the 3-4 point rule.
    pub fn checked(message: impl Into<String>, click_sequence: Vec<ClickPoint>) -> Result<Self> {
        if click_sequence.len() < MIN_CLICK_POINTS {
            return Err(StegoError::TooFewPoints {
                min: MIN_CLICK_POINTS,
                got: click_sequence.len(),
            });
        }
        if click_sequence.len() > MAX_CLICK_POINTS {
            return Err(StegoError::TooManyPoints {
                max: MAX_CLICK_POINTS,
            });
        }
        Ok(Self::new(message, click_sequence))
    }

    /// Serialize to the wire text. Every character of the result is ASCII.
    ///
    /// Points outside the unit square are rejected here so that nothing is
    /// written that [`Payload::from_wire_text`] would refuse to read back.
    pub fn to_wire_text(&self) -> Result<String> {
        self.validate()?;
        let mut out = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter);
        self.serialize(&mut ser)
            .map_err(|e| StegoError::MalformedPayload(e.to_string()))?;
        Ok(out.into_iter().map(char::from).collect())
    }

    /// Parse wire text and check it actually describes a payload.
    pub fn from_wire_text(text: &str) -> Result<Self> {
        let payload: Payload = serde_json::from_str(text)
            .map_err(|e| StegoError::MalformedPayload(e.to_string()))?;
        payload.validate()?;
        Ok(payload)
    }

    fn validate(&self) -> Result<()> {
        if let Some(point) = self.click_sequence.iter().find(|p| !p.is_normalized()) {
            return Err(StegoError::MalformedPayload(format!(
                "click point {} is outside the image ({}, {})",
                point.order, point.x, point.y
            )));
        }
        Ok(())
    }
}

/// Compact JSON formatter that escapes everything outside ASCII as UTF-16
/// `\uXXXX` units.
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Vec<ClickPoint> {
        vec![
            ClickPoint::new(0.1, 0.2, 0),
            ClickPoint::new(0.5, 0.5, 1),
            ClickPoint::new(0.9, 0.8, 2),
        ]
    }

    #[test]
    fn test_wire_text_key_order() {
        let payload = Payload::new("hi", vec![ClickPoint::new(0.25, 0.5, 0)]);
        assert_eq!(
            payload.to_wire_text().unwrap(),
            r#"{"message":"hi","clickSequence":[{"x":0.25,"y":0.5,"order":0}]}"#
        );
    }

    #[test]
    fn test_non_ascii_is_escaped() {
        let payload = Payload::new("café 🙂", triangle());
        let text = payload.to_wire_text().unwrap();

        assert!(text.is_ascii());
        assert!(text.contains("caf\\u00e9 \\ud83d\\ude42"));
        assert_eq!(Payload::from_wire_text(&text).unwrap(), payload);
    }

    #[test]
    fn test_missing_click_sequence_is_malformed() {
        let err = Payload::from_wire_text(r#"{"message":"hi"}"#).unwrap_err();
        assert!(matches!(err, StegoError::MalformedPayload(_)));
    }

    #[test]
    fn test_out_of_range_point_is_malformed() {
        let text = r#"{"message":"hi","clickSequence":[{"x":1.5,"y":0.5,"order":0}]}"#;
        assert!(matches!(
            Payload::from_wire_text(text),
            Err(StegoError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_checked_enforces_length() {
        assert!(Payload::checked("m", triangle()).is_ok());
        assert!(matches!(
            Payload::checked("m", triangle()[..2].to_vec()),
            Err(StegoError::TooFewPoints { min: 3, got: 2 })
        ));

        let mut five = triangle();
        five.push(ClickPoint::new(0.0, 0.0, 3));
        five.push(ClickPoint::new(1.0, 1.0, 4));
        assert!(matches!(
            Payload::checked("m", five),
            Err(StegoError::TooManyPoints { max: 4 })
        ));
    }

    #[test]
    fn test_denormalize() {
        let point = ClickPoint::new(0.5, 0.25, 0);
        assert_eq!(point.denormalize(200.0, 400.0), (100.0, 100.0));
    }
}
