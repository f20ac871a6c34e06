//! # Error Model
//!
//! A single error enum covers every failure the codec, the click matcher and
//! the image loader can report. Callers match on the variant; the frontend
//! only ever prints it.

use thiserror::Error;

/// Every failure the library can surface.
#[derive(Debug, Error)]
pub enum StegoError {
    /// The serialized payload plus terminator does not fit in the carrier.
    #[error("image too small for this message: need {required} bits but only have {available} bits available")]
    CapacityExceeded { required: usize, available: usize },

    /// The scan reached the last pixel without seeing the terminator.
    #[error("no hidden message found")]
    NoPayloadFound,

    /// A terminator was found but the text before it is not a payload.
    #[error("hidden data is not a valid payload: {0}")]
    MalformedPayload(String),

    /// A click did not match the expected point. Retrying is allowed.
    #[error("incorrect click sequence, {attempts_left} attempts left")]
    VerificationFailed { attempts_left: u32 },

    /// Too many failed verification sessions against the same image.
    #[error("too many failed attempts ({attempts}), load the image again")]
    LockedOut { attempts: u32 },

    #[error("reference click sequence is empty")]
    EmptyReference,

    /// A click arrived after the matcher reached Verified or Failed.
    #[error("verification session is not accepting clicks")]
    SessionInactive,

    /// A click could not be placed on the displayed image.
    #[error("invalid click at ({x}, {y}) on a {width}x{height} display")]
    InvalidClick { x: f64, y: f64, width: f64, height: f64 },

    #[error("click sequence already has {max} points")]
    TooManyPoints { max: usize },

    #[error("click sequence needs at least {min} points, got {got}")]
    TooFewPoints { min: usize, got: usize },

    /// The requested output path would store the carrier in a lossy format.
    #[error("refusing to write lossy format `{0}`, use .png")]
    LossyOutput(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StegoError {
    /// True for the outcomes a UI shows as "no hidden message".
    pub fn is_absent_payload(&self) -> bool {
        matches!(self, StegoError::NoPayloadFound | StegoError::MalformedPayload(_))
    }
}

pub type Result<T> = std::result::Result<T, StegoError>;
