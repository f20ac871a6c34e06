//! # Image Processing and Steganography
//!
//! The hidden-channel codec: [`payload`] defines what is hidden and its wire
//! text, [`steganography`] moves that text in and out of red-channel LSBs.

pub mod payload;
pub mod steganography;

// Re-export main functions for convenience
pub use payload::{ClickPoint, Payload, MAX_CLICK_POINTS, MIN_CLICK_POINTS};
pub use steganography::{
    capacity_bits, decode, embed_payload_bytes, encode, extract_payload_bytes, required_bits,
    try_decode, PixelBuffer,
};
