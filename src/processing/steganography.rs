//! # LSB Steganography Implementation
//!
//! Hides a [`Payload`] in the least significant bit of the red channel of an
//! RGBA image, one bit per pixel.
//!
//! ## Algorithm
//!
//! ### Encoding Process
//! 1. Serialize the payload to its wire text (one byte per character)
//! 2. Expand each byte to 8 bits, most significant bit first
//! 3. Append the 16-bit terminator `1111111111111110`
//! 4. For bit `i`, overwrite the LSB of the red channel of pixel `i`
//!    (row-major), leaving green, blue and alpha untouched
//!
//! ### Decoding Process
//! 1. Read red LSBs in the same order
//! 2. Stop as soon as the last 16 bits read equal the terminator
//! 3. Drop the terminator and any trailing partial byte
//! 4. Map each byte to a character and parse the payload
//!
//! ### Capacity
//! An image holds `width * height` bits, terminator included.
//!
//! Example: An 800x600 image can store ~60 KB of payload text.
//!
//! Because the wire text is pure ASCII, every embedded byte has a zero high
//! bit, so the terminator can never appear inside the payload itself.

use image::RgbaImage;
use log::{debug, info};

use crate::common::error::{Result, StegoError};
use crate::common::image_io::{decode_pixel_buffer, encode_png};
use crate::processing::payload::Payload;

/// Raster carrier: width x height RGBA pixels, 8 bits per channel, row-major.
pub type PixelBuffer = RgbaImage;

/// End-of-payload marker, `1111111111111110`.
pub const TERMINATOR: u16 = 0xFFFE;
/// Length of [`TERMINATOR`] in bits.
pub const TERMINATOR_BITS: usize = 16;

/// Channel offset carrying the hidden bits.
const RED: usize = 0;

/// Number of payload bits the buffer can hold, terminator included.
pub fn capacity_bits(buffer: &PixelBuffer) -> usize {
    let (width, height) = buffer.dimensions();
    width as usize * height as usize
}

/// Number of bits `payload` needs, terminator included.
pub fn required_bits(payload: &Payload) -> Result<usize> {
    Ok(payload.to_wire_text()?.len() * 8 + TERMINATOR_BITS)
}

/// Turn a payload into the exact bit sequence written to the image.
fn payload_bits(payload: &Payload) -> Result<Vec<u8>> {
    let text = payload.to_wire_text()?;
    let mut bits = Vec::with_capacity(text.len() * 8 + TERMINATOR_BITS);

    for byte in text.bytes() {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
    for shift in (0..TERMINATOR_BITS).rev() {
        bits.push(((TERMINATOR >> shift) & 1) as u8);
    }

    Ok(bits)
}

/// Embed `payload` into `buffer` in place.
///
/// # Errors
/// - [`StegoError::CapacityExceeded`] if the image has fewer pixels than
///   payload bits. The buffer is left untouched in that case.
/// - [`StegoError::MalformedPayload`] if a click point lies outside `[0,1]`.
pub fn encode(buffer: &mut PixelBuffer, payload: &Payload) -> Result<()> {
    let bits = payload_bits(payload)?;
    let available = capacity_bits(buffer);

    if bits.len() > available {
        return Err(StegoError::CapacityExceeded {
            required: bits.len(),
            available,
        });
    }

    // pixels_mut walks the buffer row by row
    for (pixel, bit) in buffer.pixels_mut().zip(bits.iter()) {
        pixel[RED] = (pixel[RED] & 0xFE) | bit;
    }

    debug!(
        "Embedded {} bits ({} click points) into {} available",
        bits.len(),
        payload.click_sequence.len(),
        available
    );
    Ok(())
}

/// Extract a payload, reporting why nothing was found.
///
/// # Errors
/// - [`StegoError::NoPayloadFound`] if no terminator occurs in the image
/// - [`StegoError::MalformedPayload`] if the hidden text is not a payload
pub fn try_decode(buffer: &PixelBuffer) -> Result<Payload> {
    let mut bits: Vec<u8> = Vec::new();
    let mut window: u16 = 0;
    let mut terminated = false;

    for pixel in buffer.pixels() {
        let bit = pixel[RED] & 1;
        bits.push(bit);
        window = (window << 1) | bit as u16;

        if bits.len() >= TERMINATOR_BITS && window == TERMINATOR {
            terminated = true;
            break;
        }
    }

    if !terminated {
        return Err(StegoError::NoPayloadFound);
    }

    bits.truncate(bits.len() - TERMINATOR_BITS);
    let text: String = bits
        .chunks_exact(8)
        .map(|byte| char::from(byte.iter().fold(0u8, |acc, bit| (acc << 1) | bit)))
        .collect();

    debug!("Found terminator after {} payload bits", bits.len());
    Payload::from_wire_text(&text)
}

/// Extract a payload, or `None` when the image carries no valid one.
pub fn decode(buffer: &PixelBuffer) -> Option<Payload> {
    match try_decode(buffer) {
        Ok(payload) => Some(payload),
        Err(e) => {
            debug!("No payload recovered: {}", e);
            None
        }
    }
}

/// Embed a payload into an encoded image file.
///
/// # Arguments
/// - `image_bytes`: Raw bytes of the carrier (any format supported by `image` crate)
/// - `payload`: Message and click sequence to hide
///
/// # Returns
/// - `Ok(Vec<u8>)`: PNG image bytes with the embedded payload
/// - `Err`: If the image can't be loaded, is too small, or PNG encoding fails
///
/// # Example
/// ```ignore
/// let image_data = std::fs::read("input.jpg")?;
/// let stego = embed_payload_bytes(&image_data, &payload)?;
/// std::fs::write("output.png", stego)?;
/// ```
pub fn embed_payload_bytes(image_bytes: &[u8], payload: &Payload) -> Result<Vec<u8>> {
    let mut img = decode_pixel_buffer(image_bytes)?;
    let (width, height) = img.dimensions();

    encode(&mut img, payload)?;
    let output_bytes = encode_png(&img)?;

    info!(
        "Hid {} character message in {}x{} carrier ({} bytes PNG)",
        payload.message.chars().count(),
        width,
        height,
        output_bytes.len()
    );
    Ok(output_bytes)
}

/// Extract a payload from an encoded image file.
///
/// Returns `Ok(None)` when the image decodes but carries no payload; `Err`
/// only when the bytes are not an image at all.
pub fn extract_payload_bytes(image_bytes: &[u8]) -> Result<Option<Payload>> {
    let img = decode_pixel_buffer(image_bytes)?;
    Ok(decode(&img))
}
