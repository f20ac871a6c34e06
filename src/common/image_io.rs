//! # Carrier Image I/O
//!
//! Everything between image files and the in-memory [`PixelBuffer`] the codec
//! works on. Output is always PNG; lossy formats would destroy the hidden
//! bits.

use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use log::{debug, info};
use std::io::Cursor;
use std::path::Path;

use crate::common::error::{Result, StegoError};
use crate::processing::steganography::PixelBuffer;

/// Extensions that must never be used for a carrier holding a payload.
const LOSSY_EXTENSIONS: &[&str] = &["jpg", "jpeg", "webp", "avif"];

/// Decode any supported image format into an RGBA buffer.
pub fn decode_pixel_buffer(image_bytes: &[u8]) -> Result<PixelBuffer> {
    let img = image::load_from_memory(image_bytes)?;
    let buffer = img.to_rgba8();
    debug!(
        "Decoded {}x{} carrier from {} bytes",
        buffer.width(),
        buffer.height(),
        image_bytes.len()
    );
    Ok(buffer)
}

/// Read and decode an image file.
pub fn load_pixel_buffer(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    let bytes = std::fs::read(path)?;
    decode_pixel_buffer(&bytes)
}

/// Read an image file on the tokio runtime and decode it on a blocking
/// thread, handing back a ready buffer for the synchronous codec.
pub async fn load_pixel_buffer_async(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    tokio::task::spawn_blocking(move || decode_pixel_buffer(&bytes))
        .await
        .map_err(|e| StegoError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
}

/// Encode the buffer as PNG.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let mut output_bytes = Vec::new();
    buffer.write_to(&mut Cursor::new(&mut output_bytes), ImageFormat::Png)?;
    Ok(output_bytes)
}

/// Reject output paths whose extension names a lossy format.
pub fn ensure_lossless_path(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if LOSSY_EXTENSIONS.contains(&extension.as_str()) {
        return Err(StegoError::LossyOutput(extension));
    }
    Ok(())
}

/// Write the buffer to `path` as PNG.
pub fn save_png(buffer: &PixelBuffer, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    ensure_lossless_path(path)?;
    buffer.save_with_format(path, ImageFormat::Png)?;
    info!("Saved carrier to {}", path.display());
    Ok(())
}

/// Render PNG bytes as a `data:` URL suitable for pasting into a browser.
pub fn png_data_url(png_bytes: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(png_bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_png_bytes_round_trip_exactly() {
        let mut img = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]));
        img.put_pixel(3, 4, Rgba([11, 21, 31, 128]));

        let png = encode_png(&img).unwrap();
        assert_eq!(decode_pixel_buffer(&png).unwrap(), img);
    }

    #[test]
    fn test_lossy_extensions_rejected() {
        assert!(ensure_lossless_path(Path::new("out.png")).is_ok());
        assert!(ensure_lossless_path(Path::new("out")).is_ok());
        assert!(matches!(
            ensure_lossless_path(Path::new("out.JPG")),
            Err(StegoError::LossyOutput(ext)) if ext == "jpg"
        ));
    }

    #[test]
    fn test_data_url_prefix() {
        let url = png_data_url(&[0x89, b'P', b'N', b'G']);
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }
}
