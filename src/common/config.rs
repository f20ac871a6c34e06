//! # Configuration Utilities
//!
//! Tunables for verification and the display the image is shown at. Every
//! field has a default, so an empty or partial TOML file is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::auth::matcher::DEFAULT_TOLERANCE;

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Arguments
/// - `path`: Path to the TOML configuration file
///
/// # Returns
/// - `Ok(T)`: Successfully loaded and parsed configuration
/// - `Err`: File I/O or parsing error
///
/// # Example
/// ```ignore
/// let config: StegoConfig = load_config("config/stego.toml")?;
/// ```
pub fn load_config<T>(path: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content =
        fs::read_to_string(path).with_context(|| format!("reading config file {}", path))?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Top-level configuration for the `stego` frontend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StegoConfig {
    pub verification: VerificationConfig,
    pub display: DisplayConfig,
}

impl StegoConfig {
    /// Load from `path`, or fall back to defaults when no path is given.
    pub fn from_optional_file(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => load_config(path),
            None => Ok(Self::default()),
        }
    }
}

/// Click verification tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Maximum click distance from a reference point, in display pixels
    pub tolerance: f64,
    /// Failed attempts allowed before the image is locked out
    pub max_failed_attempts: u32,
    /// How long a wrong click stays visible before the attempt resets (ms)
    pub feedback_delay_ms: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_failed_attempts: 3,
            feedback_delay_ms: 1000,
        }
    }
}

/// Size the image is displayed at while clicks are collected. Zero means
/// "use the image's own pixel size".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
}

impl DisplayConfig {
    /// Resolve the display size for an image of `image_width` x `image_height`.
    pub fn resolve(&self, image_width: u32, image_height: u32) -> (f64, f64) {
        let width = if self.width == 0 { image_width } else { self.width };
        let height = if self.height == 0 { image_height } else { self.height };
        (width as f64, height as f64)
    }
}
