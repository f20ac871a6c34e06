//! # Common Components
//!
//! Shared utilities used by the codec, the click-sequence authentication and
//! the frontend.
//!
//! ## Modules
//!
//! - [`error`]: The crate-wide error type
//! - [`config`]: Configuration parsing utilities
//! - [`image_io`]: Loading carriers and writing lossless PNG output

pub mod config;
pub mod error;
pub mod image_io;
