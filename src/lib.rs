pub mod auth;
pub mod common;
pub mod processing;
pub mod utils;

pub use auth::{ClickMatcher, ClickRecorder, VerificationSession};
pub use common::error::StegoError;
pub use processing::{ClickPoint, Payload, PixelBuffer};
