//! # Click-Sequence Authentication
//!
//! ## Recording ([`recorder`])
//! Turns the clicks made while hiding a message into a normalized 3-4 point
//! sequence.
//!
//! ## Matching ([`matcher`])
//! Step-by-step comparison of live clicks with the reference sequence.
//!
//! ## Session policy ([`session`])
//! Retry counting and lockout across matcher attempts for one image.

pub mod matcher;
pub mod recorder;
pub mod session;

// Re-export for convenience
pub use matcher::{AttemptPoint, ClickMatcher, ClickOutcome, MatcherState, DEFAULT_TOLERANCE};
pub use recorder::ClickRecorder;
pub use session::{SessionEvent, VerificationSession};
