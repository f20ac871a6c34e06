//! # Click Matcher
//!
//! Compares a live stream of clicks against the reference sequence pulled out
//! of the image, one step at a time.
//!
//! ## State Machine
//!
//! ```text
//! Verifying(0) --match--> Verifying(1) --match--> ... --last match--> Verified
//!      ^                        |
//!      |                     mismatch
//!      +------- reset() ---- Failed
//! ```
//!
//! Each click is compared only against the point expected at the current
//! step, so the right points in the wrong order never verify.

use log::{debug, info};

use crate::common::error::{Result, StegoError};
use crate::processing::payload::ClickPoint;

/// Maximum distance in display pixels between a click and its reference point.
pub const DEFAULT_TOLERANCE: f64 = 25.0;

/// Where a matcher session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherState {
    /// Waiting for the click at this step
    Verifying { step: usize },
    /// Every point matched in order. Terminal.
    Verified,
    /// Last click missed. Call [`ClickMatcher::reset`] to try again.
    Failed,
}

/// What a single click did to the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    /// Click matched; `remaining` more are needed.
    Advanced { step: usize, remaining: usize },
    /// Click matched the last point.
    Verified,
    /// Click was `distance` pixels from the expected point.
    Failed { distance: f64 },
}

/// A click as it was made on the display, kept for visual feedback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptPoint {
    pub x: f64,
    pub y: f64,
    pub matched: bool,
}

/// One verification session against a fixed reference sequence.
#[derive(Debug, Clone)]
pub struct ClickMatcher {
    reference: Vec<ClickPoint>,
    display_width: f64,
    display_height: f64,
    tolerance: f64,
    current_step: usize,
    attempt_log: Vec<AttemptPoint>,
    state: MatcherState,
}

impl ClickMatcher {
    /// Start a session for an image shown at `display_width` x `display_height`.
    ///
    /// The reference is ordered by each point's `order` field, so a sequence
    /// stored out of order still verifies in the order it was recorded.
    pub fn new(
        mut reference: Vec<ClickPoint>,
        display_width: f64,
        display_height: f64,
        tolerance: f64,
    ) -> Result<Self> {
        if reference.is_empty() {
            return Err(StegoError::EmptyReference);
        }
        reference.sort_by_key(|p| p.order);

        Ok(Self {
            reference,
            display_width,
            display_height,
            tolerance,
            current_step: 0,
            attempt_log: Vec::new(),
            state: MatcherState::Verifying { step: 0 },
        })
    }

    pub fn state(&self) -> MatcherState {
        self.state
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn point_count(&self) -> usize {
        self.reference.len()
    }

    pub fn is_verified(&self) -> bool {
        self.state == MatcherState::Verified
    }

    /// Clicks made so far in this session, including a failing one.
    pub fn attempt_log(&self) -> &[AttemptPoint] {
        &self.attempt_log
    }

    /// Compare a click at display coordinates `(x, y)` with the current step.
    ///
    /// A mismatch leaves the matcher in [`MatcherState::Failed`] with the
    /// wrong click still in [`Self::attempt_log`]. It does not return to step
    /// 0 on its own: call [`Self::reset`] (after any feedback delay) before
    /// the next click. [`VerificationSession`](crate::auth::VerificationSession)
    /// does this for you.
    ///
    /// # Errors
    /// [`StegoError::SessionInactive`] once the session is Verified, or Failed
    /// and not yet reset.
    pub fn submit_click(&mut self, x: f64, y: f64) -> Result<ClickOutcome> {
        if !matches!(self.state, MatcherState::Verifying { .. }) {
            return Err(StegoError::SessionInactive);
        }

        let (expected_x, expected_y) = self.reference[self.current_step]
            .denormalize(self.display_width, self.display_height);
        let (dx, dy) = (x - expected_x, y - expected_y);
        let distance = (dx * dx + dy * dy).sqrt();
        let matched = distance <= self.tolerance;

        self.attempt_log.push(AttemptPoint { x, y, matched });

        if !matched {
            debug!(
                "Click {} missed by {:.1}px (tolerance {:.1})",
                self.current_step + 1,
                distance,
                self.tolerance
            );
            self.state = MatcherState::Failed;
            return Ok(ClickOutcome::Failed { distance });
        }

        self.current_step += 1;
        if self.current_step == self.reference.len() {
            info!("Click sequence verified");
            self.state = MatcherState::Verified;
            return Ok(ClickOutcome::Verified);
        }

        debug!("Click {} of {} matched", self.current_step, self.reference.len());
        self.state = MatcherState::Verifying {
            step: self.current_step,
        };
        Ok(ClickOutcome::Advanced {
            step: self.current_step,
            remaining: self.reference.len() - self.current_step,
        })
    }

    /// Abandon the current attempt and wait for the first point again.
    pub fn reset(&mut self) {
        self.current_step = 0;
        self.attempt_log.clear();
        self.state = MatcherState::Verifying { step: 0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> Vec<ClickPoint> {
        vec![
            ClickPoint::new(0.25, 0.25, 0),
            ClickPoint::new(0.75, 0.25, 1),
            ClickPoint::new(0.5, 0.75, 2),
        ]
    }

    #[test]
    fn test_exact_sequence_verifies() {
        let mut matcher = ClickMatcher::new(reference(), 400.0, 400.0, DEFAULT_TOLERANCE).unwrap();

        assert_eq!(
            matcher.submit_click(100.0, 100.0).unwrap(),
            ClickOutcome::Advanced { step: 1, remaining: 2 }
        );
        assert_eq!(
            matcher.submit_click(300.0, 100.0).unwrap(),
            ClickOutcome::Advanced { step: 2, remaining: 1 }
        );
        assert_eq!(matcher.submit_click(200.0, 300.0).unwrap(), ClickOutcome::Verified);
        assert!(matcher.is_verified());
        assert_eq!(matcher.attempt_log().len(), 3);
    }

    #[test]
    fn test_mismatch_fails_and_keeps_feedback_until_reset() {
        let mut matcher = ClickMatcher::new(reference(), 400.0, 400.0, DEFAULT_TOLERANCE).unwrap();
        matcher.submit_click(100.0, 100.0).unwrap();

        let outcome = matcher.submit_click(10.0, 10.0).unwrap();
        assert!(matches!(outcome, ClickOutcome::Failed { .. }));
        assert_eq!(matcher.state(), MatcherState::Failed);
        assert_eq!(matcher.attempt_log().len(), 2);
        assert!(!matcher.attempt_log()[1].matched);

        matcher.reset();
        assert_eq!(matcher.state(), MatcherState::Verifying { step: 0 });
        assert_eq!(matcher.current_step(), 0);
        assert!(matcher.attempt_log().is_empty());
    }

    #[test]
    fn test_clicks_after_terminal_state_are_rejected() {
        let mut matcher = ClickMatcher::new(reference(), 400.0, 400.0, DEFAULT_TOLERANCE).unwrap();
        matcher.submit_click(0.0, 400.0).unwrap();
        assert!(matches!(
            matcher.submit_click(100.0, 100.0),
            Err(StegoError::SessionInactive)
        ));
    }

    #[test]
    fn test_failed_matcher_accepts_clicks_after_reset() {
        let mut matcher = ClickMatcher::new(reference(), 400.0, 400.0, DEFAULT_TOLERANCE).unwrap();
        matcher.submit_click(0.0, 0.0).unwrap();
        assert!(matches!(
            matcher.submit_click(100.0, 100.0),
            Err(StegoError::SessionInactive)
        ));

        matcher.reset();
        assert_eq!(
            matcher.submit_click(100.0, 100.0).unwrap(),
            ClickOutcome::Advanced { step: 1, remaining: 2 }
        );
    }

    #[test]
    fn test_empty_reference_rejected() {
        assert!(matches!(
            ClickMatcher::new(vec![], 100.0, 100.0, DEFAULT_TOLERANCE),
            Err(StegoError::EmptyReference)
        ));
    }

    #[test]
    fn test_reference_sorted_by_order() {
        let mut shuffled = reference();
        shuffled.reverse();
        let mut matcher = ClickMatcher::new(shuffled, 400.0, 400.0, DEFAULT_TOLERANCE).unwrap();

        assert!(matches!(
            matcher.submit_click(100.0, 100.0).unwrap(),
            ClickOutcome::Advanced { step: 1, .. }
        ));
    }

    #[test]
    fn test_scales_with_display_size() {
        let mut matcher = ClickMatcher::new(reference(), 800.0, 200.0, DEFAULT_TOLERANCE).unwrap();
        matcher.submit_click(200.0, 50.0).unwrap();
        matcher.submit_click(600.0, 50.0).unwrap();
        assert_eq!(matcher.submit_click(400.0, 150.0).unwrap(), ClickOutcome::Verified);
    }
}
