//! # Verification Session
//!
//! The retry policy wrapped around [`ClickMatcher`] sessions for one loaded
//! image. The caller owns one `VerificationSession` per image and feeds it
//! clicks; the session hands back the hidden message once the sequence
//! verifies, and locks out after too many failed attempts.
//!
//! After a lockout all state is dropped, including the decoded payload, so
//! the image has to be loaded again.

use log::{info, warn};

use crate::auth::matcher::{ClickMatcher, ClickOutcome, MatcherState};
use crate::common::config::VerificationConfig;
use crate::common::error::{Result, StegoError};
use crate::processing::payload::Payload;

/// What an accepted click meant for the whole session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Click matched, more to go.
    Progress { step: usize, remaining: usize },
    /// Sequence verified. Carries the hidden message.
    Unlocked(String),
}

/// Verification state for a single loaded image.
#[derive(Debug)]
pub struct VerificationSession {
    config: VerificationConfig,
    message: Option<String>,
    matcher: Option<ClickMatcher>,
    failed_attempts: u32,
}

impl VerificationSession {
    /// Start verifying `payload` shown at `display_width` x `display_height`.
    pub fn new(
        payload: Payload,
        display_width: f64,
        display_height: f64,
        config: VerificationConfig,
    ) -> Result<Self> {
        let matcher = ClickMatcher::new(
            payload.click_sequence,
            display_width,
            display_height,
            config.tolerance,
        )?;

        info!(
            "Verification started: {} points, tolerance {:.1}px, {} attempts",
            matcher.point_count(),
            config.tolerance,
            config.max_failed_attempts
        );

        Ok(Self {
            config,
            message: Some(payload.message),
            matcher: Some(matcher),
            failed_attempts: 0,
        })
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn is_locked_out(&self) -> bool {
        self.matcher.is_none()
    }

    /// The live matcher, for drawing attempt feedback.
    pub fn matcher(&self) -> Option<&ClickMatcher> {
        self.matcher.as_ref()
    }

    /// Clear a failed attempt so the sequence can be entered from the start.
    ///
    /// Frontends call this once the wrong click has been shown. A click
    /// submitted while the last attempt is still failed does the same.
    pub fn retry(&mut self) {
        if let Some(matcher) = self.matcher.as_mut() {
            if matcher.state() == MatcherState::Failed {
                matcher.reset();
            }
        }
    }

    /// Feed one click at display coordinates.
    ///
    /// # Errors
    /// - [`StegoError::VerificationFailed`] when the click missed and more
    ///   attempts remain
    /// - [`StegoError::LockedOut`] when this failure used up the last attempt,
    ///   and on every call after that
    /// - [`StegoError::SessionInactive`] after the message was already unlocked
    pub fn submit_click(&mut self, x: f64, y: f64) -> Result<SessionEvent> {
        self.retry();

        let matcher = self.matcher.as_mut().ok_or(StegoError::LockedOut {
            attempts: self.failed_attempts,
        })?;

        match matcher.submit_click(x, y)? {
            ClickOutcome::Advanced { step, remaining } => {
                Ok(SessionEvent::Progress { step, remaining })
            }
            ClickOutcome::Verified => {
                let message = self.message.take().ok_or(StegoError::SessionInactive)?;
                Ok(SessionEvent::Unlocked(message))
            }
            ClickOutcome::Failed { .. } => {
                self.failed_attempts += 1;

                if self.failed_attempts >= self.config.max_failed_attempts {
                    warn!(
                        "Locked out after {} failed attempts, discarding payload",
                        self.failed_attempts
                    );
                    self.matcher = None;
                    self.message = None;
                    return Err(StegoError::LockedOut {
                        attempts: self.failed_attempts,
                    });
                }

                let attempts_left = self.config.max_failed_attempts - self.failed_attempts;
                warn!("Incorrect click sequence, {} attempts left", attempts_left);
                Err(StegoError::VerificationFailed { attempts_left })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::payload::ClickPoint;

    fn payload() -> Payload {
        Payload::new(
            "the eagle has landed",
            vec![
                ClickPoint::new(0.1, 0.1, 0),
                ClickPoint::new(0.9, 0.1, 1),
                ClickPoint::new(0.5, 0.9, 2),
            ],
        )
    }

    fn session() -> VerificationSession {
        VerificationSession::new(payload(), 100.0, 100.0, VerificationConfig::default()).unwrap()
    }

    #[test]
    fn test_unlocks_message() {
        let mut session = session();
        session.submit_click(10.0, 10.0).unwrap();
        session.submit_click(90.0, 10.0).unwrap();
        assert_eq!(
            session.submit_click(50.0, 90.0).unwrap(),
            SessionEvent::Unlocked("the eagle has landed".to_string())
        );
    }

    #[test]
    fn test_failed_attempt_keeps_feedback_until_retry() {
        let mut session = session();
        session.submit_click(10.0, 10.0).unwrap();
        assert!(session.submit_click(50.0, 50.0).is_err());

        let matcher = session.matcher().unwrap();
        assert_eq!(matcher.state(), MatcherState::Failed);
        assert_eq!(matcher.attempt_log().len(), 2);

        session.retry();
        let matcher = session.matcher().unwrap();
        assert_eq!(matcher.current_step(), 0);
        assert!(matcher.attempt_log().is_empty());
    }

    #[test]
    fn test_failure_counts_down_then_locks_out() {
        let mut session = session();

        assert!(matches!(
            session.submit_click(90.0, 90.0),
            Err(StegoError::VerificationFailed { attempts_left: 2 })
        ));
        session.submit_click(10.0, 10.0).unwrap();
        assert!(matches!(
            session.submit_click(10.0, 90.0),
            Err(StegoError::VerificationFailed { attempts_left: 1 })
        ));
        assert!(matches!(
            session.submit_click(50.0, 50.0),
            Err(StegoError::LockedOut { attempts: 3 })
        ));
        assert!(session.is_locked_out());
        assert!(matches!(
            session.submit_click(10.0, 10.0),
            Err(StegoError::LockedOut { .. })
        ));
    }
}
