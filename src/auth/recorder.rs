//! # Click Recorder
//!
//! Encode-side counterpart of the matcher: collects the clicks a user makes on
//! the displayed image and turns them into a normalized click sequence.

use log::{debug, warn};

use crate::common::error::{Result, StegoError};
use crate::processing::payload::{ClickPoint, MAX_CLICK_POINTS, MIN_CLICK_POINTS};

/// Records 3-4 clicks on an image shown at a fixed display size.
#[derive(Debug, Clone)]
pub struct ClickRecorder {
    display_width: f64,
    display_height: f64,
    points: Vec<ClickPoint>,
}

impl ClickRecorder {
    pub fn new(display_width: f64, display_height: f64) -> Self {
        Self {
            display_width,
            display_height,
            points: Vec::with_capacity(MAX_CLICK_POINTS),
        }
    }

    /// Record a click at display coordinates. Clicks outside the image are
    /// clamped onto its edge.
    ///
    /// # Errors
    /// - [`StegoError::TooManyPoints`] once four points are recorded
    /// - [`StegoError::InvalidClick`] for a non-finite coordinate or an empty
    ///   display
    pub fn record(&mut self, x: f64, y: f64) -> Result<ClickPoint> {
        if self.points.len() >= MAX_CLICK_POINTS {
            return Err(StegoError::TooManyPoints {
                max: MAX_CLICK_POINTS,
            });
        }

        let invalid = || StegoError::InvalidClick {
            x,
            y,
            width: self.display_width,
            height: self.display_height,
        };
        let nx = normalize(x, self.display_width).ok_or_else(invalid)?;
        let ny = normalize(y, self.display_height).ok_or_else(invalid)?;

        let point = ClickPoint::new(nx, ny, self.points.len() as u32);
        debug!("Recorded point {} at ({:.3}, {:.3})", point.order, point.x, point.y);
        self.points.push(point);
        Ok(point)
    }

    /// Drop the most recent point.
    pub fn undo(&mut self) -> Option<ClickPoint> {
        self.points.pop()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[ClickPoint] {
        &self.points
    }

    pub fn is_ready(&self) -> bool {
        self.points.len() >= MIN_CLICK_POINTS
    }

    /// Hand over the recorded sequence.
    pub fn finish(self) -> Result<Vec<ClickPoint>> {
        if !self.is_ready() {
            return Err(StegoError::TooFewPoints {
                min: MIN_CLICK_POINTS,
                got: self.points.len(),
            });
        }
        Ok(self.points)
    }
}

fn normalize(value: f64, extent: f64) -> Option<f64> {
    if !value.is_finite() || !extent.is_finite() || extent <= 0.0 {
        warn!("Rejecting click coordinate {} on extent {}", value, extent);
        return None;
    }
    Some((value / extent).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_normalized_points_in_order() {
        let mut recorder = ClickRecorder::new(200.0, 100.0);
        recorder.record(50.0, 25.0).unwrap();
        recorder.record(100.0, 50.0).unwrap();
        recorder.record(250.0, -10.0).unwrap();

        let points = recorder.finish().unwrap();
        assert_eq!(points[0], ClickPoint::new(0.25, 0.25, 0));
        assert_eq!(points[1], ClickPoint::new(0.5, 0.5, 1));
        assert_eq!(points[2], ClickPoint::new(1.0, 0.0, 2));
    }

    #[test]
    fn test_limits() {
        let mut recorder = ClickRecorder::new(100.0, 100.0);
        recorder.record(1.0, 1.0).unwrap();
        recorder.record(2.0, 2.0).unwrap();
        assert!(!recorder.is_ready());
        assert!(matches!(
            recorder.clone().finish(),
            Err(StegoError::TooFewPoints { min: 3, got: 2 })
        ));

        recorder.record(3.0, 3.0).unwrap();
        recorder.record(4.0, 4.0).unwrap();
        assert!(matches!(
            recorder.record(5.0, 5.0),
            Err(StegoError::TooManyPoints { max: 4 })
        ));
    }

    #[test]
    fn test_non_finite_click_rejected() {
        let mut recorder = ClickRecorder::new(100.0, 100.0);
        assert!(matches!(
            recorder.record(f64::NAN, 10.0),
            Err(StegoError::InvalidClick { .. })
        ));
        assert!(matches!(
            recorder.record(10.0, f64::INFINITY),
            Err(StegoError::InvalidClick { .. })
        ));
        assert!(recorder.points().is_empty());

        let mut empty_display = ClickRecorder::new(0.0, 100.0);
        assert!(matches!(
            empty_display.record(0.0, 10.0),
            Err(StegoError::InvalidClick { .. })
        ));
    }

    #[test]
    fn test_clear_discards_points() {
        let mut recorder = ClickRecorder::new(100.0, 100.0);
        recorder.record(10.0, 10.0).unwrap();
        recorder.record(20.0, 20.0).unwrap();
        assert_eq!(recorder.points().len(), 2);

        recorder.clear();
        assert!(recorder.points().is_empty());
        assert_eq!(recorder.record(30.0, 30.0).unwrap().order, 0);
    }

    #[test]
    fn test_undo_reuses_order() {
        let mut recorder = ClickRecorder::new(100.0, 100.0);
        recorder.record(10.0, 10.0).unwrap();
        recorder.record(20.0, 20.0).unwrap();
        recorder.undo();

        let point = recorder.record(30.0, 30.0).unwrap();
        assert_eq!(point.order, 1);
    }
}
