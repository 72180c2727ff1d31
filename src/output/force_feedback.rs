//! # Force Feedback Output
//!
//! Per-finger servo limiter: the host sends a limit in `0..1000` naming how
//! far a finger may still travel, and the servo blocks motion past it.
//!
//! ## Scaling
//!
//! The limit scales to a servo angle either over the declared full range or
//! over the finger's dynamically learned calibrated range
//! ([`FfbScaling::CalibratedRange`]): a wearer who only ever covers 60% of
//! the sensor's travel gets 60% of the servo throw, so the physical stop
//! lands where their finger actually is. While the finger is uncalibrated
//! the full range is used.

use crate::protocol::decoder;

/// Upper bound of the host's limit scale.
pub const FFB_LIMIT_MAX: i32 = 1000;

/// Servo travel in degrees.
pub const SERVO_ANGLE_MAX: i32 = 180;

/// How a limit maps onto servo travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfbScaling {
    /// Limit 1000 is full servo throw.
    FullRange,
    /// Limit 1000 is the finger's observed calibrated span.
    CalibratedRange,
}

/// Request to move one force-feedback servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoRequest {
    /// Finger code the servo belongs to.
    pub code: char,
    /// Target angle in `[0, 180]` degrees.
    pub angle: i32,
}

/// One per-finger force-feedback output.
#[derive(Debug)]
pub struct ForceFeedback {
    code: char,
    scaling: FfbScaling,
    /// Flips the servo direction for mirrored linkages.
    invert: bool,
    limit: i32,
}

impl ForceFeedback {
    /// Creates an unrestricted force-feedback output.
    #[must_use]
    pub fn new(code: char, scaling: FfbScaling, invert: bool) -> Self {
        Self {
            code,
            scaling,
            invert,
            limit: 0,
        }
    }

    /// Decodes this finger's limit from `frame` and produces a servo
    /// request.
    ///
    /// An absent field means "no new command": the last limit is retained
    /// and no request is produced. The limit is clamped to the actuator's
    /// safe bounds before scaling.
    pub fn apply(&mut self, frame: &str, span_fraction: Option<f32>) -> Option<ServoRequest> {
        let limit = decoder::get_argument(frame, self.code)?;
        self.limit = limit.clamp(0, FFB_LIMIT_MAX);
        Some(ServoRequest {
            code: self.code,
            angle: self.angle(span_fraction),
        })
    }

    /// Scales the current limit to a servo angle.
    fn angle(&self, span_fraction: Option<f32>) -> i32 {
        let travel = match self.scaling {
            FfbScaling::FullRange => 1.0,
            FfbScaling::CalibratedRange => span_fraction.unwrap_or(1.0),
        };
        let throw = (self.limit as f32 / FFB_LIMIT_MAX as f32) * travel * SERVO_ANGLE_MAX as f32;
        let throw = (throw as i32).clamp(0, SERVO_ANGLE_MAX);

        // Limit 0 rests the servo at the unrestricted end of its travel.
        if self.invert {
            throw
        } else {
            SERVO_ANGLE_MAX - throw
        }
    }

    /// Last decoded limit.
    #[must_use]
    pub fn limit(&self) -> i32 {
        self.limit
    }

    /// Finger code this output listens for.
    #[must_use]
    pub fn code(&self) -> char {
        self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codes::output as out_codes;

    fn ffb() -> ForceFeedback {
        ForceFeedback::new(out_codes::FFB_INDEX, FfbScaling::FullRange, false)
    }

    // ==================== Decode Tests ====================

    #[test]
    fn test_decodes_own_field() {
        let mut f = ffb();
        let req = f.apply("A500B300\n", None).unwrap();
        assert_eq!(f.limit(), 300);
        assert_eq!(req.code, 'B');
    }

    #[test]
    fn test_absent_field_retains_state() {
        let mut f = ffb();
        f.apply("B750\n", None).unwrap();
        assert_eq!(f.limit(), 750);

        // A frame for other fingers leaves this one untouched.
        assert!(f.apply("A500\n", None).is_none());
        assert_eq!(f.limit(), 750);
    }

    #[test]
    fn test_limit_clamped_to_safe_bounds() {
        let mut f = ffb();
        f.apply("B9999\n", None).unwrap();
        assert_eq!(f.limit(), FFB_LIMIT_MAX);

        f.apply("B-5\n", None).unwrap();
        assert_eq!(f.limit(), 0);
    }

    // ==================== Scaling Tests ====================

    #[test]
    fn test_full_range_scaling_endpoints() {
        let mut f = ffb();
        let req = f.apply("B0\n", None).unwrap();
        assert_eq!(req.angle, SERVO_ANGLE_MAX);

        let req = f.apply("B1000\n", None).unwrap();
        assert_eq!(req.angle, 0);
    }

    #[test]
    fn test_half_limit_is_half_throw() {
        let mut f = ffb();
        let req = f.apply("B500\n", None).unwrap();
        assert_eq!(req.angle, SERVO_ANGLE_MAX - 90);
    }

    #[test]
    fn test_inverted_servo_direction() {
        let mut f = ForceFeedback::new(out_codes::FFB_INDEX, FfbScaling::FullRange, true);
        let req = f.apply("B1000\n", None).unwrap();
        assert_eq!(req.angle, SERVO_ANGLE_MAX);

        let req = f.apply("B0\n", None).unwrap();
        assert_eq!(req.angle, 0);
    }

    #[test]
    fn test_calibrated_scaling_shrinks_throw() {
        let mut f = ForceFeedback::new(out_codes::FFB_INDEX, FfbScaling::CalibratedRange, false);

        // Wearer covers half the sensor travel: full limit is half throw.
        let req = f.apply("B1000\n", Some(0.5)).unwrap();
        assert_eq!(req.angle, SERVO_ANGLE_MAX - 90);
    }

    #[test]
    fn test_calibrated_scaling_falls_back_while_uncalibrated() {
        let mut f = ForceFeedback::new(out_codes::FFB_INDEX, FfbScaling::CalibratedRange, false);
        let req = f.apply("B1000\n", None).unwrap();
        assert_eq!(req.angle, 0);
    }
}
