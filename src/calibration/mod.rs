//! # Calibration Module
//!
//! Online auto-ranging min/max calibration for glove flex sensors.
//!
//! ## Auto-ranging
//!
//! Flex sensor travel varies per glove build and per wearer, so absolute ADC
//! values are meaningless until the wearer has flexed through their range.
//! [`MinMaxCalibrator`] learns the observed range on the fly: every sample fed
//! to [`update`](MinMaxCalibrator::update) can only widen the learned bounds,
//! and [`calibrate`](MinMaxCalibrator::calibrate) rescales raw samples from
//! the learned range onto the requested output range.
//!
//! ## Uncalibrated sentinel
//!
//! A freshly constructed (or reset) calibrator holds an inverted range
//! (`observed_min = output_max`, `observed_max = output_min`). While in that
//! state, `calibrate` returns the exact midpoint of the output range, a
//! neutral value rather than an error.
//!
//! ## Usage
//!
//! ```
//! use glove_link::calibration::MinMaxCalibrator;
//!
//! let mut cal = MinMaxCalibrator::new(0, 4095, true);
//!
//! // No samples yet: neutral midpoint.
//! assert_eq!(cal.calibrate(1000, 0, 4095), 2047);
//!
//! cal.update(500);
//! cal.update(3500);
//!
//! // Learned range endpoints map to the output range endpoints.
//! assert_eq!(cal.calibrate(500, 0, 4095), 0);
//! assert_eq!(cal.calibrate(3500, 0, 4095), 4095);
//! ```

/// Linearly remaps `x` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// No clamping is applied; inputs outside the source range extrapolate.
///
/// # Examples
///
/// ```
/// use glove_link::calibration::map_range;
///
/// assert_eq!(map_range(5.0, 0.0, 10.0, 0.0, 100.0), 50.0);
/// ```
#[must_use]
pub fn map_range(x: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Online min/max calibrator for a single analog channel.
///
/// Construction fixes the output range used for the uncalibrated sentinel;
/// each [`calibrate`](Self::calibrate) call names its own target range so a
/// caller can also project other values onto the learned range (used by
/// force-feedback finger scaling).
#[derive(Debug, Clone, Copy)]
pub struct MinMaxCalibrator {
    /// Lower bound of the canonical output range.
    output_min: i32,
    /// Upper bound of the canonical output range.
    output_max: i32,
    /// Smallest raw sample seen since the last reset.
    observed_min: i32,
    /// Largest raw sample seen since the last reset.
    observed_max: i32,
    /// Whether calibrated values are locked to the requested output range.
    clamp: bool,
}

impl MinMaxCalibrator {
    /// Creates a calibrator in the uncalibrated sentinel state.
    ///
    /// # Arguments
    ///
    /// * `output_min` - Lower bound of the canonical output range
    /// * `output_max` - Upper bound of the canonical output range
    /// * `clamp` - Lock calibrated values to the requested range
    #[must_use]
    pub fn new(output_min: i32, output_max: i32, clamp: bool) -> Self {
        Self {
            output_min,
            output_max,
            observed_min: output_max,
            observed_max: output_min,
            clamp,
        }
    }

    /// Restores the uncalibrated sentinel, forcing recalibration.
    pub fn reset(&mut self) {
        self.observed_min = self.output_max;
        self.observed_max = self.output_min;
    }

    /// Feeds one raw sample into the learned range.
    ///
    /// Bounds only ever widen: `observed_min` is non-increasing and
    /// `observed_max` is non-decreasing over any update sequence.
    pub fn update(&mut self, raw: i32) {
        if raw < self.observed_min {
            self.observed_min = raw;
        }
        if raw > self.observed_max {
            self.observed_max = raw;
        }
    }

    /// Rescales `raw` from the learned range onto `[out_min, out_max]`.
    ///
    /// Returns the exact midpoint `(out_min + out_max) / 2` while
    /// uncalibrated, or while the learned range is still a single point.
    /// When clamping is enabled the result is locked to the requested range;
    /// otherwise inputs beyond the learned bounds extrapolate.
    #[must_use]
    pub fn calibrate(&self, raw: i32, out_min: i32, out_max: i32) -> i32 {
        // Inverted bounds mean no calibration data yet.
        if self.observed_min > self.observed_max {
            return (out_min + out_max) / 2;
        }

        // A single observed sample has no usable span.
        if self.observed_min == self.observed_max {
            return (out_min + out_max) / 2;
        }

        let mapped = map_range(
            raw as f32,
            self.observed_min as f32,
            self.observed_max as f32,
            out_min as f32,
            out_max as f32,
        ) as i32;

        if self.clamp {
            mapped.clamp(out_min.min(out_max), out_min.max(out_max))
        } else {
            mapped
        }
    }

    /// Returns the learned `(min, max)` bounds, or `None` while uncalibrated.
    #[must_use]
    pub fn observed(&self) -> Option<(i32, i32)> {
        if self.is_uncalibrated() {
            None
        } else {
            Some((self.observed_min, self.observed_max))
        }
    }

    /// Returns true if no sample has been observed since the last reset.
    #[must_use]
    pub fn is_uncalibrated(&self) -> bool {
        self.observed_min > self.observed_max
    }

    /// Fraction of the canonical output range covered by the learned range.
    ///
    /// `None` while uncalibrated. Used by force-feedback finger scaling to
    /// shrink actuator travel to the wearer's actual range of motion.
    #[must_use]
    pub fn observed_span_fraction(&self) -> Option<f32> {
        if self.is_uncalibrated() {
            return None;
        }
        let full = (self.output_max - self.output_min) as f32;
        if full == 0.0 {
            return None;
        }
        Some((self.observed_max - self.observed_min) as f32 / full)
    }
}
