//! # Haptic Output
//!
//! Decodes the host's (frequency, duration, amplitude) triple into a
//! [`HapticPulse`] request. Generating and timing the waveform is the
//! actuator driver's job, not the core's.

use crate::protocol::decoder;

/// One requested haptic pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HapticPulse {
    /// Vibration frequency in Hz.
    pub frequency: i32,
    /// Pulse duration in milliseconds.
    pub duration: i32,
    /// Drive amplitude, host-defined scale.
    pub amplitude: i32,
}

/// One haptic motor listening for its three fields.
#[derive(Debug)]
pub struct HapticMotor {
    frequency_key: char,
    duration_key: char,
    amplitude_key: char,
    last: Option<HapticPulse>,
}

impl HapticMotor {
    /// Creates a motor bound to its three field codes.
    #[must_use]
    pub fn new(frequency_key: char, duration_key: char, amplitude_key: char) -> Self {
        Self {
            frequency_key,
            duration_key,
            amplitude_key,
            last: None,
        }
    }

    /// Decodes a pulse from `frame`.
    ///
    /// Only a complete triple produces a request; a frame missing any of the
    /// three fields leaves the motor untouched.
    pub fn apply(&mut self, frame: &str) -> Option<HapticPulse> {
        let pulse = HapticPulse {
            frequency: decoder::get_argument(frame, self.frequency_key)?,
            duration: decoder::get_argument(frame, self.duration_key)?,
            amplitude: decoder::get_argument(frame, self.amplitude_key)?,
        };
        self.last = Some(pulse);
        Some(pulse)
    }

    /// Last complete pulse decoded, if any.
    #[must_use]
    pub fn last_pulse(&self) -> Option<HapticPulse> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codes::output as out_codes;

    fn motor() -> HapticMotor {
        HapticMotor::new(
            out_codes::HAPTIC_FREQ,
            out_codes::HAPTIC_DURATION,
            out_codes::HAPTIC_AMPLITUDE,
        )
    }

    // ==================== Decode Tests ====================

    #[test]
    fn test_complete_triple_produces_pulse() {
        let mut m = motor();
        let pulse = m.apply("F490G10H300\n").unwrap();
        assert_eq!(
            pulse,
            HapticPulse {
                frequency: 490,
                duration: 10,
                amplitude: 300,
            }
        );
        assert_eq!(m.last_pulse(), Some(pulse));
    }

    #[test]
    fn test_triple_decodes_among_other_fields() {
        let mut m = motor();
        let pulse = m.apply("A500B300F100G20H512\n").unwrap();
        assert_eq!(pulse.frequency, 100);
        assert_eq!(pulse.duration, 20);
        assert_eq!(pulse.amplitude, 512);
    }

    #[test]
    fn test_incomplete_triple_is_ignored() {
        let mut m = motor();
        assert!(m.apply("F490G10\n").is_none());
        assert!(m.apply("A500\n").is_none());
        assert!(m.last_pulse().is_none());
    }

    #[test]
    fn test_incomplete_triple_retains_last_pulse() {
        let mut m = motor();
        m.apply("F490G10H300\n").unwrap();
        assert!(m.apply("F100\n").is_none());
        assert_eq!(m.last_pulse().unwrap().frequency, 490);
    }
}
