//! # Actuator Output Module
//!
//! Consumes decoded host commands and produces physical actuation requests.
//!
//! Each output decodes its own field(s) independently from the full inbound
//! frame; there is no shared decode state, so a frame that only carries
//! some fields updates only the outputs it names. Driving the hardware
//! (servo pulses, waveform timers) is delegated to external collaborators;
//! the core only emits [`Actuation`] requests.

pub mod force_feedback;
pub mod haptics;

pub use force_feedback::{FfbScaling, ForceFeedback, ServoRequest};
pub use haptics::{HapticMotor, HapticPulse};

/// One physical actuation request produced by a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Actuation {
    /// Move a force-feedback servo.
    Servo(ServoRequest),
    /// Play a haptic pulse.
    Haptic(HapticPulse),
}

/// One entry of the output set.
#[derive(Debug)]
pub enum Output {
    /// Per-finger force-feedback limiter.
    ForceFeedback(ForceFeedback),
    /// Haptic vibration motor.
    Haptic(HapticMotor),
}

impl Output {
    /// Decodes this output's fields from `frame`.
    ///
    /// `spans` maps finger codes to their observed calibrated span fraction
    /// for finger-scaled force feedback. Returns `None` when the frame
    /// carries nothing for this output, in which case its state is retained.
    pub fn apply(&mut self, frame: &str, spans: &[(char, Option<f32>)]) -> Option<Actuation> {
        match self {
            Output::ForceFeedback(ffb) => {
                let span = spans
                    .iter()
                    .find(|(code, _)| *code == ffb.code())
                    .and_then(|(_, span)| *span);
                ffb.apply(frame, span).map(Actuation::Servo)
            }
            Output::Haptic(motor) => motor.apply(frame).map(Actuation::Haptic),
        }
    }
}
