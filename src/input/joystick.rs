//! # Joystick Axis Input
//!
//! One analog joystick axis with a configurable deadzone around the resting
//! midpoint to suppress drift, mirroring the reference firmware's joystick
//! handling.

use crate::channel::{Channel, InputBus};
use crate::protocol::{encoder, Encodable};

/// One joystick axis.
#[derive(Debug)]
pub struct JoystickAxis {
    code: char,
    channel: Channel,
    /// Deadzone as a fraction of half travel (0.0 to 1.0).
    deadzone: f32,
    invert: bool,
    analog_max: i32,
    value: i32,
}

impl JoystickAxis {
    /// Creates a joystick axis.
    ///
    /// # Arguments
    ///
    /// * `code` - Wire type code (`F` or `G` on the reference pinout)
    /// * `channel` - Analog channel the axis potentiometer is wired to
    /// * `deadzone` - Fraction of half travel snapped to center, clamped to 0..1
    /// * `invert` - Reverse the axis direction
    /// * `analog_max` - Full-scale ADC value
    #[must_use]
    pub fn new(code: char, channel: Channel, deadzone: f32, invert: bool, analog_max: i32) -> Self {
        Self {
            code,
            channel,
            deadzone: deadzone.clamp(0.0, 1.0),
            invert,
            analog_max,
            value: analog_max / 2,
        }
    }

    /// Samples the axis and applies invert and deadzone.
    pub fn read(&mut self, bus: &mut dyn InputBus) {
        let mut raw = bus.read_analog(&self.channel);
        if self.invert {
            raw = self.analog_max - raw;
        }

        let mid = self.analog_max / 2;
        let zone = (self.deadzone * mid as f32) as i32;
        self.value = if (raw - mid).abs() <= zone { mid } else { raw };
    }

    /// Latest axis value in `[0, analog_max]`, resting at the midpoint.
    #[must_use]
    pub fn value(&self) -> i32 {
        self.value
    }
}

impl Encodable for JoystickAxis {
    fn encode(&self, out: &mut String) -> usize {
        encoder::push_value(out, self.code, self.value)
    }
}
