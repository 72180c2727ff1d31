//! # Button Input
//!
//! Physical buttons, wired either to a digital pin with a pull-up or to an
//! analog channel (multiplexed builds route spare mux inputs to buttons).
//!
//! A pressed button encodes as its bare type-code character; an unpressed
//! button contributes zero bytes to the frame.

use crate::channel::{Channel, InputBus};
use crate::protocol::{encoder, Encodable};

/// How a button reaches its hardware.
#[derive(Debug, Clone, Copy)]
enum Wiring {
    /// Digital pin, pull-up wiring: pressed pulls the line low.
    Digital { pin: u8 },
    /// Analog channel compared against a half-scale threshold.
    Analog { channel: Channel, threshold: i32 },
}

/// One physical button.
#[derive(Debug)]
pub struct Button {
    code: char,
    wiring: Wiring,
    /// Flips the electrical level treated as "pressed" (normally-closed
    /// switches).
    invert: bool,
    pressed: bool,
}

impl Button {
    /// Creates a button on a digital pin.
    ///
    /// With `invert = false` the line is pull-up wired and pressed reads
    /// low, matching the reference hardware.
    #[must_use]
    pub fn digital(code: char, pin: u8, invert: bool) -> Self {
        Self {
            code,
            wiring: Wiring::Digital { pin },
            invert,
            pressed: false,
        }
    }

    /// Creates a button behind an analog channel.
    ///
    /// The level is the comparison of the sample against `threshold`.
    #[must_use]
    pub fn analog(code: char, channel: Channel, threshold: i32, invert: bool) -> Self {
        Self {
            code,
            wiring: Wiring::Analog { channel, threshold },
            invert,
            pressed: false,
        }
    }

    /// Samples the button's level.
    pub fn read(&mut self, bus: &mut dyn InputBus) {
        let level = match self.wiring {
            Wiring::Digital { pin } => bus.read_digital(pin),
            Wiring::Analog { channel, threshold } => bus.read_analog(&channel) > threshold,
        };
        self.pressed = level == self.invert;
    }

    /// Latest sampled state.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// This button's type code.
    #[must_use]
    pub fn code(&self) -> char {
        self.code
    }
}

impl Encodable for Button {
    fn encode(&self, out: &mut String) -> usize {
        if self.pressed {
            encoder::push_flag(out, self.code)
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::mocks::mock_bank;
    use crate::protocol::codes;

    // ==================== Digital Wiring Tests ====================

    #[test]
    fn test_pullup_button_pressed_when_low() {
        let (mut bank, _log) = mock_bank(0, 0);
        let mut btn = Button::digital(codes::input::A_BTN, 8, false);

        // Line floating high: not pressed.
        bank.gpio_mut().set(8, true);
        btn.read(&mut bank);
        assert!(!btn.is_pressed());

        // Pressed pulls the line low.
        bank.gpio_mut().set(8, false);
        btn.read(&mut bank);
        assert!(btn.is_pressed());
    }

    #[test]
    fn test_inverted_button_pressed_when_high() {
        let (mut bank, _log) = mock_bank(0, 0);
        let mut btn = Button::digital(codes::input::B_BTN, 9, true);

        bank.gpio_mut().set(9, true);
        btn.read(&mut bank);
        assert!(btn.is_pressed());
    }

    // ==================== Analog Wiring Tests ====================

    #[test]
    fn test_analog_button_threshold() {
        let (mut bank, _log) = mock_bank(0, 0);
        let ch = Channel::direct(0, 4);
        let mut btn = Button::analog(codes::input::MENU, ch, 2048, true);

        bank.adc_mut().set(4, 3000);
        btn.read(&mut bank);
        assert!(btn.is_pressed());

        bank.adc_mut().set(4, 100);
        btn.read(&mut bank);
        assert!(!btn.is_pressed());
    }

    // ==================== Encoding Tests ====================

    #[test]
    fn test_pressed_button_encodes_bare_code() {
        let (mut bank, _log) = mock_bank(0, 0);
        let mut btn = Button::digital(codes::input::TRIGGER, 10, true);
        bank.gpio_mut().set(10, true);
        btn.read(&mut bank);

        let mut out = String::new();
        assert_eq!(btn.encode(&mut out), 1);
        assert_eq!(out, "I");
    }

    #[test]
    fn test_unpressed_button_encodes_nothing() {
        let btn = Button::digital(codes::input::TRIGGER, 10, true);
        let mut out = String::new();
        assert_eq!(btn.encode(&mut out), 0);
        assert!(out.is_empty());
    }
}
