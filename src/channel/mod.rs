//! # Channel Module
//!
//! Uniform read contract over directly-wired and multiplexed analog inputs.
//!
//! ## Topologies
//!
//! Small gloves wire every flex sensor to its own ADC pin. Builds with more
//! sensors than ADC pins (multi-knuckle, splay) time-share one ADC pin
//! through an analog multiplexer: digital select lines pick which physical
//! sensor is routed to the shared pin before it is sampled.
//!
//! ## Read ordering
//!
//! A multiplexed read is select, settle, sample. The select lines are shared
//! singular state, so two multiplexed reads must never interleave. All reads
//! go through [`ChannelBank`], whose `&mut self` receiver serializes them by
//! construction.
//!
//! ## Board seams
//!
//! The actual ADC and GPIO access lives behind [`AnalogSource`],
//! [`DigitalSource`] and [`SelectBus`] so the core stays board-agnostic and
//! testable with the mocks in [`mocks`].

use tracing::warn;

/// How a logical channel reaches its physical sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Dedicated ADC pin.
    Direct {
        /// ADC pin number.
        pin: u8,
    },
    /// One input of the shared multiplexer.
    Multiplexed {
        /// Multiplexer input index, driven onto the select lines in binary.
        index: u8,
    },
}

/// One logical analog input, immutable after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel {
    /// Stable identifier, used only for logging.
    pub id: u8,
    /// Physical addressing.
    pub kind: ChannelKind,
}

impl Channel {
    /// Creates a directly-wired channel.
    #[must_use]
    pub fn direct(id: u8, pin: u8) -> Self {
        Self {
            id,
            kind: ChannelKind::Direct { pin },
        }
    }

    /// Creates a multiplexed channel.
    #[must_use]
    pub fn multiplexed(id: u8, index: u8) -> Self {
        Self {
            id,
            kind: ChannelKind::Multiplexed { index },
        }
    }
}

/// Board ADC access.
pub trait AnalogSource {
    /// Samples one ADC pin, returning a raw value in `[0, ANALOG_MAX]`.
    fn sample(&mut self, pin: u8) -> i32;
}

/// Board digital input access (buttons).
pub trait DigitalSource {
    /// Reads one digital pin. `true` is the electrical high level.
    fn read(&mut self, pin: u8) -> bool;
}

/// Multiplexer select-line access.
pub trait SelectBus {
    /// Drives the select lines to the given levels, LSB first.
    fn drive(&mut self, levels: &[bool]);
}

/// Maximum select lines supported (16-input muxes in the reference builds).
pub const MAX_SELECT_LINES: usize = 4;

/// Analog multiplexer: select lines plus one shared ADC pin.
#[derive(Debug)]
pub struct Multiplexer<S: SelectBus> {
    select: S,
    shared_pin: u8,
    line_count: usize,
}

impl<S: SelectBus> Multiplexer<S> {
    /// Creates a multiplexer with `line_count` select lines.
    ///
    /// `line_count` is clamped to [`MAX_SELECT_LINES`].
    #[must_use]
    pub fn new(select: S, shared_pin: u8, line_count: usize) -> Self {
        Self {
            select,
            shared_pin,
            line_count: line_count.min(MAX_SELECT_LINES),
        }
    }

    /// Number of addressable inputs.
    #[must_use]
    pub fn input_count(&self) -> u8 {
        1 << self.line_count
    }

    /// Selects `index` and samples the shared pin.
    ///
    /// Strict ordering: the select lines settle before the sample is taken,
    /// and no other select may be driven until this returns.
    pub fn read(&mut self, adc: &mut dyn AnalogSource, index: u8) -> i32 {
        let mut levels = [false; MAX_SELECT_LINES];
        for (bit, level) in levels.iter_mut().enumerate().take(self.line_count) {
            *level = (index >> bit) & 1 == 1;
        }
        self.select.drive(&levels[..self.line_count]);
        adc.sample(self.shared_pin)
    }
}

/// Serialized access point for all channel and button reads.
///
/// Owning the ADC, GPIO and multiplexer in one place makes the single-writer
/// rule structural: every read borrows the bank mutably, so multiplexed
/// select-and-sample sequences cannot interleave.
pub trait InputBus {
    /// Reads one analog channel.
    fn read_analog(&mut self, channel: &Channel) -> i32;

    /// Reads one digital pin.
    fn read_digital(&mut self, pin: u8) -> bool;
}

/// The concrete bus over board sources.
#[derive(Debug)]
pub struct ChannelBank<A, D, S>
where
    A: AnalogSource,
    D: DigitalSource,
    S: SelectBus,
{
    adc: A,
    gpio: D,
    mux: Option<Multiplexer<S>>,
}

impl<A, D, S> ChannelBank<A, D, S>
where
    A: AnalogSource,
    D: DigitalSource,
    S: SelectBus,
{
    /// Creates a bank; `mux` is `None` on builds without a multiplexer.
    #[must_use]
    pub fn new(adc: A, gpio: D, mux: Option<Multiplexer<S>>) -> Self {
        Self { adc, gpio, mux }
    }

    /// Test access to the underlying ADC.
    #[cfg(test)]
    pub fn adc_mut(&mut self) -> &mut A {
        &mut self.adc
    }

    /// Test access to the underlying GPIO.
    #[cfg(test)]
    pub fn gpio_mut(&mut self) -> &mut D {
        &mut self.gpio
    }
}

impl<A, D, S> InputBus for ChannelBank<A, D, S>
where
    A: AnalogSource,
    D: DigitalSource,
    S: SelectBus,
{
    fn read_analog(&mut self, channel: &Channel) -> i32 {
        match channel.kind {
            ChannelKind::Direct { pin } => self.adc.sample(pin),
            ChannelKind::Multiplexed { index } => match self.mux.as_mut() {
                Some(mux) => mux.read(&mut self.adc, index),
                None => {
                    warn!(channel = channel.id, "multiplexed channel without a multiplexer");
                    0
                }
            },
        }
    }

    fn read_digital(&mut self, pin: u8) -> bool {
        self.gpio.read(pin)
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::*;
    use super::*;

    // ==================== Direct Channel Tests ====================

    #[test]
    fn test_direct_read_returns_pin_sample() {
        let (mut bank, _log) = mock_bank(0, 0);
        bank.adc.set(7, 1234);

        let ch = Channel::direct(0, 7);
        assert_eq!(bank.read_analog(&ch), 1234);
    }

    #[test]
    fn test_direct_read_never_touches_select_lines() {
        let (mut bank, log) = mock_bank(2, 15);
        bank.adc.set(3, 99);

        bank.read_analog(&Channel::direct(0, 3));

        let events = log.lock().unwrap();
        assert_eq!(events.as_slice(), &[BusEvent::Sample(3)]);
    }

    // ==================== Multiplexed Channel Tests ====================

    #[test]
    fn test_mux_drives_binary_encoding_of_index() {
        let (mut bank, log) = mock_bank(4, 15);
        bank.adc.set(15, 2000);

        let ch = Channel::multiplexed(1, 0b0101);
        assert_eq!(bank.read_analog(&ch), 2000);

        let events = log.lock().unwrap();
        assert_eq!(
            events.as_slice(),
            &[
                BusEvent::Select(vec![true, false, true, false]),
                BusEvent::Sample(15),
            ]
        );
    }

    #[test]
    fn test_mux_select_always_precedes_sample() {
        let (mut bank, log) = mock_bank(2, 10);
        bank.adc.set(10, 1);

        for index in 0..4 {
            bank.read_analog(&Channel::multiplexed(index, index));
        }

        let events = log.lock().unwrap();
        for pair in events.chunks(2) {
            assert!(matches!(pair[0], BusEvent::Select(_)));
            assert_eq!(pair[1], BusEvent::Sample(10));
        }
    }

    #[test]
    fn test_mux_reads_do_not_interleave() {
        let (mut bank, log) = mock_bank(2, 10);
        bank.adc.set(10, 1);

        bank.read_analog(&Channel::multiplexed(0, 2));
        bank.read_analog(&Channel::multiplexed(1, 3));

        let events = log.lock().unwrap();
        assert_eq!(
            events.as_slice(),
            &[
                BusEvent::Select(vec![false, true]),
                BusEvent::Sample(10),
                BusEvent::Select(vec![true, true]),
                BusEvent::Sample(10),
            ]
        );
    }

    #[test]
    fn test_mux_channel_without_mux_reads_zero() {
        let (mut bank, _log) = mock_bank(0, 0);
        assert_eq!(bank.read_analog(&Channel::multiplexed(0, 2)), 0);
    }

    // ==================== Digital Tests ====================

    #[test]
    fn test_digital_read() {
        let (mut bank, _log) = mock_bank(0, 0);
        bank.gpio.set(23, true);

        assert!(bank.read_digital(23));
        assert!(!bank.read_digital(24));
    }

    #[test]
    fn test_multiplexer_input_count() {
        let log: BusLog = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mux = Multiplexer::new(MockSelectBus::new(log), 0, 4);
        assert_eq!(mux.input_count(), 16);
    }
}
