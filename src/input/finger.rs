//! # Finger Model
//!
//! Configurable multi-knuckle finger tracking with optional splay.
//!
//! ## Topologies
//!
//! A finger is a curl strategy composed with an optional splay section:
//!
//! - **Single**: one sensor spans the whole finger; curl is its calibrated
//!   value.
//! - **Dual**: two sensors, plus a *derived third joint* modeled from the
//!   second knuckle (see [`CouplingCurve`]); curl is the mean of all three.
//! - **Triple**: three independently calibrated sensors; curl is their mean.
//!
//! Splay wraps any of the three, adding one independently calibrated
//! side-to-side channel. The six combinations are built by composition;
//! there is no finger type hierarchy.
//!
//! ## Wire tokens
//!
//! The primary knuckle uses the finger's single-character code (`B2047`);
//! extra knuckles and splay use parenthesized compound keys appended after
//! it (`(BB)2047`, `(BC)2047`, `(BA)2047`), matching the host driver's
//! multi-joint convention.

use crate::calibration::{map_range, MinMaxCalibrator};
use crate::channel::{Channel, InputBus};
use crate::protocol::{codes, encoder, Encodable};

/// Tuning for the derived third joint of dual-knuckle builds.
///
/// The outer joint of a real finger starts moving only after the middle
/// joint is partway through its travel and saturates well before the middle
/// joint finishes. The derived value remaps the second knuckle's
/// `[start, end]` sub-range of full scale onto the full output range,
/// clamped outside it.
#[derive(Debug, Clone, Copy)]
pub struct CouplingCurve {
    /// Fraction of full scale where the derived joint starts moving.
    pub start: f32,
    /// Fraction of full scale where the derived joint saturates.
    pub end: f32,
}

impl Default for CouplingCurve {
    fn default() -> Self {
        // Thresholds measured on the reference hardware.
        Self {
            start: 0.10,
            end: 0.50,
        }
    }
}

impl CouplingCurve {
    /// Derives the third-joint value from the second knuckle's calibrated
    /// value.
    #[must_use]
    pub fn derive(&self, knuckle2: i32, analog_max: i32) -> i32 {
        let min = (analog_max as f32 * self.start) as i32;
        let max = (analog_max as f32 * self.end) as i32;
        let clamped = knuckle2.clamp(min, max);
        map_range(clamped as f32, min as f32, max as f32, 0.0, analog_max as f32) as i32
    }
}

/// One sensed knuckle: a channel and its own calibrator.
#[derive(Debug)]
struct Knuckle {
    channel: Channel,
    calibrator: MinMaxCalibrator,
}

impl Knuckle {
    fn new(channel: Channel, analog_max: i32, clamp: bool) -> Self {
        Self {
            channel,
            calibrator: MinMaxCalibrator::new(0, analog_max, clamp),
        }
    }

    /// Samples, optionally inverts, feeds calibration, and maps to the
    /// canonical output range.
    fn read(&mut self, bus: &mut dyn InputBus, invert: bool, calibrating: bool, analog_max: i32) -> i32 {
        let mut raw = bus.read_analog(&self.channel);
        if invert {
            raw = analog_max - raw;
        }
        if calibrating {
            self.calibrator.update(raw);
        }
        self.calibrator.calibrate(raw, 0, analog_max)
    }
}

/// Interchangeable curl strategy: how many knuckles are sensed.
#[derive(Debug)]
enum CurlStrategy {
    Single {
        knuckle: Knuckle,
    },
    Dual {
        knuckles: [Knuckle; 2],
        coupling: CouplingCurve,
    },
    Triple {
        knuckles: [Knuckle; 3],
    },
}

/// Independently calibrated splay section.
#[derive(Debug)]
struct Splay {
    channel: Channel,
    calibrator: MinMaxCalibrator,
    invert: bool,
}

/// Construction options shared by every finger topology.
#[derive(Debug, Clone, Copy)]
pub struct FingerOptions {
    /// Reverse curl direction before calibration.
    pub invert_curl: bool,
    /// Reverse splay direction before calibration.
    pub invert_splay: bool,
    /// Full-scale ADC value.
    pub analog_max: i32,
    /// Lock calibrated values to the output range.
    pub clamp: bool,
    /// Derived-joint tuning for dual-knuckle builds.
    pub coupling: CouplingCurve,
}

impl Default for FingerOptions {
    fn default() -> Self {
        Self {
            invert_curl: false,
            invert_splay: false,
            analog_max: 4095,
            clamp: true,
            coupling: CouplingCurve::default(),
        }
    }
}

/// One tracked finger.
#[derive(Debug)]
pub struct Finger {
    code: char,
    curl: CurlStrategy,
    splay: Option<Splay>,
    invert_curl: bool,
    analog_max: i32,
    calibrating: bool,
    /// Per-knuckle calibrated values; single-knuckle builds use index 0.
    values: [i32; 3],
    splay_value: i32,
}

impl Finger {
    /// Creates a single-knuckle finger.
    #[must_use]
    pub fn single(code: char, k0: Channel, splay: Option<Channel>, opts: FingerOptions) -> Self {
        Self::build(
            code,
            CurlStrategy::Single {
                knuckle: Knuckle::new(k0, opts.analog_max, opts.clamp),
            },
            splay,
            opts,
        )
    }

    /// Creates a dual-knuckle finger with a derived third joint.
    #[must_use]
    pub fn dual(code: char, k0: Channel, k1: Channel, splay: Option<Channel>, opts: FingerOptions) -> Self {
        Self::build(
            code,
            CurlStrategy::Dual {
                knuckles: [
                    Knuckle::new(k0, opts.analog_max, opts.clamp),
                    Knuckle::new(k1, opts.analog_max, opts.clamp),
                ],
                coupling: opts.coupling,
            },
            splay,
            opts,
        )
    }

    /// Creates a triple-knuckle finger.
    #[must_use]
    pub fn triple(
        code: char,
        k0: Channel,
        k1: Channel,
        k2: Channel,
        splay: Option<Channel>,
        opts: FingerOptions,
    ) -> Self {
        Self::build(
            code,
            CurlStrategy::Triple {
                knuckles: [
                    Knuckle::new(k0, opts.analog_max, opts.clamp),
                    Knuckle::new(k1, opts.analog_max, opts.clamp),
                    Knuckle::new(k2, opts.analog_max, opts.clamp),
                ],
            },
            splay,
            opts,
        )
    }

    fn build(code: char, curl: CurlStrategy, splay: Option<Channel>, opts: FingerOptions) -> Self {
        let midpoint = opts.analog_max / 2;
        Self {
            code,
            curl,
            splay: splay.map(|channel| Splay {
                channel,
                calibrator: MinMaxCalibrator::new(0, opts.analog_max, opts.clamp),
                invert: opts.invert_splay,
            }),
            invert_curl: opts.invert_curl,
            analog_max: opts.analog_max,
            calibrating: true,
            values: [midpoint; 3],
            splay_value: midpoint,
        }
    }

    /// Samples every knuckle (and splay), refreshing calibrated values.
    pub fn read(&mut self, bus: &mut dyn InputBus) {
        let (invert, calibrating, max) = (self.invert_curl, self.calibrating, self.analog_max);

        match &mut self.curl {
            CurlStrategy::Single { knuckle } => {
                self.values[0] = knuckle.read(bus, invert, calibrating, max);
            }
            CurlStrategy::Dual { knuckles, coupling } => {
                for (i, knuckle) in knuckles.iter_mut().enumerate() {
                    self.values[i] = knuckle.read(bus, invert, calibrating, max);
                }
                // The outer joint is not sensed; model it from knuckle 2.
                self.values[2] = coupling.derive(self.values[1], max);
            }
            CurlStrategy::Triple { knuckles } => {
                for (i, knuckle) in knuckles.iter_mut().enumerate() {
                    self.values[i] = knuckle.read(bus, invert, calibrating, max);
                }
            }
        }

        if let Some(splay) = &mut self.splay {
            let mut raw = bus.read_analog(&splay.channel);
            if splay.invert {
                raw = max - raw;
            }
            if calibrating {
                splay.calibrator.update(raw);
            }
            self.splay_value = splay.calibrator.calibrate(raw, 0, max);
        }
    }

    /// Overall curl in `[0, analog_max]`: the mean of all knuckle values.
    #[must_use]
    pub fn curl_value(&self) -> i32 {
        match self.curl {
            CurlStrategy::Single { .. } => self.values[0],
            CurlStrategy::Dual { .. } | CurlStrategy::Triple { .. } => {
                (self.values[0] + self.values[1] + self.values[2]) / 3
            }
        }
    }

    /// Splay in `[0, analog_max]`, or the fixed midpoint when not sensed.
    #[must_use]
    pub fn splay_value(&self) -> i32 {
        if self.splay.is_some() {
            self.splay_value
        } else {
            self.analog_max / 2
        }
    }

    /// Gates calibration learning; the learned range keeps being applied.
    pub fn set_calibrating(&mut self, on: bool) {
        self.calibrating = on;
    }

    /// Drops every learned range, forcing recalibration.
    pub fn reset_calibration(&mut self) {
        match &mut self.curl {
            CurlStrategy::Single { knuckle } => knuckle.calibrator.reset(),
            CurlStrategy::Dual { knuckles, .. } => {
                for k in knuckles {
                    k.calibrator.reset();
                }
            }
            CurlStrategy::Triple { knuckles } => {
                for k in knuckles {
                    k.calibrator.reset();
                }
            }
        }
        if let Some(splay) = &mut self.splay {
            splay.calibrator.reset();
        }
    }

    /// Fraction of full travel this finger has been observed to cover.
    ///
    /// Taken from the primary knuckle's learned range; `None` while
    /// uncalibrated. Force feedback uses this to shrink actuator travel to
    /// the wearer's real range of motion.
    #[must_use]
    pub fn observed_span_fraction(&self) -> Option<f32> {
        let knuckle = match &self.curl {
            CurlStrategy::Single { knuckle } => knuckle,
            CurlStrategy::Dual { knuckles, .. } => &knuckles[0],
            CurlStrategy::Triple { knuckles } => &knuckles[0],
        };
        knuckle.calibrator.observed_span_fraction()
    }

    /// This finger's type code.
    #[must_use]
    pub fn code(&self) -> char {
        self.code
    }

    fn knuckle_count(&self) -> usize {
        match self.curl {
            CurlStrategy::Single { .. } => 1,
            CurlStrategy::Dual { .. } | CurlStrategy::Triple { .. } => 3,
        }
    }
}

impl Encodable for Finger {
    fn encode(&self, out: &mut String) -> usize {
        let mut written = encoder::push_value(out, self.code, self.values[0]);
        for (i, &sub) in codes::KNUCKLE_SUB_KEYS
            .iter()
            .enumerate()
            .take(self.knuckle_count().saturating_sub(1))
        {
            written += encoder::push_sub_value(out, self.code, sub, self.values[i + 1]);
        }
        if self.splay.is_some() {
            written += encoder::push_sub_value(out, self.code, codes::SPLAY_SUB_KEY, self.splay_value);
        }
        written
    }
}
