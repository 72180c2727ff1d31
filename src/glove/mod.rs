//! # Glove Runtime
//!
//! Assembles the configured input and output sets and drives the per-tick
//! pipeline.
//!
//! This module handles:
//! - Building the finger/button/gesture topology from [`Config`]
//! - The two-pass read (hardware inputs, then derived gestures)
//! - Calibration gating and the calibrate-button window
//! - Frame exchange with the host over a [`Transport`]
//! - Fanning the inbound frame out to the actuator outputs
//!
//! One tick is: read, derive, encode, send, receive, actuate. The encoded
//! frame is a pure function of input state, so everything up to the
//! transport exchange is synchronous and testable without a runtime.

use tracing::{debug, info};

use crate::channel::{Channel, InputBus};
use crate::config::Config;
use crate::error::Result;
use crate::input::finger::{CouplingCurve, FingerOptions};
use crate::input::{Button, Finger, FingerSnapshot, Gesture, GestureKind, Input, JoystickAxis};
use crate::output::{Actuation, FfbScaling, ForceFeedback, HapticMotor, Output};
use crate::protocol::{codes, encoder, Encodable};
use crate::transport::Transport;

/// Physical pin assignment for one board.
///
/// The default matches the reference ESP32 wiring; other boards supply
/// their own map.
#[derive(Debug, Clone)]
pub struct PinLayout {
    /// Primary knuckle ADC pins, thumb to pinky.
    pub finger_k0: [u8; 5],
    /// Splay ADC pins, thumb to pinky.
    pub finger_splay: [u8; 5],
    /// Multiplexer input indices for the second knuckle, thumb to pinky.
    pub finger_k1_index: [u8; 5],
    /// Multiplexer input indices for the third knuckle, thumb to pinky.
    pub finger_k2_index: [u8; 5],
    pub joy_x: u8,
    pub joy_y: u8,
    pub btn_joy: u8,
    pub btn_trigger: u8,
    pub btn_a: u8,
    pub btn_b: u8,
    pub btn_grab: u8,
    pub btn_pinch: u8,
    pub btn_menu: u8,
    pub btn_calibrate: u8,
}

impl Default for PinLayout {
    fn default() -> Self {
        Self {
            finger_k0: [32, 35, 34, 39, 36],
            finger_splay: [33, 25, 26, 27, 14],
            finger_k1_index: [0, 1, 2, 3, 4],
            finger_k2_index: [5, 6, 7, 8, 9],
            joy_x: 4,
            joy_y: 2,
            btn_joy: 26,
            btn_trigger: 18,
            btn_a: 22,
            btn_b: 21,
            btn_grab: 19,
            btn_pinch: 23,
            btn_menu: 5,
            btn_calibrate: 12,
        }
    }
}

/// What one tick produced.
#[derive(Debug)]
pub struct TickOutcome {
    /// Outbound frame, newline included.
    pub frame: String,
    /// Inbound frame processed this tick, if any.
    pub inbound: Option<String>,
    /// Actuation requests decoded from the inbound frame.
    pub actuations: Vec<Actuation>,
    /// Whether calibration was updating ranges this tick.
    pub calibrating: bool,
}

/// The assembled glove.
#[derive(Debug)]
pub struct Glove {
    /// Ordered input set; order fixes frame field order.
    inputs: Vec<Input>,
    outputs: Vec<Output>,
    analog_max: i32,
    /// Calibrate-button window length in ticks; -1 keeps calibration on.
    calibration_loops: i32,
    calibration_ticks_left: i32,
    calibrate_was_pressed: bool,
}

impl Glove {
    /// Builds the glove from a validated configuration and a pin layout.
    #[must_use]
    pub fn from_config(config: &Config, layout: &PinLayout) -> Self {
        let analog_max = config.glove.analog_max();
        let opts = FingerOptions {
            invert_curl: config.fingers.invert_curl,
            invert_splay: config.fingers.invert_splay,
            analog_max,
            clamp: config.calibration.clamp,
            coupling: CouplingCurve {
                start: config.fingers.coupling_start,
                end: config.fingers.coupling_end,
            },
        };

        let mut next_id: u8 = 0;
        let mut channel = |kind: ChannelSlot| {
            let id = next_id;
            next_id += 1;
            match kind {
                ChannelSlot::Direct(pin) => Channel::direct(id, pin),
                ChannelSlot::Muxed(index) => Channel::multiplexed(id, index),
            }
        };

        let mut inputs = Vec::new();
        let finger_codes = [
            codes::input::THUMB,
            codes::input::INDEX,
            codes::input::MIDDLE,
            codes::input::RING,
            codes::input::PINKY,
        ];
        let first_finger = usize::from(!config.fingers.enable_thumb);
        for (i, &code) in finger_codes.iter().enumerate().skip(first_finger) {
            let k0 = channel(ChannelSlot::Direct(layout.finger_k0[i]));
            let splay = config
                .fingers
                .enable_splay
                .then(|| channel(ChannelSlot::Direct(layout.finger_splay[i])));
            let finger = match config.fingers.knuckle_count {
                1 => Finger::single(code, k0, splay, opts),
                2 => {
                    let k1 = channel(ChannelSlot::Muxed(layout.finger_k1_index[i]));
                    Finger::dual(code, k0, k1, splay, opts)
                }
                _ => {
                    let k1 = channel(ChannelSlot::Muxed(layout.finger_k1_index[i]));
                    let k2 = channel(ChannelSlot::Muxed(layout.finger_k2_index[i]));
                    Finger::triple(code, k0, k1, k2, splay, opts)
                }
            };
            inputs.push(Input::Finger(finger));
        }

        if config.joystick.enabled {
            inputs.push(Input::Joystick(JoystickAxis::new(
                codes::input::JOY_X,
                channel(ChannelSlot::Direct(layout.joy_x)),
                config.joystick.deadzone,
                config.joystick.invert_x,
                analog_max,
            )));
            inputs.push(Input::Joystick(JoystickAxis::new(
                codes::input::JOY_Y,
                channel(ChannelSlot::Direct(layout.joy_y)),
                config.joystick.deadzone,
                config.joystick.invert_y,
                analog_max,
            )));
            inputs.push(Input::Button(Button::digital(
                codes::input::JOY_BTN,
                layout.btn_joy,
                config.buttons.invert_joystick,
            )));
        }

        // Each logical signal is either its gesture or its button, never
        // both.
        if config.gestures.trigger {
            inputs.push(Input::Gesture(Gesture::new(GestureKind::Trigger)));
        } else {
            inputs.push(Input::Button(Button::digital(
                codes::input::TRIGGER,
                layout.btn_trigger,
                false,
            )));
        }

        inputs.push(Input::Button(Button::digital(
            codes::input::A_BTN,
            layout.btn_a,
            config.buttons.invert_a,
        )));
        inputs.push(Input::Button(Button::digital(
            codes::input::B_BTN,
            layout.btn_b,
            config.buttons.invert_b,
        )));

        if config.gestures.grab {
            inputs.push(Input::Gesture(Gesture::new(GestureKind::Grab)));
        } else {
            inputs.push(Input::Button(Button::digital(
                codes::input::GRAB,
                layout.btn_grab,
                false,
            )));
        }

        if config.gestures.pinch {
            inputs.push(Input::Gesture(Gesture::new(GestureKind::Pinch)));
        } else {
            inputs.push(Input::Button(Button::digital(
                codes::input::PINCH,
                layout.btn_pinch,
                false,
            )));
        }

        inputs.push(Input::Button(Button::digital(
            codes::input::MENU,
            layout.btn_menu,
            config.buttons.invert_menu,
        )));
        inputs.push(Input::Button(Button::digital(
            codes::input::CALIBRATE,
            layout.btn_calibrate,
            config.buttons.invert_calibrate,
        )));

        let mut outputs = Vec::new();
        if config.force_feedback.enabled {
            let scaling = if config.force_feedback.finger_scaling {
                FfbScaling::CalibratedRange
            } else {
                FfbScaling::FullRange
            };
            let ffb_codes = [
                codes::output::FFB_THUMB,
                codes::output::FFB_INDEX,
                codes::output::FFB_MIDDLE,
                codes::output::FFB_RING,
                codes::output::FFB_PINKY,
            ];
            for &code in ffb_codes.iter().skip(first_finger) {
                outputs.push(Output::ForceFeedback(ForceFeedback::new(
                    code,
                    scaling,
                    config.force_feedback.invert,
                )));
            }
        }
        if config.haptics.enabled {
            outputs.push(Output::Haptic(HapticMotor::new(
                codes::output::HAPTIC_FREQ,
                codes::output::HAPTIC_DURATION,
                codes::output::HAPTIC_AMPLITUDE,
            )));
        }

        let loops = config.calibration.loops;
        Self {
            inputs,
            outputs,
            analog_max,
            calibration_loops: loops,
            // A positive loop count opens a startup calibration window.
            calibration_ticks_left: loops.max(0),
            calibrate_was_pressed: false,
        }
    }

    /// Runs one full tick against the board bus and the host transport.
    pub async fn tick(
        &mut self,
        bus: &mut dyn InputBus,
        transport: &mut dyn Transport,
    ) -> Result<TickOutcome> {
        let calibrating = self.calibration_active();
        for input in &mut self.inputs {
            if let Input::Finger(f) = input {
                f.set_calibrating(calibrating);
            }
        }

        // Pass 1: hardware inputs.
        for input in &mut self.inputs {
            input.read(bus);
        }
        self.handle_calibrate_button();
        if self.calibration_ticks_left > 0 {
            self.calibration_ticks_left -= 1;
        }

        // Pass 2: gestures over the fresh finger values.
        let snapshot = self.finger_snapshot();
        for input in &mut self.inputs {
            input.derive_gesture(&snapshot);
        }

        let frame = self.encoded_frame();
        let (inbound, actuations) = if transport.is_open() {
            transport.send_frame(&frame).await?;
            match transport.recv_frame().await? {
                Some(inbound) => {
                    let actuations = self.apply_inbound(&inbound);
                    (Some(inbound), actuations)
                }
                None => (None, Vec::new()),
            }
        } else {
            (None, Vec::new())
        };

        Ok(TickOutcome {
            frame,
            inbound,
            actuations,
            calibrating,
        })
    }

    /// Encodes the current input state into one outbound frame.
    #[must_use]
    pub fn encoded_frame(&self) -> String {
        encoder::encode_frame(self.inputs.iter().map(|i| i as &dyn Encodable))
    }

    /// Fans one inbound frame out to every output.
    pub fn apply_inbound(&mut self, frame: &str) -> Vec<Actuation> {
        let spans = self.span_table();
        self.outputs
            .iter_mut()
            .filter_map(|output| output.apply(frame, &spans))
            .collect()
    }

    /// Drops every finger's learned range, forcing recalibration.
    pub fn reset_calibration(&mut self) {
        info!("Calibration reset, relearning sensor ranges");
        for input in &mut self.inputs {
            if let Input::Finger(f) = input {
                f.reset_calibration();
            }
        }
    }

    /// Whether calibration is updating ranges right now.
    #[must_use]
    pub fn calibration_active(&self) -> bool {
        self.calibration_loops == -1 || self.calibration_ticks_left > 0
    }

    /// Rising edge of the calibrate button resets ranges and reopens the
    /// calibration window.
    fn handle_calibrate_button(&mut self) {
        let pressed = self.inputs.iter().any(|input| match input {
            Input::Button(b) => b.code() == codes::input::CALIBRATE && b.is_pressed(),
            _ => false,
        });
        if pressed && !self.calibrate_was_pressed {
            self.reset_calibration();
            if self.calibration_loops > 0 {
                debug!(loops = self.calibration_loops, "calibration window opened");
                self.calibration_ticks_left = self.calibration_loops;
            }
        }
        self.calibrate_was_pressed = pressed;
    }

    /// Collects the current per-finger curl values for gesture derivation.
    fn finger_snapshot(&self) -> FingerSnapshot {
        let mut snapshot = FingerSnapshot {
            analog_max: self.analog_max,
            thumb: None,
            index: 0,
            middle: 0,
            ring: 0,
            pinky: 0,
        };
        for input in &self.inputs {
            if let Input::Finger(f) = input {
                let curl = f.curl_value();
                match f.code() {
                    c if c == codes::input::THUMB => snapshot.thumb = Some(curl),
                    c if c == codes::input::INDEX => snapshot.index = curl,
                    c if c == codes::input::MIDDLE => snapshot.middle = curl,
                    c if c == codes::input::RING => snapshot.ring = curl,
                    c if c == codes::input::PINKY => snapshot.pinky = curl,
                    _ => {}
                }
            }
        }
        snapshot
    }

    /// Per-finger observed span fractions for calibrated force feedback.
    fn span_table(&self) -> Vec<(char, Option<f32>)> {
        self.inputs
            .iter()
            .filter_map(|input| match input {
                Input::Finger(f) => Some((f.code(), f.observed_span_fraction())),
                _ => None,
            })
            .collect()
    }
}

/// Internal helper for handing out sequential channel ids.
enum ChannelSlot {
    Direct(u8),
    Muxed(u8),
}
