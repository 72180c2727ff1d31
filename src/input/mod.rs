//! # Sensor Input Module
//!
//! Everything the glove reports to the host: buttons, fingers, joystick
//! axes, and derived gestures.
//!
//! Inputs live in one heterogeneous ordered collection ([`Input`]); the
//! order fixes their position in the outbound frame and nothing else couples
//! them. Reading happens in two passes per tick: hardware-backed inputs read
//! from the [`InputBus`](crate::channel::InputBus), then gestures are
//! evaluated against the snapshot of finger values produced by the first
//! pass.

pub mod button;
pub mod finger;
pub mod gesture;
pub mod joystick;

pub use button::Button;
pub use finger::Finger;
pub use gesture::{FingerSnapshot, Gesture, GestureKind};
pub use joystick::JoystickAxis;

use crate::channel::InputBus;
use crate::protocol::Encodable;

/// One entry of the ordered input set.
#[derive(Debug)]
pub enum Input {
    /// Physical button.
    Button(Button),
    /// Finger with its curl strategy and optional splay.
    Finger(Finger),
    /// One joystick axis.
    Joystick(JoystickAxis),
    /// Derived gesture.
    Gesture(Gesture),
}

impl Input {
    /// First read pass: sample hardware-backed inputs.
    ///
    /// Gestures are skipped here; they are derived in
    /// [`derive_gesture`](Self::derive_gesture) once all fingers have fresh
    /// values.
    pub fn read(&mut self, bus: &mut dyn InputBus) {
        match self {
            Input::Button(b) => b.read(bus),
            Input::Finger(f) => f.read(bus),
            Input::Joystick(j) => j.read(bus),
            Input::Gesture(_) => {}
        }
    }

    /// Second read pass: recompute a gesture from the finger snapshot.
    pub fn derive_gesture(&mut self, fingers: &FingerSnapshot) {
        if let Input::Gesture(g) = self {
            g.evaluate(fingers);
        }
    }
}

impl Encodable for Input {
    fn encode(&self, out: &mut String) -> usize {
        match self {
            Input::Button(b) => b.encode(out),
            Input::Finger(f) => f.encode(out),
            Input::Joystick(j) => j.encode(out),
            Input::Gesture(g) => g.encode(out),
        }
    }
}
