//! # Gesture Derivation
//!
//! Boolean signals derived from the current finger values, substituting for
//! dedicated buttons on builds without them.
//!
//! Gestures are stateless threshold functions recomputed every tick; an
//! active gesture encodes exactly like a pressed button. Build
//! configuration picks, per logical signal, either the gesture or a physical
//! button, never both.

use crate::protocol::{codes, encoder, Encodable};

/// Per-tick snapshot of finger curl values, in `[0, analog_max]`.
///
/// The thumb is optional: builds without a thumb sensor cannot enable the
/// pinch gesture (enforced by configuration validation).
#[derive(Debug, Clone, Copy)]
pub struct FingerSnapshot {
    /// Full-scale ADC value the curls are expressed in.
    pub analog_max: i32,
    /// Thumb curl, when the build tracks a thumb.
    pub thumb: Option<i32>,
    /// Index curl.
    pub index: i32,
    /// Middle curl.
    pub middle: i32,
    /// Ring curl.
    pub ring: i32,
    /// Pinky curl.
    pub pinky: i32,
}

/// Which gesture a [`Gesture`] input derives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    /// Index finger more than halfway flexed.
    Trigger,
    /// Mean of index, middle, ring and pinky more than halfway flexed.
    Grab,
    /// Mean of thumb and index more than halfway flexed.
    Pinch,
}

impl GestureKind {
    /// The wire type code this gesture shares with its button substitute.
    #[must_use]
    pub fn code(self) -> char {
        match self {
            GestureKind::Trigger => codes::input::TRIGGER,
            GestureKind::Grab => codes::input::GRAB,
            GestureKind::Pinch => codes::input::PINCH,
        }
    }
}

/// One derived gesture input.
#[derive(Debug)]
pub struct Gesture {
    kind: GestureKind,
    active: bool,
}

impl Gesture {
    /// Creates an inactive gesture.
    #[must_use]
    pub fn new(kind: GestureKind) -> Self {
        Self {
            kind,
            active: false,
        }
    }

    /// Recomputes the gesture from the current finger values.
    pub fn evaluate(&mut self, fingers: &FingerSnapshot) {
        let threshold = fingers.analog_max / 2;
        self.active = match self.kind {
            GestureKind::Trigger => fingers.index > threshold,
            GestureKind::Grab => {
                (fingers.index + fingers.middle + fingers.ring + fingers.pinky) / 4 > threshold
            }
            // A build without a thumb cannot pinch; configuration
            // validation rejects that combination up front.
            GestureKind::Pinch => match fingers.thumb {
                Some(thumb) => (thumb + fingers.index) / 2 > threshold,
                None => false,
            },
        };
    }

    /// Latest derived state.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Which gesture this is.
    #[must_use]
    pub fn kind(&self) -> GestureKind {
        self.kind
    }
}

impl Encodable for Gesture {
    fn encode(&self, out: &mut String) -> usize {
        if self.active {
            encoder::push_flag(out, self.kind.code())
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: i32 = 4095;

    fn snapshot(thumb: Option<i32>, index: i32, middle: i32, ring: i32, pinky: i32) -> FingerSnapshot {
        FingerSnapshot {
            analog_max: MAX,
            thumb,
            index,
            middle,
            ring,
            pinky,
        }
    }

    fn evaluated(kind: GestureKind, fingers: &FingerSnapshot) -> Gesture {
        let mut g = Gesture::new(kind);
        g.evaluate(fingers);
        g
    }

    // ==================== Trigger Tests ====================

    #[test]
    fn test_trigger_follows_index_threshold() {
        let g = evaluated(GestureKind::Trigger, &snapshot(None, MAX, 0, 0, 0));
        assert!(g.is_active());

        let g = evaluated(GestureKind::Trigger, &snapshot(None, MAX / 2, 0, 0, 0));
        assert!(!g.is_active());
    }

    // ==================== Grab Tests ====================

    #[test]
    fn test_grab_three_full_fingers_out_of_four() {
        // mean = 3071 > 2047
        let g = evaluated(GestureKind::Grab, &snapshot(None, MAX, MAX, MAX, 0));
        assert!(g.is_active());
    }

    #[test]
    fn test_grab_two_full_fingers_is_not_enough() {
        // mean = 2047, not strictly greater than the threshold
        let g = evaluated(GestureKind::Grab, &snapshot(None, MAX, MAX, 0, 0));
        assert!(!g.is_active());
    }

    // ==================== Pinch Tests ====================

    #[test]
    fn test_pinch_mean_of_thumb_and_index() {
        let g = evaluated(GestureKind::Pinch, &snapshot(Some(MAX), MAX, 0, 0, 0));
        assert!(g.is_active());

        let g = evaluated(GestureKind::Pinch, &snapshot(Some(MAX), 0, 0, 0, 0));
        assert!(!g.is_active());
    }

    #[test]
    fn test_pinch_without_thumb_never_fires() {
        let g = evaluated(GestureKind::Pinch, &snapshot(None, MAX, MAX, MAX, MAX));
        assert!(!g.is_active());
    }

    // ==================== Statelessness Tests ====================

    #[test]
    fn test_gesture_releases_when_fingers_relax() {
        let mut g = Gesture::new(GestureKind::Trigger);
        g.evaluate(&snapshot(None, MAX, 0, 0, 0));
        assert!(g.is_active());
        g.evaluate(&snapshot(None, 0, 0, 0, 0));
        assert!(!g.is_active());
    }

    // ==================== Encoding Tests ====================

    #[test]
    fn test_active_gesture_encodes_bare_code() {
        let g = evaluated(GestureKind::Grab, &snapshot(None, MAX, MAX, MAX, MAX));
        let mut out = String::new();
        assert_eq!(g.encode(&mut out), 1);
        assert_eq!(out, "L");
    }

    #[test]
    fn test_inactive_gesture_encodes_nothing() {
        let g = Gesture::new(GestureKind::Pinch);
        let mut out = String::new();
        assert_eq!(g.encode(&mut out), 0);
        assert!(out.is_empty());
    }
}
