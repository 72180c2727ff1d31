//! # Protocol Type Codes
//!
//! Single-character keys for every field on the wire, matching the host
//! driver's conventions. Payloads are decimal digits with an optional
//! leading minus sign, so the uppercase codes can never be mistaken for
//! payload bytes.

/// Outbound (glove → host) type codes.
pub mod input {
    /// Thumb curl.
    pub const THUMB: char = 'A';
    /// Index curl.
    pub const INDEX: char = 'B';
    /// Middle curl.
    pub const MIDDLE: char = 'C';
    /// Ring curl.
    pub const RING: char = 'D';
    /// Pinky curl.
    pub const PINKY: char = 'E';
    /// Joystick X axis.
    pub const JOY_X: char = 'F';
    /// Joystick Y axis.
    pub const JOY_Y: char = 'G';
    /// Joystick click.
    pub const JOY_BTN: char = 'H';
    /// Trigger button or gesture.
    pub const TRIGGER: char = 'I';
    /// A button.
    pub const A_BTN: char = 'J';
    /// B button.
    pub const B_BTN: char = 'K';
    /// Grab button or gesture.
    pub const GRAB: char = 'L';
    /// Pinch button or gesture.
    pub const PINCH: char = 'M';
    /// Menu button.
    pub const MENU: char = 'N';
    /// Calibration button.
    pub const CALIBRATE: char = 'O';
}

/// Inbound (host → glove) type codes.
pub mod output {
    /// Thumb force-feedback limit (0..1000).
    pub const FFB_THUMB: char = 'A';
    /// Index force-feedback limit (0..1000).
    pub const FFB_INDEX: char = 'B';
    /// Middle force-feedback limit (0..1000).
    pub const FFB_MIDDLE: char = 'C';
    /// Ring force-feedback limit (0..1000).
    pub const FFB_RING: char = 'D';
    /// Pinky force-feedback limit (0..1000).
    pub const FFB_PINKY: char = 'E';
    /// Haptic pulse frequency.
    pub const HAPTIC_FREQ: char = 'F';
    /// Haptic pulse duration.
    pub const HAPTIC_DURATION: char = 'G';
    /// Haptic pulse amplitude.
    pub const HAPTIC_AMPLITUDE: char = 'H';
}

/// Sub-key appended to a finger code for its splay token, e.g. `(BA)`.
pub const SPLAY_SUB_KEY: char = 'A';

/// Sub-keys for the second and third knuckle tokens, e.g. `(BB)`, `(BC)`.
pub const KNUCKLE_SUB_KEYS: [char; 2] = ['B', 'C'];
