//! # Driver Protocol Module
//!
//! The line-oriented ASCII protocol spoken between the glove and the host
//! driver.
//!
//! This module handles:
//! - Type-code assignments for both directions ([`codes`])
//! - Outbound frame encoding (fixed-order token concatenation, [`encoder`])
//! - Inbound field extraction by scan ([`decoder`])
//!
//! Frames are single lines: a concatenation of tokens with no delimiters,
//! terminated by `\n`. A token is either a bare type-code character (pressed
//! button, active gesture) or a type code followed by a signed base-10
//! integer. Absent tokens contribute zero bytes, which is what makes the
//! protocol compact; it also rules out structural validation, since a
//! garbled field simply fails to be found.

pub mod codes;
pub mod decoder;
pub mod encoder;

/// Capability of contributing tokens to an outbound frame.
///
/// Encoding one input must not depend on another input's value; the only
/// coupling between inputs is their order in the frame.
pub trait Encodable {
    /// Appends this input's serialization to `out`, returning bytes written.
    ///
    /// Value-less inputs (unpressed buttons, inactive gestures) append
    /// nothing and return 0.
    fn encode(&self, out: &mut String) -> usize;
}
