//! # Frame Encoder
//!
//! Concatenates the ordered input set into one newline-terminated frame.

use std::fmt::Write;

use super::Encodable;

/// Rough upper bound on a frame, used to pre-size the buffer.
///
/// Five fingers at three knuckles plus splay, two joystick axes, and every
/// flag set stays well under this.
const FRAME_CAPACITY: usize = 160;

/// Encodes the fixed-order input set into one frame.
///
/// Each input appends its own serialization; value-less inputs contribute
/// zero bytes. The frame is terminated with `\n`.
///
/// # Examples
///
/// ```
/// use glove_link::protocol::{encoder, Encodable};
///
/// struct Flag;
/// impl Encodable for Flag {
///     fn encode(&self, out: &mut String) -> usize {
///         out.push('I');
///         1
///     }
/// }
///
/// let flag = Flag;
/// let frame = encoder::encode_frame([&flag as &dyn Encodable]);
/// assert_eq!(frame, "I\n");
/// ```
pub fn encode_frame<'a, I>(inputs: I) -> String
where
    I: IntoIterator<Item = &'a dyn Encodable>,
{
    let mut frame = String::with_capacity(FRAME_CAPACITY);
    for input in inputs {
        input.encode(&mut frame);
    }
    frame.push('\n');
    frame
}

/// Appends a bare flag token (pressed button / active gesture).
pub fn push_flag(out: &mut String, code: char) -> usize {
    out.push(code);
    code.len_utf8()
}

/// Appends a `<code><signed int>` token.
pub fn push_value(out: &mut String, code: char, value: i32) -> usize {
    let before = out.len();
    out.push(code);
    // Writing an integer into a String cannot fail.
    let _ = write!(out, "{value}");
    out.len() - before
}

/// Appends a compound-key token `(<code><sub>)<signed int>`.
///
/// Used for the extra knuckle and splay tokens of a finger; inbound frames
/// only ever use single-character keys.
pub fn push_sub_value(out: &mut String, code: char, sub: char, value: i32) -> usize {
    let before = out.len();
    let _ = write!(out, "({code}{sub}){value}");
    out.len() - before
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    impl Encodable for Fixed {
        fn encode(&self, out: &mut String) -> usize {
            out.push_str(self.0);
            self.0.len()
        }
    }

    // ==================== Frame Assembly Tests ====================

    #[test]
    fn test_empty_input_set_is_bare_newline() {
        let frame = encode_frame(std::iter::empty::<&dyn Encodable>());
        assert_eq!(frame, "\n");
    }

    #[test]
    fn test_inputs_concatenate_in_order() {
        let a = Fixed("A2047");
        let b = Fixed("B100");
        let c = Fixed("I");
        let frame = encode_frame([&a as &dyn Encodable, &b, &c]);
        assert_eq!(frame, "A2047B100I\n");
    }

    #[test]
    fn test_value_less_inputs_contribute_zero_bytes() {
        let a = Fixed("A2047");
        let silent = Fixed("");
        let b = Fixed("B100");
        let frame = encode_frame([&a as &dyn Encodable, &silent, &b]);
        assert_eq!(frame, "A2047B100\n");
    }

    // ==================== Token Helper Tests ====================

    #[test]
    fn test_push_flag() {
        let mut out = String::new();
        assert_eq!(push_flag(&mut out, 'I'), 1);
        assert_eq!(out, "I");
    }

    #[test]
    fn test_push_value_positive_and_negative() {
        let mut out = String::new();
        let n = push_value(&mut out, 'F', -512);
        assert_eq!(out, "F-512");
        assert_eq!(n, 5);
        push_value(&mut out, 'G', 0);
        assert_eq!(out, "F-512G0");
    }

    #[test]
    fn test_push_sub_value() {
        let mut out = String::new();
        let n = push_sub_value(&mut out, 'B', 'C', 4095);
        assert_eq!(out, "(BC)4095");
        assert_eq!(n, 8);
    }
}
