//! # Frame Decoder
//!
//! Scan-based extraction of named integer fields from an inbound frame.
//!
//! There is no structural validation on inbound frames: no checksum, no
//! length prefix. Each consumer scans the whole line for its own code and
//! parses the signed integer that follows. A truncated or garbled frame
//! degrades field by field: whatever codes survive still decode, everything
//! else reads as absent. This matches the hardware command convention the
//! host driver expects, where an absent field means "keep doing what you
//! were doing".

/// Extracts the integer argument following the first occurrence of `code`.
///
/// Returns `None` if the code is absent or no integer follows it. Payloads
/// are decimal digits with an optional leading minus sign, so adjacent
/// fields need no delimiter: the scan stops at the next non-digit byte.
///
/// # Examples
///
/// ```
/// use glove_link::protocol::decoder::get_argument;
///
/// assert_eq!(get_argument("A500B300\n", 'A'), Some(500));
/// assert_eq!(get_argument("A500B300\n", 'B'), Some(300));
/// assert_eq!(get_argument("A500B300\n", 'C'), None);
/// assert_eq!(get_argument("F-12G7\n", 'F'), Some(-12));
/// ```
#[must_use]
pub fn get_argument(frame: &str, code: char) -> Option<i32> {
    let start = frame.find(code)?;
    parse_leading_int(&frame[start + code.len_utf8()..])
}

/// [`get_argument`] with a `-1` sentinel instead of `Option`.
///
/// Some call sites mirror hardware command conventions where `-1` flows
/// through ordinary value channels; everything else should prefer the
/// `Option` form.
#[must_use]
pub fn get_argument_raw(frame: &str, code: char) -> i32 {
    get_argument(frame, code).unwrap_or(-1)
}

/// Parses the signed decimal integer at the start of `s`, if any.
fn parse_leading_int(s: &str) -> Option<i32> {
    let bytes = s.as_bytes();
    let mut end = usize::from(bytes.first() == Some(&b'-'));
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let digits = &s[..end];
    if digits.is_empty() || digits == "-" {
        return None;
    }
    digits.parse().ok()
}
