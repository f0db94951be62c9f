//! Segment patterns for rendering numbers on the 7 segment displays.
//!
//! Bit 0 is segment A, bit 1 segment B, and so on up to bit 6 for segment G.  Bit 7 is the
//! decimal point.

/// Segment masks for the hexadecimal digits `0` to `F`, indexed by digit value.
pub const DIGITS: [u8; 16] = [
    0x3F, /* 0 */
    0x06, /* 1 */
    0x5B, /* 2 */
    0x4F, /* 3 */
    0x66, /* 4 */
    0x6D, /* 5 */
    0x7D, /* 6 */
    0x07, /* 7 */
    0x7F, /* 8 */
    0x6F, /* 9 */
    0x77, /* A */
    0x7C, /* b */
    0x39, /* C */
    0x5E, /* d */
    0x79, /* E */
    0x71, /* F */
];

/// All segments off
pub const BLANK: u8 = 0x00;

/// The decimal point segment; OR it into any other mask
pub const DECIMAL_POINT: u8 = 0b1000_0000;

/// Segment mask for the hex digit in the low 4 bits of `digit`
pub const fn digit_segments(digit: u8) -> u8 {
    DIGITS[(digit & 0x0f) as usize]
}

/// Render `n` in base `radix` into `segments`, right aligned.
///
/// The last position holds the least significant digit and is always drawn, so zero renders as
/// a single `0`.  Every other position is blank once the remaining value has run out.  Digits
/// that don't fit are dropped from the front.
pub(crate) fn render_number(mut n: u32, radix: u32, segments: &mut [u8]) {
    #[cfg(feature = "defmt")]
    defmt::debug_assert!(radix >= 2 && radix <= DIGITS.len() as u32);

    let units = segments.len().saturating_sub(1);

    for (position, segment) in segments.iter_mut().enumerate().rev() {
        *segment = if n > 0 || position == units {
            DIGITS[(n % radix) as usize]
        } else {
            BLANK
        };
        n /= radix;
    }
}
