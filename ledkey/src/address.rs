//! Mapping of LEDs and 7-segment digits onto display RAM addresses.
//!
//! The TM1638 has 16 bytes of display RAM.  Section 9 of the data sheet shows how they are
//! shared: the 7 segment displays are at even numbered offsets (first display at byte 0, second
//! at byte 2, ...), and the odd numbered offsets drive the SEG9/SEG10 outputs, which the LED&KEY
//! board wires to its 8 LEDs.
//!
//! Indices are 0-based everywhere in this crate: `0` is the left-most digit or LED, `7` the
//! right-most.

/// Number of 7-segment digits on the board
pub const DIGIT_COUNT: u8 = 8;

/// Number of discrete LEDs on the board
pub const LED_COUNT: u8 = 8;

/// Display RAM address of the LED at `index`
pub const fn led_address(index: u8) -> u8 {
    ((index << 1) | 1) & 0b0000_1111
}

/// Display RAM address of the 7-segment digit at `index`
pub const fn segment_address(index: u8) -> u8 {
    (index << 1) & 0b0000_1111
}
