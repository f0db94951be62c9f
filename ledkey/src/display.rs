//! Digits, segments and LEDs.
//!
//! Every write here is a single fixed-address write per digit or LED, so writing one part of
//! the display never disturbs the rest of it.

use crate::address::{led_address, segment_address, DIGIT_COUNT, LED_COUNT};
use crate::bus::BusDriver;
use crate::font::render_number;
use crate::LedAndKey;

/// Digits in each half of the display
const HALF: usize = DIGIT_COUNT as usize / 2;

impl<Driver: BusDriver> LedAndKey<Driver> {
    /// Set a specific 7-segment display identified by `index` (`0` is the left-most display, max
    /// value is 7), to the value `mask`.
    ///
    /// `mask` is a bitmask in which the least significant 7 bits correspond to segments on the
    /// display, and the most significant bit corresponds to the `.` in the bottom right of the
    /// display.  See [`crate::DIGITS`] for the masks of the hex digits.
    pub async fn set_segment(&mut self, index: u8, mask: u8) -> Result<(), Driver::Error> {
        self.write_at(segment_address(index), mask).await
    }

    /// Turn the LED at `index` on or off.  `0` is the left-most LED, `7` the right-most.
    pub async fn set_led(&mut self, index: u8, on: bool) -> Result<(), Driver::Error> {
        self.write_at(led_address(index), on as u8).await
    }

    /// Set all 8 LEDs at once: bit `i` of `mask` controls LED `i`.
    pub async fn set_leds(&mut self, mask: u8) -> Result<(), Driver::Error> {
        for index in 0..LED_COUNT {
            self.set_led(index, mask & (1 << index) != 0).await?;
        }

        Ok(())
    }

    /// Show `n` in decimal on all 8 digits, right aligned.
    ///
    /// Leading zeros are blank, but the right-most digit always shows, so `0` displays as a
    /// single `0`.  Numbers with more than 8 digits show only their last 8.
    pub async fn show_number(&mut self, n: u32) -> Result<(), Driver::Error> {
        self.show_in_range::<{ DIGIT_COUNT as usize }>(0, n, 10).await
    }

    /// Show `n` in decimal on the left 4 digits, leaving the right 4 alone.
    pub async fn show_number_left(&mut self, n: u32) -> Result<(), Driver::Error> {
        self.show_in_range::<HALF>(0, n, 10).await
    }

    /// Show `n` in decimal on the right 4 digits, leaving the left 4 alone.
    pub async fn show_number_right(&mut self, n: u32) -> Result<(), Driver::Error> {
        self.show_in_range::<HALF>(HALF as u8, n, 10).await
    }

    /// Show `n` in hexadecimal on all 8 digits, right aligned.  Any `u32` fits.
    pub async fn show_hex(&mut self, n: u32) -> Result<(), Driver::Error> {
        self.show_in_range::<{ DIGIT_COUNT as usize }>(0, n, 16).await
    }

    /// Render `n` onto the `N` digits starting at `first`, writing the right-most digit first.
    async fn show_in_range<const N: usize>(
        &mut self,
        first: u8,
        n: u32,
        radix: u32,
    ) -> Result<(), Driver::Error> {
        let mut segments = [0u8; N];
        render_number(n, radix, &mut segments);

        #[cfg(feature = "defmt")]
        defmt::trace!("digits {=u8}.. <- {=[u8]:x}", first, &segments[..]);

        for (offset, mask) in segments.iter().enumerate().rev() {
            self.set_segment(first + offset as u8, *mask).await?;
        }

        Ok(())
    }
}
