#![no_std]

#[cfg(test)]
extern crate std;

mod address;
mod builder;
mod bus;
mod command;
mod display;
mod events;
mod font;
mod keys;
mod pins;

#[cfg(test)]
mod sim;

pub use address::*;
pub use builder::*;
pub use bus::*;
pub use events::*;
pub use font::{digit_segments, BLANK, DECIMAL_POINT, DIGITS};
pub use keys::*;
pub use pins::*;

use command::{ReadCommand, WriteCommand};

/// Brightness set by [`LedAndKey::init`], on the 0 to 7 scale
pub const DEFAULT_BRIGHTNESS: u8 = 4;

/// Bytes of display RAM in the TM1638: 8 digits interleaved with 8 LEDs
pub const DISPLAY_RAM_BYTES: usize = 16;

const BLANK_DISPLAY_RAM: &[u8; DISPLAY_RAM_BYTES] = &[0x00; DISPLAY_RAM_BYTES];

/// Driver for TM1638 "LED&KEY" boards: 8 seven-segment digits, 8 LEDs and 8 buttons.
///
/// The implementation is generalized over the implementation of the underling bus protocol driver,
/// behind the [`BusDriver`] trait.  Usually that is a [`BitBangingBusDriver`] on three GPIO pins.
///
/// The most straightforward way to instantiate this driver is using [`Self::builder`] which
/// returns a builder type with which you can get easy access to the built-in implementations.
///
/// For example, to use the `embassy-time` timer implementation and the `embassy-rp` HAL for
/// RP2040:
///
/// ```
/// # #[cfg(all(feature = "embassy-time", feature = "embassy-rp"))]
/// # async fn example() {
/// let p = embassy_rp::init(Default::default());
/// let mut board = ledkey::LedAndKey::builder()
///     .with_embassy_timer()
///     .with_embassy_rp_pins(p.PIN_6, p.PIN_7, p.PIN_8)
///     .build();
/// board.init().await.unwrap();
/// board.show_number(1234).await.unwrap();
/// # }
/// ```
///
/// Each instance owns its bus, so any number of boards can be driven side by side on different
/// pins.  All methods take `&mut self`; a transaction on the bus can never be interrupted by
/// another one on the same board.
pub struct LedAndKey<Driver> {
    driver: Driver,
    on: bool,
    brightness: u8,
}

impl LedAndKey<()> {
    /// Return a builder pattern implementation to ease some of the type parameter complexity
    /// around creating the bus driver and timer.
    ///
    /// This is not required; you can always instantiate the driver without a builder, but you
    /// might have to type more angle brackets to do so.
    pub fn builder() -> LedAndKeyBuilder {
        LedAndKeyBuilder
    }
}

impl<Driver: BusDriver> LedAndKey<Driver> {
    /// Wrap a bus driver.  Nothing is sent until [`Self::init`].
    pub fn new(driver: Driver) -> Self {
        Self {
            driver,
            on: false,
            brightness: DEFAULT_BRIGHTNESS,
        }
    }

    /// Reset the board: idle the bus, blank all digits and LEDs, then switch the display on at
    /// [`DEFAULT_BRIGHTNESS`].
    pub async fn init(&mut self) -> Result<(), Driver::Error> {
        self.driver.idle().await?;
        self.clear().await?;

        self.on = true;
        self.brightness = DEFAULT_BRIGHTNESS;
        self.write_display_control().await
    }

    /// Blank the display state, including all 7 seg displays and LEDs
    pub async fn clear(&mut self) -> Result<(), Driver::Error> {
        self.apply_write_command(WriteCommand::SetIncrementalAddressing)
            .await?;

        self.apply_write_command(WriteCommand::Write {
            address: 0,
            data: BLANK_DISPLAY_RAM,
        })
        .await
    }

    /// Set the brightness, from 0 (lowest brightness) to 7 (highest brightness).
    ///
    /// Larger values are reduced to their low 3 bits, like the chip itself would do.
    pub async fn set_brightness(&mut self, brightness: u8) -> Result<(), Driver::Error> {
        self.brightness = brightness & 0b0000_0111;
        self.write_display_control().await
    }

    /// Switch the whole display (digits and LEDs) on or off.  The display RAM and the brightness
    /// are kept while it is off.
    pub async fn set_power(&mut self, on: bool) -> Result<(), Driver::Error> {
        self.on = on;
        self.write_display_control().await
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Write `value` to a single display RAM `address` (0 to 15; only the low 4 bits are used).
    ///
    /// See [`segment_address`] and [`led_address`] for what lives where.
    pub async fn write_at(&mut self, address: u8, value: u8) -> Result<(), Driver::Error> {
        // A key scan puts the chip back in incremental mode, so the addressing mode is sent
        // every time
        self.apply_write_command(WriteCommand::SetFixedAddressing)
            .await?;

        self.apply_write_command(WriteCommand::Write {
            address,
            data: core::slice::from_ref(&value),
        })
        .await
    }

    /// Scan the keys.  This is always one transaction on the bus; nothing is cached.
    pub async fn read_keys(&mut self) -> Result<Keys, Driver::Error> {
        let mut buffer = [0u8; KEY_BYTES];

        self.apply_read_command(ReadCommand::ReadKeys, &mut buffer)
            .await?;

        #[cfg(feature = "defmt")]
        defmt::trace!("keys = {:?}", buffer);

        Ok(Keys::new(buffer))
    }

    pub fn bus(&self) -> &Driver {
        &self.driver
    }

    pub fn bus_mut(&mut self) -> &mut Driver {
        &mut self.driver
    }

    /// Give back the bus driver
    pub fn release(self) -> Driver {
        self.driver
    }

    async fn write_display_control(&mut self) -> Result<(), Driver::Error> {
        self.apply_write_command(WriteCommand::DisplayControl {
            on: self.on,
            brightness: self.brightness,
        })
        .await
    }

    /// Apply the command to the controller
    async fn apply_write_command<'c>(
        &mut self,
        command: WriteCommand<'c>,
    ) -> Result<(), Driver::Error> {
        let (command_byte, data_bytes) = command.encode();

        #[cfg(feature = "defmt")]
        defmt::trace!("command byte = {=u8:x}", command_byte);

        if let Some(data_bytes) = data_bytes {
            self.driver
                .send_command_write_data(command_byte, data_bytes)
                .await
        } else {
            self.driver.send_command(command_byte).await
        }
    }

    async fn apply_read_command(
        &mut self,
        command: ReadCommand,
        read_buffer: &mut [u8],
    ) -> Result<(), Driver::Error> {
        let (command_byte, read_bytes) = command.encode();

        #[cfg(feature = "defmt")]
        defmt::trace!("command byte = {=u8:x}", command_byte);

        #[cfg(feature = "defmt")]
        defmt::debug_assert!(read_bytes.get() as usize <= read_buffer.len());

        // Limit the read buffer to just the range needed to store these results
        let read_buffer = &mut read_buffer[0..read_bytes.get() as usize];

        self.driver
            .send_command_read_data(command_byte, read_buffer)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{self, FakeChip};
    use embassy_futures::block_on;

    #[test]
    fn init_clears_and_switches_on() {
        let mut board = sim::board();
        block_on(board.init()).unwrap();

        let mut blank_all = std::vec![0xc0u8];
        blank_all.extend_from_slice(&[0u8; 16]);

        let chip = board.bus().pins();
        assert!(chip.strobe_high());
        assert_eq!(chip.ram(), &[0u8; 16]);
        assert_eq!(chip.display_control(), Some(0x80 | 0x08 | 4));
        assert_eq!(
            chip.transactions(),
            [[0x40].to_vec(), blank_all, [0x8c].to_vec()]
        );

        assert!(board.is_on());
        assert_eq!(board.brightness(), DEFAULT_BRIGHTNESS);
    }

    #[test]
    fn brightness_is_masked() {
        let mut board = sim::board();
        block_on(board.init()).unwrap();

        for b in 0..=255u8 {
            block_on(board.set_brightness(b)).unwrap();
            assert_eq!(board.brightness(), b & 7);
            assert_eq!(
                board.bus().pins().display_control(),
                Some(0x80 | 0x08 | (b & 7))
            );
        }
    }

    #[test]
    fn power_keeps_brightness() {
        let mut board = sim::board();
        block_on(board.init()).unwrap();
        block_on(board.set_brightness(6)).unwrap();

        block_on(board.set_power(false)).unwrap();
        assert!(!board.is_on());
        assert_eq!(board.bus().pins().display_control(), Some(0x86));

        block_on(board.set_power(true)).unwrap();
        assert_eq!(board.bus().pins().display_control(), Some(0x8e));
    }

    #[test]
    fn write_at_uses_fixed_addressing() {
        let mut board = sim::board();
        block_on(board.init()).unwrap();
        board.bus_mut().pins_mut().forget_history();

        block_on(board.write_at(0x15, 0x7f)).unwrap();

        let chip = board.bus().pins();
        assert_eq!(chip.transactions(), [[0x44].to_vec(), [0xc5, 0x7f].to_vec()]);
        assert_eq!(chip.ram()[5], 0x7f);
        assert_eq!(chip.ram().iter().filter(|b| **b != 0).count(), 1);
    }

    #[test]
    fn write_after_scan_resends_mode() {
        let mut board = sim::board();
        block_on(board.init()).unwrap();

        block_on(board.write_at(2, 0x11)).unwrap();
        block_on(board.read_keys()).unwrap();
        board.bus_mut().pins_mut().forget_history();
        block_on(board.write_at(2, 0x22)).unwrap();

        assert_eq!(board.bus().pins().transactions()[0], [0x44]);
        assert_eq!(board.bus().pins().ram()[2], 0x22);
        assert_eq!(board.bus().pins().ram()[3], 0x00);
    }

    #[test]
    fn read_keys_is_one_transaction() {
        let mut board = sim::board();
        block_on(board.init()).unwrap();
        board.bus_mut().pins_mut().press(0b1001_0010);
        board.bus_mut().pins_mut().forget_history();

        let first = block_on(board.read_keys()).unwrap();
        let second = block_on(board.read_keys()).unwrap();

        assert_eq!(first.mask(), 0b1001_0010);
        assert_eq!(first, second);
        assert_eq!(
            AsRef::<[u8; KEY_BYTES]>::as_ref(&first),
            &FakeChip::key_bytes(0b1001_0010)
        );
        assert_eq!(
            board.bus().pins().transactions(),
            [[0x42].to_vec(), [0x42].to_vec()]
        );
        assert_eq!(board.bus().pins().scans(), 2);
    }

    #[test]
    fn clear_does_not_touch_keys() {
        let mut board = sim::board();
        block_on(board.init()).unwrap();
        board.bus_mut().pins_mut().press(0b0000_0101);

        let before = block_on(board.read_keys()).unwrap();
        block_on(board.clear()).unwrap();
        let after = block_on(board.read_keys()).unwrap();

        assert_eq!(before, after);
        assert_eq!(after.mask(), 0b0000_0101);
    }
}
