//! The command bytes the TM1638 understands, as Rust enums for greater readability.
//!
//! Every command is encoded into a command byte plus, optionally, data bytes that follow it
//! within the same strobe-low window.

use core::num::NonZeroU8;

use crate::keys::KEY_BYTES;

/// Represents possible write-only commands sent to the TM1638.
pub(crate) enum WriteCommand<'a> {
    /// Set display on/off and brightness.  Sent again every time either changes.
    DisplayControl {
        on: bool,

        /// Brightness, in a range from 0 to 7.  If `brightness` is larger than this range only
        /// the low 3 bits are used, the same way the chip itself would truncate it.
        brightness: u8,
    },

    /// Set the display addressing mode to incremental, so the target address automatically
    /// increments after each data byte.
    SetIncrementalAddressing,

    /// Set the display addressing mode to fixed, so all data bytes go to the same address.
    SetFixedAddressing,

    /// Set the display RAM address and write one or more bytes starting there.
    ///
    /// In incremental mode each byte lands on the next address; in fixed mode they all land on
    /// `address`.
    Write {
        /// Display RAM address, 0 to 15.  Only the low 4 bits are used.
        address: u8,

        data: &'a [u8],
    },
}

impl<'a> WriteCommand<'a> {
    /// Convert this command into the appropriate byte sequence to send to the controller.
    ///
    /// Return value is a tuple consisting of the following:
    ///
    /// - Command byte to send to controller
    /// - (Optional) slice of data bytes to send along with command byte
    ///
    /// The command byte and data bytes (if any) are sent together, during a single interval in
    /// which the strobe pin is pulled low.
    pub(crate) fn encode<'me>(&'me self) -> (u8, Option<&'me [u8]>)
    where
        'a: 'me,
    {
        match self {
            WriteCommand::DisplayControl { on, brightness } => {
                // See 5.3 in the data sheet.  Bit 3 switches the display on, the lowest three
                // bits are the pulse width, i.e. the brightness.
                #[cfg(feature = "defmt")]
                defmt::debug_assert!(*brightness < 0b1000);
                let on = if *on { 0b0000_1000 } else { 0 };

                (0b1000_0000 | on | (brightness & 0b0000_0111), None)
            }
            WriteCommand::SetIncrementalAddressing => {
                // Per section 5.1 in the data sheet
                (0b0100_0000, None)
            }
            WriteCommand::SetFixedAddressing => {
                // Per section 5.1 in the data sheet
                (0b0100_0100, None)
            }
            WriteCommand::Write { address, data } => {
                // Section 5.2 in the data sheet shows how to set the address
                #[cfg(feature = "defmt")]
                defmt::debug_assert!(*address < 0b1_0000);
                #[cfg(feature = "defmt")]
                defmt::debug_assert!(!data.is_empty());

                (0b1100_0000 | (address & 0b0000_1111), Some(data))
            }
        }
    }
}

/// Represents possible read commands sent to the TM1638 which read data from the controller
pub(crate) enum ReadCommand {
    /// Request the controller to send four bytes of key scanning data reflecting current state of
    /// keys
    ReadKeys,
}

impl ReadCommand {
    /// Convert this command into the appropriate byte sequence to send to the controller.
    ///
    /// Return value is a tuple consisting of the following:
    ///
    /// - Command byte to send to controller
    /// - number of bytes to read from the controller after command is sent.
    ///
    /// The command byte and response bytes are read during a single interval in which the strobe
    /// pin is pulled low.
    pub(crate) fn encode(&self) -> (u8, NonZeroU8) {
        match self {
            ReadCommand::ReadKeys => {
                const KEY_BYTES_NON_ZERO: NonZeroU8 = match NonZeroU8::new(KEY_BYTES as u8) {
                    Some(n) => n,
                    None => panic!("key scan must read at least one byte"),
                };

                // The read mode of the data command (section 5.1).  Note that bit 2 is clear,
                // so the chip is back in incremental addressing mode after a key scan.
                (0b0100_0010, KEY_BYTES_NON_ZERO)
            }
        }
    }
}
