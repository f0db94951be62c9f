/// The number of bytes used to represent the state of the keys on the board
pub const KEY_BYTES: usize = 4;

/// The state of the keys on the TM1638 board in response to a call to
/// [`crate::LedAndKey::read_keys`]
///
/// The controller answers a key scan with four bytes.  Each byte holds two rows (KS lines) of the
/// key matrix, one per nibble, and the LED&KEY board wires each of its 8 buttons to column K3 of
/// a different row, which is bit 0 or bit 4 of a byte.  The wiring is somewhat confusing:
///
/// S1 -> byte 0 bit 0 (KS1)
/// S2 -> byte 1 bit 0 (KS3)
/// S3 -> byte 2 bit 0 (KS5)
/// S4 -> byte 3 bit 0 (KS7)
/// S5 -> byte 0 bit 4 (KS2)
/// S6 -> byte 1 bit 4 (KS4)
/// S7 -> byte 2 bit 4 (KS6)
/// S8 -> byte 3 bit 4 (KS8)
///
/// [`Self::mask`] undoes this, so that bit 0 corresponds to S1, bit 1 is S2, etc.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Keys([u8; KEY_BYTES]);

impl Keys {
    pub fn new(bytes: [u8; KEY_BYTES]) -> Self {
        Self(bytes)
    }

    /// Quickly check if *any* button is pressed
    pub fn any_pressed(&self) -> bool {
        self.mask() != 0
    }

    /// Test if a specific button is pressed
    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons().contains(button)
    }

    /// The pressed buttons as an 8-bit mask: bit `i` is set if button `i + 1` is pressed.
    ///
    /// This has the nice property that if you take this return value and pass it to
    /// [`crate::LedAndKey::set_leds`], you'll light up the LED above each pressed button.
    pub fn mask(&self) -> u8 {
        self.0
            .iter()
            .enumerate()
            .fold(0u8, |mask, (k, byte)| {
                mask | ((byte & 0b0000_0001) << k) | (((byte >> 4) & 0b0000_0001) << (k + 4))
            })
    }

    /// The pressed buttons as a set
    pub fn buttons(&self) -> ButtonSet {
        ButtonSet::from_mask(self.mask())
    }

    /// Compose the key bytes as `byte[k] << k`, OR-ed together.
    ///
    /// This is the layout used by some older LED&KEY drivers.  Only the low bits agree with
    /// [`Self::mask`] (S1 to S4); the S5 to S8 bits land on bits 4 to 7 of the result.  Prefer
    /// [`Self::mask`] unless you need to be bit compatible with such a driver.
    pub fn shifted_mask(&self) -> u16 {
        self.0
            .iter()
            .enumerate()
            .fold(0u16, |mask, (k, byte)| mask | ((*byte as u16) << k))
    }
}

impl AsRef<[u8; KEY_BYTES]> for Keys {
    fn as_ref(&self) -> &[u8; KEY_BYTES] {
        &self.0
    }
}

impl AsRef<[u8]> for Keys {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

/// The 8 buttons on the board, labeled as printed on the PCB
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::VariantArray, strum::FromRepr)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Button {
    S1 = 1,
    S2 = 2,
    S3 = 3,
    S4 = 4,
    S5 = 5,
    S6 = 6,
    S7 = 7,
    S8 = 8,
}

impl Button {
    /// The 1-based number of the button, as printed on the board
    pub fn number(self) -> u8 {
        self as u8
    }

    /// The 0-based index of the button, which is also the index of the LED and digit above it
    pub fn index(self) -> u8 {
        self.number() - 1
    }

    /// The button with the given 0-based index, if there is one
    pub fn from_index(index: u8) -> Option<Self> {
        Self::from_repr(index.checked_add(1)?)
    }

    fn bit(self) -> u8 {
        1 << self.index()
    }
}

/// A set of buttons, stored as a mask in which bit `i` is button `i + 1`.
///
/// Iterating yields the buttons in ascending order and removes them from the set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonSet(u8);

impl ButtonSet {
    pub const fn from_mask(mask: u8) -> Self {
        Self(mask)
    }

    pub const fn mask(&self) -> u8 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }
}

impl Iterator for ButtonSet {
    type Item = Button;

    fn next(&mut self) -> Option<Button> {
        if self.0 == 0 {
            return None;
        }

        let index = self.0.trailing_zeros() as u8;
        self.0 &= !(1 << index);

        Button::from_index(index)
    }
}
