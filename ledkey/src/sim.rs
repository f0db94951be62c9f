//! Host-side stand-in for a TM1638 board, used by the unit tests.
//!
//! [`FakeChip`] implements [`Pins`] and listens to the wire the same way the chip does: bytes are
//! shifted in LSB first on rising clock edges while strobe is low, each strobe-low window is one
//! transaction, and the transaction is applied to an emulated display RAM when strobe goes high.
//! A `0x42` command switches it to answering with the four key-scan bytes, one bit per falling
//! clock edge.

use std::collections::VecDeque;
use std::vec::Vec;

use crate::bus::{BitBangingBusDriver, Timer};
use crate::pins::Pins;
use crate::LedAndKey;

pub type FakeBoard = LedAndKey<BitBangingBusDriver<FakeChip, NoWait>>;

/// A new, uninitialized board on a [`FakeChip`]
pub fn board() -> FakeBoard {
    LedAndKey::new(BitBangingBusDriver::new(FakeChip::new()))
}

/// The chip doesn't care about timing, only about edge order
pub struct NoWait;

impl Timer for NoWait {
    async fn wait_clock_tick() {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinEvent {
    Strobe(bool),
    Clock(bool),
    Dio(bool),
    ReleaseDio,
}

#[derive(Debug, PartialEq, Eq)]
pub struct PinFault;

pub struct FakeChip {
    strobe: bool,
    clock: bool,
    dio: bool,
    dio_released: bool,

    events: Vec<PinEvent>,
    remaining_ops: Option<usize>,

    transactions: Vec<Vec<u8>>,
    current: Vec<u8>,
    shift: u8,
    shift_bits: u8,
    answering_keys: bool,
    key_bit: usize,

    fixed_addressing: bool,
    display_control: Option<u8>,
    ram: [u8; 16],
    keys: [u8; 4],
    scripted_keys: VecDeque<[u8; 4]>,
    scans: usize,
}

impl FakeChip {
    pub fn new() -> Self {
        Self {
            strobe: true,
            clock: true,
            dio: false,
            dio_released: false,
            events: Vec::new(),
            remaining_ops: None,
            transactions: Vec::new(),
            current: Vec::new(),
            shift: 0,
            shift_bits: 0,
            answering_keys: false,
            key_bit: 0,
            fixed_addressing: false,
            display_control: None,
            ram: [0xaa; 16],
            keys: [0; 4],
            scripted_keys: VecDeque::new(),
            scans: 0,
        }
    }

    /// Every pin operation after the first `ops` fails
    pub fn fail_after(&mut self, ops: usize) {
        self.remaining_ops = Some(ops);
    }

    /// Hold down buttons, bit `i` of `mask` being button `i + 1`, wired the way the LED&KEY
    /// board wires them: S1..S4 on bit 0 of bytes 0..3, S5..S8 on bit 4 of bytes 0..3
    pub fn press(&mut self, mask: u8) {
        self.keys = Self::key_bytes(mask);
    }

    /// Set the exact bytes returned by the next key scans
    pub fn press_raw(&mut self, keys: [u8; 4]) {
        self.keys = keys;
    }

    /// Queue button masks, one consumed per key scan.  Once the queue runs dry the last mask
    /// stays pressed.
    pub fn script(&mut self, masks: &[u8]) {
        self.scripted_keys
            .extend(masks.iter().map(|mask| Self::key_bytes(*mask)));
    }

    pub fn key_bytes(mask: u8) -> [u8; 4] {
        let mut bytes = [0u8; 4];
        for (k, byte) in bytes.iter_mut().enumerate() {
            *byte = ((mask >> k) & 1) | (((mask >> (k + 4)) & 1) << 4);
        }
        bytes
    }

    pub fn events(&self) -> &[PinEvent] {
        &self.events
    }

    pub fn transactions(&self) -> &[Vec<u8>] {
        &self.transactions
    }

    pub fn forget_history(&mut self) {
        self.events.clear();
        self.transactions.clear();
    }

    pub fn ram(&self) -> &[u8; 16] {
        &self.ram
    }

    /// Segment bytes for digits 0 (left) to 7 (right)
    pub fn digits(&self) -> [u8; 8] {
        core::array::from_fn(|i| self.ram[i * 2])
    }

    /// LED bytes for LEDs 0 (left) to 7 (right)
    pub fn leds(&self) -> [u8; 8] {
        core::array::from_fn(|i| self.ram[i * 2 + 1])
    }

    pub fn display_control(&self) -> Option<u8> {
        self.display_control
    }

    pub fn scans(&self) -> usize {
        self.scans
    }

    pub fn clock_high(&self) -> bool {
        self.clock
    }

    pub fn strobe_high(&self) -> bool {
        self.strobe
    }

    pub fn dio_high(&self) -> bool {
        self.dio
    }

    fn operate(&mut self) -> Result<(), PinFault> {
        match self.remaining_ops.as_mut() {
            Some(0) => Err(PinFault),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn byte_received(&mut self) {
        self.current.push(self.shift);
        self.shift = 0;
        self.shift_bits = 0;

        if self.current == [0x42] {
            self.answering_keys = true;
            self.key_bit = 0;
            self.scans += 1;
            if let Some(keys) = self.scripted_keys.pop_front() {
                self.keys = keys;
            }
        }
    }

    fn end_transaction(&mut self) {
        let transaction = core::mem::take(&mut self.current);
        self.answering_keys = false;

        let Some((&command, data)) = transaction.split_first() else {
            return;
        };

        match command & 0b1100_0000 {
            0b0100_0000 => self.fixed_addressing = command & 0b0000_0100 != 0,
            0b1000_0000 => self.display_control = Some(command),
            0b1100_0000 => {
                let mut address = (command & 0x0f) as usize;
                for byte in data {
                    self.ram[address] = *byte;
                    if !self.fixed_addressing {
                        address = (address + 1) & 0x0f;
                    }
                }
            }
            _ => {}
        }

        self.transactions.push(transaction);
    }
}

impl Pins for FakeChip {
    type Error = PinFault;

    fn set_strobe(&mut self, high: bool) -> Result<(), PinFault> {
        self.operate()?;
        self.events.push(PinEvent::Strobe(high));

        if self.strobe && !high {
            self.current.clear();
            self.shift = 0;
            self.shift_bits = 0;
        } else if !self.strobe && high {
            self.end_transaction();
        }
        self.strobe = high;

        Ok(())
    }

    fn set_clock(&mut self, high: bool) -> Result<(), PinFault> {
        self.operate()?;
        self.events.push(PinEvent::Clock(high));

        let rising = !self.clock && high;
        let falling = self.clock && !high;
        self.clock = high;

        if self.strobe {
            return Ok(());
        }

        if rising && !self.dio_released {
            self.shift |= (self.dio as u8) << self.shift_bits;
            self.shift_bits += 1;
            if self.shift_bits == 8 {
                self.byte_received();
            }
        } else if falling && self.answering_keys && self.dio_released {
            let byte = self.keys.get(self.key_bit / 8).copied().unwrap_or(0);
            self.dio = (byte >> (self.key_bit % 8)) & 1 != 0;
            self.key_bit += 1;
        }

        Ok(())
    }

    fn set_dio(&mut self, high: bool) -> Result<(), PinFault> {
        self.operate()?;
        self.events.push(PinEvent::Dio(high));
        self.dio_released = false;
        self.dio = high;
        Ok(())
    }

    fn release_dio(&mut self) -> Result<(), PinFault> {
        self.operate()?;
        self.events.push(PinEvent::ReleaseDio);
        if !self.dio_released {
            // Pulled up until the chip drives it
            self.dio = true;
        }
        self.dio_released = true;
        Ok(())
    }

    fn read_dio(&mut self) -> Result<bool, PinFault> {
        self.operate()?;
        Ok(self.dio)
    }
}
