//! Module describing the [`BusDriver`] trait, the bit-banging implementation of it, and the
//! [`Timer`] used to pace the bus.

// This module defines traits w/ async methods.  That triggers a warning due to the very...limited
// support for this in the current Rust version.  However this pertains only to the use of
// futures returned by async methods in multi-threaded executors.  As this crate is meant for use
// on embedded microcontrollers without any concept of threads, this does not concern us at all
#![allow(async_fn_in_trait)]

use core::marker::PhantomData;

use crate::pins::Pins;

/// This trait represents some low-level implementation of the TM1638 bus interface.
///
/// The TM1638 uses a three-wire bus similar to SPI, but not so similar that we can just use an SPI
/// implementation instead.  This trait exposes a transaction-level interface: every method is
/// one window in which strobe is held low, and must run to completion before the next one
/// starts.
///
/// [`BitBangingBusDriver`] implements this in terms of any [`Pins`] implementation.
pub trait BusDriver {
    type Error;

    /// Put the bus in its idle state: clock high, DIO low, strobe high.
    async fn idle(&mut self) -> Result<(), Self::Error>;

    /// Send a single command, with no payload, and no response expected
    async fn send_command(&mut self, b: u8) -> Result<(), Self::Error>;

    /// Send a command with a data payload, but no response expected.
    async fn send_command_write_data(&mut self, b: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Send a command which is expected to generate a response.
    ///
    /// The expected size of the response (in bytes) is determined by the size of the `data` slice.
    /// This operation will return once enough bytes are received to fill `data`.
    async fn send_command_read_data(&mut self, b: u8, data: &mut [u8]) -> Result<(), Self::Error>;
}

/// Abstraction on platform-specific timers to provide a generic way to pause the bus driver
/// execution in order to implement the TM1638 bus protocol correctly.
///
/// The timer situation on embedded Rust is still quite unstable, with competing timer
/// implementations, including `embasssy_time`, `embedded-time`, `fugit`, and probably others.  To
/// avoid picking a side, this very simple timer trait needs to be implemented in terms of whatever
/// your preferred timer implementation is.
///
/// The chip only cares about the order of the edges, so an implementation that returns
/// immediately is valid as long as the GPIO writes themselves are slow enough for the chip.
pub trait Timer {
    /// Wait for the clock interval to ensure an outgoing value on the DIO pin is read.
    /// This should be at least 1us.
    async fn wait_clock_tick();

    /// Wait for the tWAIT interval defined in section 12 of the datasheet, Timing Characteristics.
    /// By default it is implemented in terms of `wait_clock_tick`
    async fn wait_twait() {
        Self::wait_clock_tick().await
    }
}

#[cfg(feature = "embassy-time")]
mod embassy_time_timer {
    use embassy_time::{Duration, Timer as EmbassyTimer};

    /// Use a 1uS clock tick to ensure the TM1638 picks up the value
    const CLOCK_TICK: Duration = Duration::from_micros(1);

    /// The interval to wait after sending the button read command, before reading data
    /// Corresponds to tWAIT in section 12 of the datasheet, under Timing Characteristics.
    const TWAIT: Duration = Duration::from_micros(1);

    pub struct EmbassyTimeTimer;

    impl super::Timer for EmbassyTimeTimer {
        async fn wait_clock_tick() {
            EmbassyTimer::after(CLOCK_TICK).await
        }

        async fn wait_twait() {
            EmbassyTimer::after(TWAIT).await
        }
    }
}

#[cfg(feature = "embassy-time")]
pub use embassy_time_timer::EmbassyTimeTimer;

/// Implementation of [`BusDriver`] that bit-bangs the protocol on three GPIO pins.
///
/// Works with any [`Pins`] and any [`Timer`] implementation.
pub struct BitBangingBusDriver<P: Pins, T: Timer> {
    pins: P,
    _timer: PhantomData<T>,
}

impl<P: Pins, T: Timer> BitBangingBusDriver<P, T> {
    pub fn new(pins: P) -> Self {
        Self {
            pins,
            _timer: PhantomData,
        }
    }

    pub fn pins(&self) -> &P {
        &self.pins
    }

    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }

    /// Give back the pins, for example to hand them to another peripheral
    pub fn release(self) -> P {
        self.pins
    }

    /// Clock a single bit out.  The chip latches DIO on the rising edge of CLK.
    async fn write_bit(&mut self, value: bool) -> Result<(), P::Error> {
        self.pins.set_clock(false)?;
        self.pins.set_dio(value)?;
        T::wait_clock_tick().await;
        self.pins.set_clock(true)?;
        T::wait_clock_tick().await;

        Ok(())
    }

    /// Shift the byte value out on the DIO pin, LSB first
    async fn write_byte(&mut self, b: u8) -> Result<(), P::Error> {
        for bit in 0..8 {
            self.write_bit(b & (1 << bit) != 0).await?;
        }

        Ok(())
    }

    /// Shift a byte value in from the DIO pin, LSB first, using the CLK pin to drive the
    /// controller to send data.
    async fn read_byte(&mut self) -> Result<u8, P::Error> {
        self.pins.release_dio()?;

        let mut value = 0;

        for bit in 0..8 {
            self.pins.set_clock(false)?;
            T::wait_clock_tick().await;

            if self.pins.read_dio()? {
                value |= 1 << bit;
            }

            self.pins.set_clock(true)?;
            T::wait_clock_tick().await;
        }

        Ok(value)
    }
}

impl<P: Pins, T: Timer> BusDriver for BitBangingBusDriver<P, T> {
    type Error = P::Error;

    async fn idle(&mut self) -> Result<(), Self::Error> {
        self.pins.set_clock(true)?;
        self.pins.set_dio(false)?;
        self.pins.set_strobe(true)
    }

    /// Send a single byte that represents a command, so strobe will be pulled low
    /// before the command's bits are sent, and then pulled high again after.
    async fn send_command(&mut self, b: u8) -> Result<(), Self::Error> {
        self.pins.set_strobe(false)?;
        self.write_byte(b).await?;
        self.pins.set_strobe(true)
    }

    /// Send a single byte that represents a command followed by one or more data bytes, so strobe
    /// will be pulled low before the command's bits are sent, and not pulled high again
    /// until after the data bytes are sent.
    async fn send_command_write_data(&mut self, b: u8, data: &[u8]) -> Result<(), Self::Error> {
        #[cfg(feature = "defmt")]
        defmt::debug_assert!(!data.is_empty());

        self.pins.set_strobe(false)?;
        self.write_byte(b).await?;
        for b in data {
            #[cfg(feature = "defmt")]
            defmt::trace!("data byte = {=u8:x}", b);
            self.write_byte(*b).await?;
        }
        self.pins.set_strobe(true)
    }

    /// Send a single byte that represents a command and which expects a response back from the
    /// controller, so strobe will be pulled low before the command's bits are sent, and then
    /// pulled high again after all bytes are read.
    async fn send_command_read_data(&mut self, b: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        self.pins.set_strobe(false)?;
        self.write_byte(b).await?;

        // Wait Twait interval before reading response
        T::wait_twait().await;

        #[cfg(feature = "defmt")]
        defmt::trace!("Expecting {0} bytes from controller", data.len());

        for byte in data.iter_mut() {
            *byte = self.read_byte().await?;
        }

        self.pins.set_strobe(true)
    }
}
