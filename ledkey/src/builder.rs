//! Staged builder for [`LedAndKey`], so the bus driver, pins and timer types can be picked
//! without spelling out the full generic type.

use core::marker::PhantomData;

use embedded_hal_1::digital::{InputPin, OutputPin};

use crate::bus::{BitBangingBusDriver, BusDriver, Timer};
use crate::pins::{OpenDrainPins, Pins};
use crate::LedAndKey;

#[cfg(feature = "embassy-time")]
use crate::bus::EmbassyTimeTimer;
#[cfg(feature = "embassy-rp")]
use crate::pins::EmbassyRpPins;

/// Returned by [`LedAndKey::builder`]
pub struct LedAndKeyBuilder;

impl LedAndKeyBuilder {
    /// Use an arbitrary [`BusDriver`] implementation; nothing more needs to be specified!
    pub fn with_bus_driver<D: BusDriver>(self, driver: D) -> WithDriver<D> {
        WithDriver { driver }
    }

    /// Bit-bang the bus, pacing it with an arbitrary [`Timer`] implementation.
    pub fn with_timer<T: Timer>(self) -> WithTimer<T> {
        WithTimer {
            _timer: PhantomData,
        }
    }

    /// Bit-bang the bus, pacing it with `embassy-time`
    #[cfg(feature = "embassy-time")]
    pub fn with_embassy_timer(self) -> WithTimer<EmbassyTimeTimer> {
        self.with_timer::<EmbassyTimeTimer>()
    }
}

pub struct WithTimer<T: Timer> {
    _timer: PhantomData<T>,
}

impl<T: Timer> WithTimer<T> {
    /// Use an arbitrary implementation of [`Pins`] specific to your target platform
    pub fn with_pins<P: Pins>(self, pins: P) -> WithPins<P, T> {
        WithPins {
            pins,
            _timer: self._timer,
        }
    }

    /// Use three `embedded-hal` pins.  `dio` must be an open-drain pin with a pull-up, so that
    /// driving it high lets the chip pull it low when it answers a key scan.
    pub fn with_open_drain_pins<Stb, Clk, Dio, E>(
        self,
        strobe: Stb,
        clock: Clk,
        dio: Dio,
    ) -> WithPins<OpenDrainPins<Stb, Clk, Dio>, T>
    where
        Stb: OutputPin<Error = E>,
        Clk: OutputPin<Error = E>,
        Dio: OutputPin<Error = E> + InputPin<Error = E>,
    {
        self.with_pins(OpenDrainPins::new(strobe, clock, dio))
    }

    /// Use the specified Embassy RP HAL pins
    #[cfg(feature = "embassy-rp")]
    pub fn with_embassy_rp_pins<
        'a,
        StrobePin: embassy_rp::gpio::Pin,
        ClockPin: embassy_rp::gpio::Pin,
        DioPin: embassy_rp::gpio::Pin,
    >(
        self,
        strobe: StrobePin,
        clock: ClockPin,
        dio: DioPin,
    ) -> WithPins<EmbassyRpPins<'a, StrobePin, ClockPin, DioPin>, T> {
        self.with_pins(EmbassyRpPins::new(strobe, clock, dio))
    }
}

pub struct WithPins<P: Pins, T: Timer> {
    pins: P,
    _timer: PhantomData<T>,
}

impl<P: Pins, T: Timer> WithPins<P, T> {
    /// Construct the board using the bit-banging driver.  Nothing touches the pins until
    /// [`LedAndKey::init`].
    pub fn build(self) -> LedAndKey<BitBangingBusDriver<P, T>> {
        LedAndKey::new(BitBangingBusDriver::new(self.pins))
    }
}

pub struct WithDriver<D: BusDriver> {
    driver: D,
}

impl<D: BusDriver> WithDriver<D> {
    pub fn build(self) -> LedAndKey<D> {
        LedAndKey::new(self.driver)
    }
}
