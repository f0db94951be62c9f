//! The GPIO side of the bus: the [`Pins`] trait and implementations of it for `embedded-hal` and
//! Embassy RP pins.

use embedded_hal_1::digital::{InputPin, OutputPin};

/// The three GPIO lines of the TM1638 bus: strobe (STB), clock (CLK) and data (DIO).
///
/// This is the only thing [`crate::BitBangingBusDriver`] needs from the target platform.  The
/// pins are owned by the implementation, so two drivers can never share one set of pins.
///
/// DIO is bidirectional: [`Self::set_dio`] drives it, [`Self::release_dio`] turns it into an
/// input with a pull-up so the chip can drive it during a key scan.
pub trait Pins {
    type Error;

    fn set_strobe(&mut self, high: bool) -> Result<(), Self::Error>;

    fn set_clock(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Drive DIO to the given level, switching it to an output first if it was released.
    fn set_dio(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Stop driving DIO and let the pull-up hold it high.
    fn release_dio(&mut self) -> Result<(), Self::Error>;

    /// Sample DIO.  Only meaningful after [`Self::release_dio`].
    fn read_dio(&mut self) -> Result<bool, Self::Error>;
}

/// [`Pins`] implementation for `embedded-hal` 1.0 pins.
///
/// Sadly, due to [this issue](https://github.com/rust-embedded/embedded-hal/issues/397),
/// `embedded-hal` has no notion of a pin that switches between input and output.  This works
/// around that with an open-drain DIO pin: driving it high releases the line to the pull-up
/// (internal or external), so releasing and reading it back needs no direction change.
pub struct OpenDrainPins<Stb, Clk, Dio> {
    strobe: Stb,
    clock: Clk,
    dio: Dio,
}

impl<Stb, Clk, Dio> OpenDrainPins<Stb, Clk, Dio> {
    /// `dio` must be configured as open-drain with a pull-up.
    pub fn new(strobe: Stb, clock: Clk, dio: Dio) -> Self {
        Self { strobe, clock, dio }
    }

    pub fn release(self) -> (Stb, Clk, Dio) {
        (self.strobe, self.clock, self.dio)
    }
}

impl<E, Stb, Clk, Dio> Pins for OpenDrainPins<Stb, Clk, Dio>
where
    Stb: OutputPin<Error = E>,
    Clk: OutputPin<Error = E>,
    Dio: OutputPin<Error = E> + InputPin<Error = E>,
{
    type Error = E;

    fn set_strobe(&mut self, high: bool) -> Result<(), E> {
        self.strobe.set_state(high.into())
    }

    fn set_clock(&mut self, high: bool) -> Result<(), E> {
        self.clock.set_state(high.into())
    }

    fn set_dio(&mut self, high: bool) -> Result<(), E> {
        self.dio.set_state(high.into())
    }

    fn release_dio(&mut self) -> Result<(), E> {
        self.dio.set_high()
    }

    fn read_dio(&mut self) -> Result<bool, E> {
        self.dio.is_high()
    }
}

#[cfg(feature = "embassy-rp")]
mod embassy_rp_pins {
    use core::convert::Infallible;
    use embassy_rp::gpio;

    /// [`super::Pins`] implementation that uses the Embassy RP HAL for the RP2040
    /// microcontroller.
    pub struct EmbassyRpPins<'a, StrobePin: gpio::Pin, ClockPin: gpio::Pin, DioPin: gpio::Pin> {
        strobe: gpio::Output<'a, StrobePin>,
        clock: gpio::Output<'a, ClockPin>,
        dio: gpio::Flex<'a, DioPin>,
    }

    impl<'a, StrobePin: gpio::Pin, ClockPin: gpio::Pin, DioPin: gpio::Pin>
        EmbassyRpPins<'a, StrobePin, ClockPin, DioPin>
    {
        pub fn new(strobe: StrobePin, clock: ClockPin, dio: DioPin) -> Self {
            let mut dio = gpio::Flex::new(dio);

            // The pull-up applies in both directions, so it only has to be set once
            dio.set_pull(gpio::Pull::Up);
            dio.set_low();
            dio.set_as_output();

            Self {
                strobe: gpio::Output::new(strobe, gpio::Level::High),
                clock: gpio::Output::new(clock, gpio::Level::High),
                dio,
            }
        }
    }

    impl<'a, StrobePin: gpio::Pin, ClockPin: gpio::Pin, DioPin: gpio::Pin> super::Pins
        for EmbassyRpPins<'a, StrobePin, ClockPin, DioPin>
    {
        type Error = Infallible;

        fn set_strobe(&mut self, high: bool) -> Result<(), Infallible> {
            self.strobe.set_level(high.into());
            Ok(())
        }

        fn set_clock(&mut self, high: bool) -> Result<(), Infallible> {
            self.clock.set_level(high.into());
            Ok(())
        }

        fn set_dio(&mut self, high: bool) -> Result<(), Infallible> {
            // Set the level before switching direction so the line never glitches
            self.dio.set_level(high.into());
            self.dio.set_as_output();
            Ok(())
        }

        fn release_dio(&mut self) -> Result<(), Infallible> {
            self.dio.set_as_input();
            Ok(())
        }

        fn read_dio(&mut self) -> Result<bool, Infallible> {
            Ok(self.dio.is_high())
        }
    }
}

#[cfg(feature = "embassy-rp")]
pub use embassy_rp_pins::EmbassyRpPins;
