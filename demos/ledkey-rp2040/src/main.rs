//! Counts button presses on an LED&KEY board wired to an RP2040 board like the Pi Pico.
//!
//! STB on GPIO 6, CLK on GPIO 7, DIO on GPIO 8.  Every press bumps the counter on the left half
//! of the display, shows the number of the button on the right half, and toggles the LED above
//! it.  S8 also swaps between decimal and hex; hex mode shows a dot on the left-most digit.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use ledkey::{BusDriver, Button, ButtonListener, LedAndKey, DECIMAL_POINT};

/// Never signaled here; another task would use it to stop watching the buttons
static STOP: Signal<CriticalSectionRawMutex, ()> = Signal::new();

struct PressCounter {
    presses: u32,
    leds: u8,
    hex: bool,
}

impl<D: BusDriver> ButtonListener<D> for PressCounter {
    async fn button_pressed(
        &mut self,
        button: Button,
        board: &mut LedAndKey<D>,
    ) -> Result<(), D::Error> {
        self.presses = self.presses.wrapping_add(1);
        self.leds ^= 1 << button.index();

        info!("{} pressed, {=u32} presses so far", button, self.presses);

        if button == Button::S8 {
            self.hex = !self.hex;
        }

        if self.hex {
            board.show_hex(self.presses).await?;
            // A lone dot on the left-most digit marks hex mode
            board.set_segment(0, DECIMAL_POINT).await?;
        } else {
            board.show_number_left(self.presses).await?;
            board.show_number_right(button.number() as u32).await?;
        }

        board.set_leds(self.leds).await
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    // Bit-bang the bus on three GPIO pins, paced by the `embassy-time` timer
    let mut board = LedAndKey::builder()
        .with_embassy_timer()
        .with_embassy_rp_pins(p.PIN_6, p.PIN_7, p.PIN_8)
        .build();
    board.init().await.unwrap();
    board.show_number(0).await.unwrap();

    info!("Hello!  Press one of the buttons on the board!");

    let counter = PressCounter {
        presses: 0,
        leds: 0,
        hex: false,
    };
    board.on_button_pressed(Delay, counter, &STOP).await.unwrap();

    info!("Stopped watching the buttons");
    board.set_power(false).await.unwrap();
}
