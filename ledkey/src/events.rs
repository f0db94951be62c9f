//! Button press events, produced by polling the key scan and looking for buttons that went down
//! since the previous poll.
//!
//! The chip has no interrupt line, so a [`ButtonWatcher`] polls it on a fixed interval and hands
//! each newly pressed [`Button`] to a [`ButtonListener`].  Releases are not reported.

#![allow(async_fn_in_trait)]

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;

use crate::bus::BusDriver;
use crate::keys::{Button, ButtonSet};
use crate::LedAndKey;

/// How long [`ButtonWatcher`] waits between key scans unless told otherwise.
///
/// The chip can be polled at any rate; this is fast enough to feel instant and slow enough to
/// leave the bus free most of the time.
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 25;

/// Turns a sequence of key masks into rising edges, i.e. buttons that were up on the previous
/// mask and are down now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PressDetector {
    last_mask: u8,
}

impl PressDetector {
    /// Start from `initial_mask`, so buttons already down in it are never reported
    pub const fn new(initial_mask: u8) -> Self {
        Self {
            last_mask: initial_mask,
        }
    }

    /// Record the latest mask and return the buttons that were pressed since the last one.
    pub fn update(&mut self, mask: u8) -> ButtonSet {
        let pressed = (self.last_mask ^ mask) & mask;
        self.last_mask = mask;

        ButtonSet::from_mask(pressed)
    }

    pub const fn last_mask(&self) -> u8 {
        self.last_mask
    }
}

/// Receives button press events from a [`ButtonWatcher`].
///
/// The listener runs between two key scans and gets the board, so it can update the display or
/// the LEDs without fighting the watcher for the bus.
pub trait ButtonListener<D: BusDriver> {
    async fn button_pressed(
        &mut self,
        button: Button,
        board: &mut LedAndKey<D>,
    ) -> Result<(), D::Error>;
}

impl<D: BusDriver, L: ButtonListener<D>> ButtonListener<D> for &mut L {
    async fn button_pressed(
        &mut self,
        button: Button,
        board: &mut LedAndKey<D>,
    ) -> Result<(), D::Error> {
        (**self).button_pressed(button, board).await
    }
}

/// Push every pressed button into an `embassy-sync` channel.  Waits for room in the channel if
/// it is full, which also holds back the next key scan.
impl<'ch, D: BusDriver, M: RawMutex, const N: usize> ButtonListener<D>
    for Sender<'ch, M, Button, N>
{
    async fn button_pressed(
        &mut self,
        button: Button,
        _board: &mut LedAndKey<D>,
    ) -> Result<(), D::Error> {
        self.send(button).await;
        Ok(())
    }
}

/// Adapts a plain closure into a [`ButtonListener`] that doesn't need the board.
pub struct Callback<F>(pub F);

impl<D: BusDriver, F: FnMut(Button)> ButtonListener<D> for Callback<F> {
    async fn button_pressed(
        &mut self,
        button: Button,
        _board: &mut LedAndKey<D>,
    ) -> Result<(), D::Error> {
        (self.0)(button);
        Ok(())
    }
}

/// Polls the keys of a board and reports button presses.
///
/// [`Self::watch`] borrows the board mutably for as long as it runs, so there is never more than
/// one watcher per board, and nothing else can interleave transactions with its key scans.
pub struct ButtonWatcher<Delay> {
    delay: Delay,
    interval_ms: u32,
}

impl<Delay: DelayNs> ButtonWatcher<Delay> {
    /// Watch with the default interval of [`DEFAULT_POLL_INTERVAL_MS`]
    pub fn new(delay: Delay) -> Self {
        Self::with_interval(delay, DEFAULT_POLL_INTERVAL_MS)
    }

    pub fn with_interval(delay: Delay, interval_ms: u32) -> Self {
        Self { delay, interval_ms }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Poll `board` until `stop` is signaled, reporting every button press to `listener` in
    /// ascending button order.
    ///
    /// The first scan only establishes which buttons are already down.  Returns `Ok(())` once
    /// stopped, or the bus error if a scan or the listener fails.
    pub async fn watch<D, L, M>(
        &mut self,
        board: &mut LedAndKey<D>,
        mut listener: L,
        stop: &Signal<M, ()>,
    ) -> Result<(), D::Error>
    where
        D: BusDriver,
        L: ButtonListener<D>,
        M: RawMutex,
    {
        let mut detector = PressDetector::new(board.read_keys().await?.mask());

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "watching buttons every {=u32} ms, initial mask {=u8:b}",
            self.interval_ms,
            detector.last_mask()
        );

        loop {
            let tick = self.delay.delay_ms(self.interval_ms);
            if let Either::First(()) = select(stop.wait(), tick).await {
                #[cfg(feature = "defmt")]
                defmt::debug!("button watcher stopped");

                return Ok(());
            }

            let keys = board.read_keys().await?;

            for button in detector.update(keys.mask()) {
                #[cfg(feature = "defmt")]
                defmt::debug!("button {} pressed", button);

                listener.button_pressed(button, board).await?;
            }
        }
    }
}

impl<D: BusDriver> LedAndKey<D> {
    /// Report button presses to `listener` until `stop` is signaled, polling every
    /// [`DEFAULT_POLL_INTERVAL_MS`] milliseconds.
    ///
    /// Shorthand for [`ButtonWatcher::watch`].
    pub async fn on_button_pressed<L, M>(
        &mut self,
        delay: impl DelayNs,
        listener: L,
        stop: &Signal<M, ()>,
    ) -> Result<(), D::Error>
    where
        L: ButtonListener<D>,
        M: RawMutex,
    {
        ButtonWatcher::new(delay).watch(self, listener, stop).await
    }
}
