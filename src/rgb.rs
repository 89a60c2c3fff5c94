//! Color-setting API for an open keyboard session.

use std::sync::atomic::Ordering;

use log::warn;

use crate::color::Rgb;
use crate::consts::cmd;
use crate::device::{lock_bank, send_command, WootingRgb};
use crate::matrix::{led_index, LedIndex};

impl WootingRgb {
    /// Sets the buffered color of the key at (row, column).
    ///
    /// Returns `false` when the position has no physical LED. Writes land in
    /// the owning bank's buffer; with auto-update enabled (the default) all
    /// banks are flushed immediately and the combined result is returned,
    /// otherwise the write is deferred until [`WootingRgb::update_keyboard`].
    ///
    /// The ANSI Left-Shift and Enter positions also update their ISO twin.
    pub fn set_rgb(&self, row: u8, column: u8, rgb: Rgb) -> bool {
        let Some(led) = led_index(row, column) else {
            return false;
        };
        {
            let mut bank = lock_bank(&self.banks[led.bank()]);
            bank.set_color(led.slot(), rgb);
            if let Some(twin) = led.alias() {
                // Twins always live in the primary's bank.
                bank.set_color(twin.slot(), rgb);
            }
        }
        if self.auto_update() {
            self.update_keyboard()
        } else {
            true
        }
    }

    /// Buffered color of the key at (row, column), or `None` when the
    /// position has no physical LED.
    ///
    /// Reads the local bank buffer, not the hardware.
    pub fn buffered_rgb(&self, row: u8, column: u8) -> Option<Rgb> {
        let led = led_index(row, column)?;
        Some(self.buffered_led_rgb(led))
    }

    /// Buffered color of a physical LED.
    pub fn buffered_led_rgb(&self, led: LedIndex) -> Rgb {
        lock_bank(&self.banks[led.bank()]).color_at(led.slot())
    }

    /// Immediately paints one key, bypassing the bank buffers.
    ///
    /// Intended for lightweight previews; the buffered state is untouched,
    /// so the next flush restores the buffered color. Alias twins receive
    /// their own immediate command and both must succeed.
    pub fn set_direct_rgb(&self, row: u8, column: u8, rgb: Rgb) -> bool {
        let Some(led) = led_index(row, column) else {
            return false;
        };
        let ok = self.command(cmd::SINGLE_COLOR, led.number(), rgb.red, rgb.green, rgb.blue);
        match led.alias() {
            Some(twin) => {
                self.command(cmd::SINGLE_COLOR, twin.number(), rgb.red, rgb.green, rgb.blue) && ok
            }
            None => ok,
        }
    }

    /// Immediately restores one key to the device's default, bypassing the
    /// bank buffers. Mirror of [`WootingRgb::set_direct_rgb`].
    pub fn reset_direct_rgb(&self, row: u8, column: u8) -> bool {
        let Some(led) = led_index(row, column) else {
            return false;
        };
        let ok = self.command(cmd::SINGLE_RESET, 0, 0, 0, led.number());
        match led.alias() {
            Some(twin) => self.command(cmd::SINGLE_RESET, 0, 0, 0, twin.number()) && ok,
            None => ok,
        }
    }

    /// Flushes every dirty bank to the keyboard, bank 0 through bank 4.
    ///
    /// Returns the logical AND of the per-bank results. A bank that fails
    /// stays dirty and is retried by the next call.
    pub fn update_keyboard(&self) -> bool {
        let mut success = true;
        for bank in &self.banks {
            success &= lock_bank(bank).flush(self.transport.as_ref());
        }
        success
    }

    /// Retransmits every bank regardless of tracked dirty state.
    ///
    /// Use after a suspected desync (for instance following
    /// [`WootingRgb::reset_rgb`]) to force the hardware back in line with
    /// the buffered colors.
    pub fn force_update(&self) -> bool {
        let mut success = true;
        for bank in &self.banks {
            let mut bank = lock_bank(bank);
            bank.mark_dirty();
            success &= bank.flush(self.transport.as_ref());
        }
        success
    }

    /// Whether color writes flush immediately.
    pub fn auto_update(&self) -> bool {
        self.auto_update.load(Ordering::Acquire)
    }

    /// Enables or disables flush-on-write.
    ///
    /// Enabling flushes immediately so no buffered-but-unsent state lingers
    /// once the caller stops batching; a failed flush leaves the banks dirty
    /// for the next update.
    pub fn set_auto_update(&self, enabled: bool) {
        self.auto_update.store(enabled, Ordering::Release);
        if enabled && !self.update_keyboard() {
            warn!("Deferred color state failed to flush; banks stay dirty for retry");
        }
    }

    /// Resets every LED on the device to its default state.
    ///
    /// This clears hardware state only: the local bank buffers keep their
    /// colors and may now be stale relative to the device. A later
    /// [`WootingRgb::set_rgb`] writing a color equal to the stale buffered
    /// value will not retransmit; call [`WootingRgb::force_update`] after a
    /// reset when the buffered colors should win again.
    pub fn reset_rgb(&self) -> bool {
        self.command(cmd::RESET_ALL, 0, 0, 0, 0)
    }

    fn command(&self, command: u8, p0: u8, p1: u8, p2: u8, p3: u8) -> bool {
        send_command(self.transport.as_ref(), command, p0, p1, p2, p3)
    }
}
