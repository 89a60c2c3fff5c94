//! One addressable bank of device color memory.

use log::{trace, warn};

use crate::color::Rgb;
use crate::consts::report;
use crate::crc::checksum;
use crate::matrix::pwm_offset;
use crate::transport::HidTransport;

/// A 128-byte report payload holding 24 LED slots of color state, plus the
/// flag tracking whether it differs from what the device last received.
pub(crate) struct Bank {
    buffer: [u8; report::PAYLOAD_SIZE],
    dirty: bool,
}

impl Bank {
    /// Creates a clean bank addressing `slave` at `base_offset`.
    pub fn new(slave: u8, base_offset: u8) -> Self {
        let mut buffer = [0u8; report::PAYLOAD_SIZE];
        buffer[0] = report::MAGIC[0];
        buffer[1] = report::MAGIC[1];
        buffer[2] = report::RAW_COLORS_TYPE;
        buffer[3] = slave;
        buffer[4] = base_offset;
        Self {
            buffer,
            dirty: false,
        }
    }

    /// Buffered color of `slot` (0-23).
    pub fn color_at(&self, slot: u8) -> Rgb {
        let base = report::COLOR_REGION + pwm_offset(slot);
        Rgb::new(
            self.buffer[base],
            self.buffer[base + report::GREEN_BLOCK],
            self.buffer[base + report::BLUE_BLOCK],
        )
    }

    /// Stores `rgb` for `slot`. Writing the value already buffered is a
    /// no-op and does not mark the bank dirty.
    pub fn set_color(&mut self, slot: u8, rgb: Rgb) {
        if self.color_at(slot) == rgb {
            return;
        }
        let base = report::COLOR_REGION + pwm_offset(slot);
        self.buffer[base] = rgb.red;
        self.buffer[base + report::GREEN_BLOCK] = rgb.green;
        self.buffer[base + report::BLUE_BLOCK] = rgb.blue;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forces the next flush to transmit even if nothing changed.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Transmits the bank if it has unflushed changes.
    ///
    /// The checksum covers the leading 125 payload bytes and lands at the
    /// two trailing checksum positions, low byte first. Success requires the
    /// transport to accept the exact payload size; anything else leaves the
    /// bank dirty so the next call resends.
    pub fn flush(&mut self, transport: &dyn HidTransport) -> bool {
        if !self.dirty {
            return true;
        }
        let crc = checksum(&self.buffer[..report::CHECKSUM_SPAN]);
        self.buffer[report::CHECKSUM_LOW] = crc as u8;
        self.buffer[report::CHECKSUM_HIGH] = (crc >> 8) as u8;

        match transport.write_output(&self.buffer) {
            Ok(n) if n == report::PAYLOAD_SIZE => {
                trace!(
                    "Flushed bank slave={} offset={} crc={crc:04X}",
                    self.buffer[3],
                    self.buffer[4]
                );
                self.dirty = false;
                true
            }
            Ok(n) => {
                warn!(
                    "Short bank write: {n} of {} bytes accepted",
                    report::PAYLOAD_SIZE
                );
                false
            }
            Err(e) => {
                warn!("Bank write failed: {e}");
                false
            }
        }
    }
}
