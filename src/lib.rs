//! # wooting-rgb-hid
//!
//! Per-key RGB lighting control for Wooting One and Wooting Two keyboards
//! over their vendor USB HID interface.
//!
//! This crate uses the `hidapi` crate for cross-platform USB HID
//! communication.
//!
//! ## Features
//!
//! *   Device discovery grouped by keyboard (`enumerate`, `list_all`).
//! *   Session management (`WootingRgb::open`, `WootingRgb::open_first`),
//!     including the vendor color-subsystem handshake.
//! *   Buffered per-key color updates with dirty tracking
//!     (`set_rgb`, `update_keyboard`, `force_update`, auto-update mode);
//!     unchanged keys cause no USB traffic.
//! *   Immediate single-key preview commands (`set_direct_rgb`,
//!     `reset_direct_rgb`) that bypass the bank buffers.
//! *   Device-wide reset (`reset_rgb`).
//! *   Input-report/removal telemetry via [`DeviceEvent`].
//!
//! ## Coordinates
//!
//! Keys are addressed by (row, column) on a 6×21 logical matrix: row 0 is
//! the function row, column 0 the left edge. Not every position is wired to
//! an LED; operations on unwired positions return `false` and cause no I/O.
//! The ANSI Left-Shift and Enter positions are wired in parallel with their
//! ISO variants, and the crate always updates both halves of such a pair.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use wooting_rgb_hid::{HidApiBackend, Rgb, WootingRgb};
//!
//! fn main() -> wooting_rgb_hid::Result<()> {
//!     let backend = HidApiBackend::new()?;
//!     let keyboard = WootingRgb::open_first(&backend)?;
//!
//!     // Escape key red, immediately (auto-update defaults to on).
//!     keyboard.set_rgb(0, 0, Rgb::RED);
//!
//!     // Batch a row of keys, then flush once.
//!     keyboard.set_auto_update(false);
//!     for column in 0..13 {
//!         keyboard.set_rgb(1, column, Rgb::new(0, 128, 255));
//!     }
//!     keyboard.update_keyboard();
//!
//!     // Hand the lighting back to the keyboard before leaving.
//!     keyboard.reset_rgb();
//!     keyboard.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Hardware Setup Notes
//!
//! *   **Linux udev rules:** grant user permission to the HID interfaces.
//!     Create `/etc/udev/rules.d/99-wooting.rules`:
//!     ```udev
//!     SUBSYSTEM=="hidraw", ATTRS{idVendor}=="03eb", ATTRS{idProduct}=="ff01", MODE="0666", GROUP="plugdev"
//!     SUBSYSTEM=="hidraw", ATTRS{idVendor}=="03eb", ATTRS{idProduct}=="ff02", MODE="0666", GROUP="plugdev"
//!     ```
//!     Reload: `sudo udevadm control --reload-rules && sudo udevadm trigger`
//! *   The keyboard keeps whatever colors were last uploaded; `reset_rgb`
//!     returns control to the onboard lighting engine.

// Make internal modules private, re-export public types
mod bank;
mod color;
mod consts;
mod crc;
mod device;
mod error;
mod matrix;
mod transport;

mod rgb; // impl blocks on WootingRgb only

pub use color::Rgb;
pub use consts::{
    MATRIX_COLS, MATRIX_ROWS, SUPPORTED_PIDS, WOOTING_ONE_PID, WOOTING_TWO_PID, WOOTING_VID,
};
pub use crc::{checksum, crc16_ccitt, CRC_SEED};
pub use device::{enumerate, list_all, DeviceCandidate, DeviceEvent, WootingRgb};
pub use error::{Error, Result};
pub use matrix::{led_index, LedIndex};
pub use transport::{HidApiBackend, HidApiTransport, HidBackend, HidTransport};

// Test support: in-memory transport/backend. Hidden from docs.
#[doc(hidden)]
pub use transport::mock;
