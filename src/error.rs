use thiserror::Error;

/// Errors that can occur when discovering or opening Wooting keyboards.
///
/// Per-LED operations never produce these: a coordinate without a physical
/// LED and a transient transmit failure both surface as a boolean `false`
/// from the session API, since unpopulated matrix positions and I/O hiccups
/// are expected conditions.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from the underlying HID API layer.
    #[error("HID API error: {0}")]
    Hid(#[from] hidapi::HidError),
    /// No keyboard was found for the requested device id.
    #[error("No Wooting keyboard found for device id '{device_id}'")]
    DeviceNotFound {
        /// The device id that was requested.
        device_id: String,
    },
    /// No supported keyboard is connected at all.
    #[error("No Wooting keyboard connected")]
    NoDeviceConnected,
    /// The transport could not open the selected HID interface.
    #[error("Failed to open device '{device_id}': {message}")]
    OpenFailed {
        /// The device id being opened.
        device_id: String,
        /// Details from the transport.
        message: String,
    },
    /// The color subsystem init handshake was not accepted.
    ///
    /// The session is not constructed when this is returned; there is no
    /// partially initialized handle to misuse.
    #[error("Color init handshake failed for device '{device_id}'")]
    InitFailed {
        /// The device id being opened.
        device_id: String,
    },
}

/// Result type alias for keyboard discovery and session construction.
pub type Result<T> = std::result::Result<T, Error>;
