//! HID transport seam.
//!
//! The session talks to hardware through [`HidTransport`], and discovery
//! obtains transports through [`HidBackend`]. Production code uses the
//! `hidapi`-backed implementations; tests swap in the in-memory mock from
//! [`mock`].

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use hidapi::{HidApi, HidDevice};
use log::trace;

use crate::consts;
use crate::device::DeviceCandidate;
use crate::error::{Error, Result};

/// One open HID connection to a keyboard's color-control interface.
///
/// All methods take `&self`; implementations serialize the underlying wire
/// so concurrent callers never interleave bytes of two reports.
pub trait HidTransport: Send + Sync {
    /// Sends `report` (leading reserved/report-id byte included) as a HID
    /// feature report. Returns the number of report bytes accepted.
    fn send_feature(&self, report: &[u8]) -> io::Result<usize>;

    /// Sends `payload` to the device as a single output report with report
    /// id 0. Returns the number of payload bytes accepted.
    fn write_output(&self, payload: &[u8]) -> io::Result<usize>;

    /// Reads one input report into `buf`, waiting at most `timeout_ms`.
    /// Returns 0 on timeout.
    fn read_input(&self, buf: &mut [u8], timeout_ms: i32) -> io::Result<usize>;
}

/// Enumerates HID interfaces and opens them as transports.
pub trait HidBackend {
    /// Lists every HID interface visible to the backend, unfiltered.
    fn enumerate(&self) -> Result<Vec<DeviceCandidate>>;

    /// Opens the interface described by `candidate`.
    fn open(&self, candidate: &DeviceCandidate) -> Result<Arc<dyn HidTransport>>;
}

/// [`HidTransport`] over an open `hidapi` device handle.
///
/// The handle sits behind a mutex: `hidapi` handles are not `Sync`, and the
/// lock doubles as the wire serialization point for feature commands, bank
/// uploads, and the input reader.
pub struct HidApiTransport {
    device: Mutex<HidDevice>,
}

impl HidApiTransport {
    pub fn new(device: HidDevice) -> Self {
        Self {
            device: Mutex::new(device),
        }
    }

    fn device(&self) -> io::Result<MutexGuard<'_, HidDevice>> {
        self.device
            .lock()
            .map_err(|_| io::Error::other("HID handle lock poisoned"))
    }
}

impl HidTransport for HidApiTransport {
    fn send_feature(&self, report: &[u8]) -> io::Result<usize> {
        self.device()?
            .send_feature_report(report)
            .map_err(io::Error::other)?;
        trace!("Sent feature report: {report:02X?}");
        Ok(report.len())
    }

    fn write_output(&self, payload: &[u8]) -> io::Result<usize> {
        let mut buf = Vec::with_capacity(payload.len() + 1);
        buf.push(0); // report id
        buf.extend_from_slice(payload);
        let written = self.device()?.write(&buf).map_err(io::Error::other)?;
        // hidapi counts the report id byte it consumed.
        Ok(written.saturating_sub(1))
    }

    fn read_input(&self, buf: &mut [u8], timeout_ms: i32) -> io::Result<usize> {
        self.device()?
            .read_timeout(buf, timeout_ms)
            .map_err(io::Error::other)
    }
}

/// [`HidBackend`] over a `hidapi` context.
pub struct HidApiBackend {
    api: HidApi,
}

impl HidApiBackend {
    pub fn new() -> Result<Self> {
        Ok(Self {
            api: HidApi::new()?,
        })
    }

    pub fn from_api(api: HidApi) -> Self {
        Self { api }
    }
}

impl HidBackend for HidApiBackend {
    fn enumerate(&self) -> Result<Vec<DeviceCandidate>> {
        Ok(self
            .api
            .device_list()
            .map(|info| DeviceCandidate {
                vid: info.vendor_id(),
                pid: info.product_id(),
                path: info.path().to_owned(),
                interface_number: info.interface_number(),
                serial_number: info.serial_number().map(str::to_string),
                product_string: info.product_string().map(str::to_string),
            })
            .collect())
    }

    fn open(&self, candidate: &DeviceCandidate) -> Result<Arc<dyn HidTransport>> {
        let device =
            self.api
                .open_path(&candidate.path)
                .map_err(|e| Error::OpenFailed {
                    device_id: candidate.device_id(),
                    message: e.to_string(),
                })?;
        Ok(Arc::new(HidApiTransport::new(device)))
    }
}

/// In-memory transport and backend for tests.
///
/// Always compiled (zero runtime cost), hidden from public docs.
#[doc(hidden)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::ffi::CString;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    /// Records every report the session sends and lets tests inject
    /// failures, short writes, and inbound input reports.
    #[derive(Default)]
    pub struct MockTransport {
        /// Feature reports as sent, leading reserved byte included.
        pub features: Mutex<Vec<Vec<u8>>>,
        /// Output report payloads as sent (report id not included).
        pub outputs: Mutex<Vec<Vec<u8>>>,
        /// Fail the next N feature sends with an I/O error.
        pub fail_features: AtomicUsize,
        /// Fail the next N output writes with an I/O error.
        pub fail_outputs: AtomicUsize,
        /// Report the next N output writes one byte short of complete.
        pub short_outputs: AtomicUsize,
        /// Input reports handed to `read_input`, front first.
        pub inbound: Mutex<VecDeque<Vec<u8>>>,
        /// When set, `read_input` errors as if the device was unplugged.
        pub unplugged: AtomicBool,
    }

    impl MockTransport {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn take_one(counter: &AtomicUsize) -> bool {
            counter
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }

        pub fn feature_reports(&self) -> Vec<Vec<u8>> {
            self.features.lock().unwrap().clone()
        }

        pub fn output_reports(&self) -> Vec<Vec<u8>> {
            self.outputs.lock().unwrap().clone()
        }

        pub fn push_input(&self, report: Vec<u8>) {
            self.inbound.lock().unwrap().push_back(report);
        }
    }

    impl HidTransport for MockTransport {
        fn send_feature(&self, report: &[u8]) -> io::Result<usize> {
            if Self::take_one(&self.fail_features) {
                return Err(io::Error::other("injected feature failure"));
            }
            self.features.lock().unwrap().push(report.to_vec());
            Ok(report.len())
        }

        fn write_output(&self, payload: &[u8]) -> io::Result<usize> {
            if Self::take_one(&self.fail_outputs) {
                return Err(io::Error::other("injected output failure"));
            }
            let written = if Self::take_one(&self.short_outputs) {
                payload.len() - 1
            } else {
                payload.len()
            };
            self.outputs.lock().unwrap().push(payload.to_vec());
            Ok(written)
        }

        fn read_input(&self, buf: &mut [u8], timeout_ms: i32) -> io::Result<usize> {
            if self.unplugged.load(Ordering::SeqCst) {
                return Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "mock device unplugged",
                ));
            }
            if let Some(report) = self.inbound.lock().unwrap().pop_front() {
                let n = report.len().min(buf.len());
                buf[..n].copy_from_slice(&report[..n]);
                return Ok(n);
            }
            // Keep the reader thread from spinning; real reads block.
            std::thread::sleep(Duration::from_millis((timeout_ms.clamp(1, 5)) as u64));
            Ok(0)
        }
    }

    /// Backend over a fixed candidate list, each mapped to a shared
    /// [`MockTransport`] that the test keeps a handle on.
    #[derive(Default)]
    pub struct MockBackend {
        devices: Vec<(DeviceCandidate, Arc<MockTransport>)>,
        pub fail_open: AtomicBool,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Adds one candidate interface backed by `transport`.
        pub fn push(&mut self, candidate: DeviceCandidate, transport: Arc<MockTransport>) {
            self.devices.push((candidate, transport));
        }

        /// Convenience: one Wooting One keyboard exposing a single
        /// interface. Returns the backend and its transport.
        pub fn with_keyboard(serial: &str) -> (Self, Arc<MockTransport>) {
            let mut backend = Self::new();
            let transport = MockTransport::new();
            backend.push(Self::candidate(serial, 0), transport.clone());
            (backend, transport)
        }

        /// A plausible Wooting One interface descriptor.
        pub fn candidate(serial: &str, interface_number: i32) -> DeviceCandidate {
            DeviceCandidate {
                vid: consts::WOOTING_VID,
                pid: consts::WOOTING_ONE_PID,
                path: CString::new(format!("mock:{serial}:{interface_number}"))
                    .expect("mock path"),
                interface_number,
                serial_number: Some(serial.to_string()),
                product_string: Some("Wooting one".to_string()),
            }
        }
    }

    impl HidBackend for MockBackend {
        fn enumerate(&self) -> Result<Vec<DeviceCandidate>> {
            Ok(self.devices.iter().map(|(c, _)| c.clone()).collect())
        }

        fn open(&self, candidate: &DeviceCandidate) -> Result<Arc<dyn HidTransport>> {
            if self.fail_open.load(Ordering::SeqCst) {
                return Err(Error::OpenFailed {
                    device_id: candidate.device_id(),
                    message: "injected open failure".to_string(),
                });
            }
            match self.devices.iter().find(|(c, _)| c.path == candidate.path) {
                Some((_, transport)) => Ok(transport.clone()),
                None => Err(Error::DeviceNotFound {
                    device_id: candidate.device_id(),
                }),
            }
        }
    }
}
