//! Device discovery and session management for Wooting keyboards.

use std::collections::BTreeMap;
use std::ffi::CString;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use log::{debug, trace, warn};

use crate::bank::Bank;
use crate::consts::{self, cmd, report};
use crate::error::{Error, Result};
use crate::transport::{HidBackend, HidTransport};

/// Poll interval for the background input reader.
const READ_TIMEOUT_MS: i32 = 20;

/// One HID interface of a discovered keyboard.
///
/// A single keyboard exposes several interfaces (boot keyboard, media keys,
/// the vendor color-control endpoint) under one stable device id; discovery
/// groups them and [`WootingRgb::open`] picks the control interface.
#[derive(Debug, Clone)]
pub struct DeviceCandidate {
    pub vid: u16,
    pub pid: u16,
    /// Platform-specific path used to open this interface.
    pub path: CString,
    pub interface_number: i32,
    pub serial_number: Option<String>,
    pub product_string: Option<String>,
}

impl DeviceCandidate {
    /// Stable id grouping every interface of one physical keyboard.
    ///
    /// The serial number when the descriptor carries one, otherwise the
    /// platform path (which then forms a single-interface group).
    pub fn device_id(&self) -> String {
        match &self.serial_number {
            Some(serial) if !serial.is_empty() => serial.clone(),
            _ => self.path.to_string_lossy().into_owned(),
        }
    }
}

/// Enumerates supported keyboards, grouped by stable device id.
///
/// Filters the backend's device list to the Wooting vendor id and the
/// supported product ids. Map order (and therefore [`list_all`] order) is
/// deterministic.
pub fn enumerate(backend: &dyn HidBackend) -> Result<BTreeMap<String, Vec<DeviceCandidate>>> {
    let mut groups: BTreeMap<String, Vec<DeviceCandidate>> = BTreeMap::new();
    for candidate in backend.enumerate()? {
        if candidate.vid != consts::WOOTING_VID
            || !consts::SUPPORTED_PIDS.contains(&candidate.pid)
        {
            continue;
        }
        debug!(
            "Found keyboard interface: PID={:04X}, iface={}, id={:?}",
            candidate.pid,
            candidate.interface_number,
            candidate.device_id()
        );
        groups
            .entry(candidate.device_id())
            .or_default()
            .push(candidate);
    }
    Ok(groups)
}

/// Device ids of every connected keyboard.
pub fn list_all(backend: &dyn HidBackend) -> Result<Vec<String>> {
    Ok(enumerate(backend)?.into_keys().collect())
}

/// Picks the color-control interface from one keyboard's candidate group:
/// the interface with the highest number, since the vendor endpoint
/// enumerates after the standard boot keyboard/mouse/media interfaces.
fn control_interface(group: &[DeviceCandidate]) -> Option<&DeviceCandidate> {
    group.iter().max_by_key(|c| c.interface_number)
}

/// Telemetry delivered by the background input reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// An input report arrived; contents are forwarded verbatim.
    Report(Vec<u8>),
    /// The transport failed a read, normally because the keyboard was
    /// unplugged. No further events follow.
    Removed,
}

/// An open session with one keyboard's color subsystem.
///
/// Owns the transport handle and the five color banks for its lifetime.
/// All methods take `&self` and are safe to call from multiple threads;
/// per-bank locks serialize buffer mutation against flushing.
pub struct WootingRgb {
    pub(crate) transport: Arc<dyn HidTransport>,
    pub(crate) banks: [Mutex<Bank>; consts::BANK_COUNT],
    pub(crate) auto_update: AtomicBool,
    device_id: String,
    events: Mutex<Receiver<DeviceEvent>>,
    reader_stop: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl WootingRgb {
    /// Opens the keyboard with the given device id.
    ///
    /// Fails with [`Error::DeviceNotFound`] for an unknown id, and with an
    /// open/init error if the transport or the color handshake rejects the
    /// device. No session exists on failure.
    pub fn open(backend: &dyn HidBackend, device_id: &str) -> Result<Self> {
        let groups = enumerate(backend)?;
        let not_found = || Error::DeviceNotFound {
            device_id: device_id.to_string(),
        };
        let group = groups.get(device_id).ok_or_else(not_found)?;
        let candidate = control_interface(group).ok_or_else(not_found)?;
        debug!(
            "Opening '{device_id}' via interface {}",
            candidate.interface_number
        );
        let transport = backend.open(candidate)?;
        Self::from_transport(transport, device_id.to_string())
    }

    /// Opens the first keyboard found, in [`list_all`] order.
    pub fn open_first(backend: &dyn HidBackend) -> Result<Self> {
        let ids = list_all(backend)?;
        let first = ids.first().ok_or(Error::NoDeviceConnected)?;
        Self::open(backend, first)
    }

    /// Builds a session over an already-open transport, performing the
    /// color-subsystem init handshake.
    pub fn from_transport(transport: Arc<dyn HidTransport>, device_id: String) -> Result<Self> {
        if !send_command(transport.as_ref(), cmd::COLOR_INIT, 0, 0, 0, 0) {
            return Err(Error::InitFailed { device_id });
        }
        debug!("Color subsystem initialized for '{device_id}'");

        let (tx, rx) = mpsc::channel();
        let reader_stop = Arc::new(AtomicBool::new(false));
        let reader = spawn_reader(transport.clone(), reader_stop.clone(), tx);

        Ok(Self {
            banks: consts::BANK_ADDRESSES.map(|(slave, offset)| Mutex::new(Bank::new(slave, offset))),
            transport,
            auto_update: AtomicBool::new(true),
            device_id,
            events: Mutex::new(rx),
            reader_stop,
            reader: Some(reader),
        })
    }

    /// The stable id this session was opened with.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Takes the next pending [`DeviceEvent`], if any.
    pub fn try_event(&self) -> Option<DeviceEvent> {
        self.events.lock().ok().and_then(|rx| rx.try_recv().ok())
    }

    /// Releases the keyboard.
    ///
    /// Buffered colors stay on the device; callers that want it back to its
    /// default lighting should call [`WootingRgb::reset_rgb`] first.
    pub fn close(self) {
        // Dropping stops the input reader and releases the transport handle.
    }
}

impl Drop for WootingRgb {
    fn drop(&mut self) {
        self.reader_stop.store(true, Ordering::Release);
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
    }
}

fn spawn_reader(
    transport: Arc<dyn HidTransport>,
    stop: Arc<AtomicBool>,
    tx: Sender<DeviceEvent>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut buf = [0u8; 64];
        while !stop.load(Ordering::Acquire) {
            match transport.read_input(&mut buf, READ_TIMEOUT_MS) {
                Ok(0) => {}
                Ok(n) => {
                    trace!("Input report ({n} bytes): {:02X?}", &buf[..n]);
                    let _ = tx.send(DeviceEvent::Report(buf[..n].to_vec()));
                }
                Err(e) => {
                    debug!("Input reader stopping: {e}");
                    let _ = tx.send(DeviceEvent::Removed);
                    break;
                }
            }
        }
    })
}

/// Sends one 8-byte feature command. The report is built on the stack per
/// call; wire serialization comes from the transport itself.
///
/// Wire layout: reserved byte, magic word, command id, then the four
/// parameters in reversed order.
pub(crate) fn send_command(
    transport: &dyn HidTransport,
    command: u8,
    p0: u8,
    p1: u8,
    p2: u8,
    p3: u8,
) -> bool {
    let report_buf: [u8; report::COMMAND_SIZE] = [
        0,
        report::MAGIC[0],
        report::MAGIC[1],
        command,
        p3,
        p2,
        p1,
        p0,
    ];
    match transport.send_feature(&report_buf) {
        Ok(n) if n == report::COMMAND_SIZE => true,
        Ok(n) => {
            warn!("Short feature write for command {command}: {n} bytes accepted");
            false
        }
        Err(e) => {
            warn!("Feature command {command} failed: {e}");
            false
        }
    }
}

/// Locks a bank, recovering the guard if a prior holder panicked; bank
/// state is a plain byte buffer and stays structurally valid.
pub(crate) fn lock_bank(bank: &Mutex<Bank>) -> MutexGuard<'_, Bank> {
    bank.lock().unwrap_or_else(PoisonError::into_inner)
}
