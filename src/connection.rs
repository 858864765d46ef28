use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, TryRecvError},
        Arc, Mutex,
    },
    thread,
    time::{Duration, Instant},
};

use serde::Serialize;
use serialport::{DataBits, Parity, StopBits};
use tauri::{AppHandle, Emitter};

use crate::error::ScaleError;
use crate::events::{self, StatusMessage};
use crate::protocol::ScaleReading;
use crate::reader::{run_reader_loop, ReaderEvent};

// Link parameters fixed by the scale's protocol (2400 8E1).
pub const BAUD_RATE: u32 = 2_400;
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

const JOIN_TIMEOUT: Duration = Duration::from_secs(1);
const JOIN_POLL: Duration = Duration::from_millis(25);
const DRAIN_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl ConnectionState {
    fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnecting => "disconnecting",
        }
    }
}

struct ReaderHandle {
    port_name: String,
    stop: Arc<AtomicBool>,
    join: thread::JoinHandle<()>,
}

struct Inner {
    state: ConnectionState,
    reader: Option<ReaderHandle>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            reader: None,
        }
    }
}

/// Connect/disconnect lifecycle. Guarantees at most one reader thread at a
/// time and that disconnect never leaves an orphaned thread holding the
/// port handle.
#[derive(Default)]
pub struct ConnectionController {
    inner: Mutex<Inner>,
}

impl ConnectionController {
    pub fn state(&self) -> ConnectionState {
        self.inner.lock().unwrap().state
    }

    /// Opens the port with the fixed link parameters and spawns the reader.
    /// Open failures surface here, before any thread exists, and leave the
    /// controller `Disconnected`.
    pub fn connect(&self, port_name: &str) -> Result<Receiver<ReaderEvent>, ScaleError> {
        if port_name.is_empty() {
            return Err(ScaleError::DeviceOpen("no port selected".into()));
        }

        let mut inner = self.inner.lock().unwrap();
        if inner.state != ConnectionState::Disconnected {
            return Err(ScaleError::DeviceOpen(format!(
                "already {}",
                inner.state.as_str()
            )));
        }
        inner.state = ConnectionState::Connecting;

        let port = match serialport::new(port_name, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::Even)
            .stop_bits(StopBits::One)
            .timeout(READ_TIMEOUT)
            .open()
        {
            Ok(p) => p,
            Err(e) => {
                inner.state = ConnectionState::Disconnected;
                return Err(ScaleError::DeviceOpen(e.to_string()));
            }
        };

        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let reader_stop = stop.clone();
        let join = thread::spawn(move || run_reader_loop(port, tx, reader_stop));

        log::info!("connected to {port_name} @ {BAUD_RATE} baud (8E1)");
        inner.reader = Some(ReaderHandle {
            port_name: port_name.to_string(),
            stop,
            join,
        });
        inner.state = ConnectionState::Connected;
        Ok(rx)
    }

    /// Idempotent: a no-op when already disconnected. Signals the reader to
    /// stop, waits up to `JOIN_TIMEOUT`, then transitions regardless — the
    /// reader owns the port handle and drops it the moment it observes the
    /// stop flag, so a late join never leaks the device.
    pub fn disconnect(&self) -> Result<(), ScaleError> {
        let handle = {
            let mut inner = self.inner.lock().unwrap();
            match inner.state {
                ConnectionState::Connected => {}
                // Already idle, or another disconnect is in flight.
                _ => return Ok(()),
            }
            inner.state = ConnectionState::Disconnecting;
            inner.reader.take()
        };

        if let Some(handle) = handle {
            handle.stop.store(true, Ordering::SeqCst);
            let deadline = Instant::now() + JOIN_TIMEOUT;
            while !handle.join.is_finished() && Instant::now() < deadline {
                thread::sleep(JOIN_POLL);
            }
            if handle.join.is_finished() {
                let _ = handle.join.join();
            } else {
                log::warn!(
                    "reader for {} did not stop within {:?}, detaching",
                    handle.port_name,
                    JOIN_TIMEOUT
                );
            }
            log::info!("disconnected from {}", handle.port_name);
        }

        self.inner.lock().unwrap().state = ConnectionState::Disconnected;
        Ok(())
    }
}

/// Consumer side of the reading channel. Ticks every `DRAIN_INTERVAL`,
/// drains everything currently queued in producer order, keeps the shared
/// last-reading cell current, and forwards events to the webview. A fatal
/// reader error tears the connection down from here.
pub fn spawn_drain_task(
    app: AppHandle,
    controller: Arc<ConnectionController>,
    last_reading: Arc<Mutex<Option<ScaleReading>>>,
    rx: Receiver<ReaderEvent>,
) {
    tauri::async_runtime::spawn(async move {
        let mut ticker = tokio::time::interval(DRAIN_INTERVAL);
        loop {
            ticker.tick().await;
            loop {
                match rx.try_recv() {
                    Ok(ReaderEvent::Reading(reading)) => {
                        *last_reading.lock().unwrap() = Some(reading.clone());
                        let _ = app.emit(events::READING, reading);
                    }
                    Ok(ReaderEvent::ParseError(msg)) => {
                        log::warn!("frame parse error: {msg}");
                        let _ = app.emit(
                            events::STATUS,
                            StatusMessage::error(format!("Frame error: {msg}")),
                        );
                    }
                    Ok(ReaderEvent::Fatal(msg)) => {
                        log::error!("serial failure: {msg}");
                        let _ = controller.disconnect();
                        let _ = app.emit(
                            events::STATUS,
                            StatusMessage::error(format!("Connection lost: {msg}")),
                        );
                        let _ = app.emit(events::STATE, controller.state());
                        return;
                    }
                    Ok(ReaderEvent::Closed) => return,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnect_twice_is_a_noop_both_times() {
        let controller = ConnectionController::default();
        assert!(controller.disconnect().is_ok());
        assert!(controller.disconnect().is_ok());
        assert_eq!(controller.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn connect_rejects_an_empty_port_name() {
        let controller = ConnectionController::default();
        let err = controller.connect("").unwrap_err();
        assert!(matches!(err, ScaleError::DeviceOpen(_)));
        assert_eq!(controller.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn failed_open_leaves_the_controller_disconnected() {
        let controller = ConnectionController::default();
        let result = controller.connect("/dev/nonexistent-scale-port");
        assert!(matches!(result, Err(ScaleError::DeviceOpen(_))));
        assert_eq!(controller.state(), ConnectionState::Disconnected);
        // And a later disconnect is still a clean no-op.
        assert!(controller.disconnect().is_ok());
    }
}
