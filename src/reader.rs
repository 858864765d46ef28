use std::{
    io::Read,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::Sender,
        Arc,
    },
    thread,
    time::Duration,
};

use serialport::SerialPort;

use crate::protocol::{extract_frame, parse_reading, FrameStep, ScaleReading};

/// Sleep between polls of the port. Bounds CPU usage and stop latency.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Messages handed from the reader thread to the consumer side.
#[derive(Debug)]
pub enum ReaderEvent {
    Reading(ScaleReading),
    /// Malformed frame content; recoverable, the loop keeps reading.
    ParseError(String),
    /// I/O failure; the loop terminates after sending this.
    Fatal(String),
    /// Final message after a cooperative stop.
    Closed,
}

/// Body of the per-connection reader thread.
///
/// Owns the port handle and the byte accumulator for the lifetime of the
/// connection; both are dropped when the loop returns. The stop flag is
/// checked once per iteration, so cancellation lands within one poll
/// interval (plus at most one blocking read).
pub fn run_reader_loop(
    mut port: Box<dyn SerialPort>,
    tx: Sender<ReaderEvent>,
    stop: Arc<AtomicBool>,
) {
    let mut acc: Vec<u8> = Vec::with_capacity(256);
    let mut scratch = [0u8; 256];

    while !stop.load(Ordering::SeqCst) {
        match port.bytes_to_read() {
            Ok(n) if n > 0 => match port.read(&mut scratch) {
                Ok(n) if n > 0 => acc.extend_from_slice(&scratch[..n]),
                Ok(_) => {}
                Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {}
                Err(e) => {
                    let _ = tx.send(ReaderEvent::Fatal(format!("read error: {e}")));
                    return;
                }
            },
            Ok(_) => {}
            Err(e) => {
                let _ = tx.send(ReaderEvent::Fatal(format!("port unavailable: {e}")));
                return;
            }
        }

        while let FrameStep::Frame(frame) = extract_frame(&mut acc) {
            let event = match parse_reading(&frame) {
                Ok(reading) => ReaderEvent::Reading(reading),
                Err(e) => ReaderEvent::ParseError(e.to_string()),
            };
            if tx.send(event).is_err() {
                // consumer gone, nothing left to report to
                return;
            }
        }

        thread::sleep(POLL_INTERVAL);
    }

    let _ = tx.send(ReaderEvent::Closed);
}
