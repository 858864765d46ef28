use thiserror::Error;

/// Unified error type for scale operations.
///
/// Fatal variants (`DeviceIo`) tear the connection down before they surface;
/// everything else is reported as a transient status message and leaves the
/// connection running. Commands flatten these to `String` at the boundary.
#[derive(Error, Debug, Clone)]
pub enum ScaleError {
    /// Port could not be opened (busy, missing, permission denied).
    #[error("failed to open port: {0}")]
    DeviceOpen(String),

    /// Read failure mid-stream; fatal to the current connection.
    #[error("serial I/O error: {0}")]
    DeviceIo(String),

    /// Malformed frame content; the reader keeps going.
    #[error("malformed frame: {0}")]
    FrameParse(String),

    /// Hotkey pressed or test invoked before any reading arrived.
    #[error("no weight received from the scale yet")]
    NoData,

    /// Synthetic keystroke emission failed.
    #[error("keystroke injection failed: {0}")]
    Injection(String),
}
