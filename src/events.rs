use serde::Serialize;

// Event names the frontend listens on.
pub const READING: &str = "scale/reading";
pub const STATUS: &str = "scale/status";
pub const STATE: &str = "scale/state";

/// How long the frontend keeps a transient status message on screen.
pub const STATUS_TTL_MS: u64 = 5_000;

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatusMessage {
    pub message: String,
    pub is_error: bool,
    pub ttl_ms: u64,
}

impl StatusMessage {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
            ttl_ms: STATUS_TTL_MS,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
            ttl_ms: STATUS_TTL_MS,
        }
    }
}
