use enigo::{Direction, Enigo, Key, Keyboard, Settings as EnigoSettings};
use serde::Serialize;
use tauri::{AppHandle, Manager};

use crate::error::ScaleError;
use crate::format::format_weight;
use crate::protocol::ScaleReading;
use crate::settings::{AppSettings, PostInputAction};

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostKey {
    Tab,
    Enter,
}

/// Exact key sequence to emit: the formatted weight text plus an optional
/// trailing key. Building it is pure, which is what backs the dry-run
/// "test input" command.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KeySequence {
    pub text: String,
    pub follow_up: Option<PostKey>,
}

pub fn build_key_sequence(
    reading: Option<&ScaleReading>,
    settings: &AppSettings,
) -> Result<KeySequence, ScaleError> {
    let reading = reading.ok_or(ScaleError::NoData)?;
    let text = format_weight(&reading.weight, settings.separator);
    let follow_up = match settings.after_action {
        PostInputAction::None => None,
        PostInputAction::Tab => Some(PostKey::Tab),
        PostInputAction::Enter => Some(PostKey::Enter),
    };
    Ok(KeySequence { text, follow_up })
}

/// Narrow seam over the OS injection mechanism so the dispatch path can run
/// against a recording sink in tests.
pub trait KeystrokeSink {
    fn emit_text(&mut self, text: &str) -> Result<(), ScaleError>;
    fn emit_key(&mut self, key: PostKey) -> Result<(), ScaleError>;
}

pub fn dispatch<S: KeystrokeSink>(seq: &KeySequence, sink: &mut S) -> Result<(), ScaleError> {
    sink.emit_text(&seq.text)?;
    if let Some(key) = seq.follow_up {
        sink.emit_key(key)?;
    }
    Ok(())
}

pub fn describe(seq: &KeySequence) -> String {
    match seq.follow_up {
        Some(PostKey::Tab) => format!("Typed \"{}\", then Tab", seq.text),
        Some(PostKey::Enter) => format!("Typed \"{}\", then Enter", seq.text),
        None => format!("Typed \"{}\"", seq.text),
    }
}

/// Production sink targeting whatever window currently has OS input focus.
pub struct EnigoSink {
    enigo: Enigo,
}

impl EnigoSink {
    pub fn new() -> Result<Self, ScaleError> {
        let enigo = Enigo::new(&EnigoSettings::default())
            .map_err(|e| ScaleError::Injection(e.to_string()))?;
        Ok(Self { enigo })
    }
}

impl KeystrokeSink for EnigoSink {
    fn emit_text(&mut self, text: &str) -> Result<(), ScaleError> {
        self.enigo
            .text(text)
            .map_err(|e| ScaleError::Injection(e.to_string()))
    }

    fn emit_key(&mut self, key: PostKey) -> Result<(), ScaleError> {
        let key = match key {
            PostKey::Tab => Key::Tab,
            PostKey::Enter => Key::Return,
        };
        self.enigo
            .key(key, Direction::Click)
            .map_err(|e| ScaleError::Injection(e.to_string()))
    }
}

/// Full hotkey path: last reading + current settings -> keystrokes into the
/// focused window. Returns the status-line description on success.
pub fn inject_current_weight(app: &AppHandle) -> Result<String, ScaleError> {
    let state = app.state::<crate::AppState>();
    let settings = state.settings.snapshot();
    let reading = state.last_reading.lock().unwrap().clone();

    let seq = build_key_sequence(reading.as_ref(), &settings)?;
    let mut sink = EnigoSink::new()?;
    dispatch(&seq, &mut sink)?;
    Ok(describe(&seq))
}
