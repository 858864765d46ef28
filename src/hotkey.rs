use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Emitter};
use tauri_plugin_global_shortcut::{Code, GlobalShortcutExt, Shortcut};

use crate::events::{self, StatusMessage};

/// The enumerable set of keys the bridge can bind globally.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hotkey {
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

impl Hotkey {
    pub fn code(self) -> Code {
        match self {
            Hotkey::F1 => Code::F1,
            Hotkey::F2 => Code::F2,
            Hotkey::F3 => Code::F3,
            Hotkey::F4 => Code::F4,
            Hotkey::F5 => Code::F5,
            Hotkey::F6 => Code::F6,
            Hotkey::F7 => Code::F7,
            Hotkey::F8 => Code::F8,
            Hotkey::F9 => Code::F9,
            Hotkey::F10 => Code::F10,
            Hotkey::F11 => Code::F11,
            Hotkey::F12 => Code::F12,
        }
    }

    pub fn shortcut(self) -> Shortcut {
        Shortcut::new(None, self.code())
    }

    pub fn label(self) -> &'static str {
        match self {
            Hotkey::F1 => "F1",
            Hotkey::F2 => "F2",
            Hotkey::F3 => "F3",
            Hotkey::F4 => "F4",
            Hotkey::F5 => "F5",
            Hotkey::F6 => "F6",
            Hotkey::F7 => "F7",
            Hotkey::F8 => "F8",
            Hotkey::F9 => "F9",
            Hotkey::F10 => "F10",
            Hotkey::F11 => "F11",
            Hotkey::F12 => "F12",
        }
    }
}

pub fn register(app: &AppHandle, key: Hotkey) -> Result<(), String> {
    app.global_shortcut()
        .register(key.shortcut())
        .map_err(|e| e.to_string())?;
    log::info!("global hotkey bound: {}", key.label());
    Ok(())
}

/// Swaps the active binding. The old key is released first so only one
/// global shortcut is ever held by the app.
pub fn rebind(app: &AppHandle, old: Hotkey, new: Hotkey) -> Result<(), String> {
    let shortcuts = app.global_shortcut();
    if old != new && shortcuts.is_registered(old.shortcut()) {
        shortcuts
            .unregister(old.shortcut())
            .map_err(|e| e.to_string())?;
    }
    if !shortcuts.is_registered(new.shortcut()) {
        shortcuts
            .register(new.shortcut())
            .map_err(|e| e.to_string())?;
    }
    log::info!("global hotkey rebound: {} -> {}", old.label(), new.label());
    Ok(())
}

/// Press path shared with the `type_weight` command: format the last known
/// reading and type it into whatever window has focus.
pub fn handle_press(app: &AppHandle) {
    match crate::input::inject_current_weight(app) {
        Ok(description) => {
            let _ = app.emit(events::STATUS, StatusMessage::info(description));
        }
        Err(e) => {
            log::warn!("hotkey injection failed: {e}");
            let _ = app.emit(events::STATUS, StatusMessage::error(e.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_key_names() {
        assert_eq!(serde_json::to_string(&Hotkey::F2).unwrap(), "\"F2\"");
        let parsed: Hotkey = serde_json::from_str("\"F11\"").unwrap();
        assert_eq!(parsed, Hotkey::F11);
    }

    #[test]
    fn label_round_trips_every_key() {
        let keys = [
            Hotkey::F1,
            Hotkey::F2,
            Hotkey::F3,
            Hotkey::F4,
            Hotkey::F5,
            Hotkey::F6,
            Hotkey::F7,
            Hotkey::F8,
            Hotkey::F9,
            Hotkey::F10,
            Hotkey::F11,
            Hotkey::F12,
        ];
        for key in keys {
            let parsed: Hotkey = serde_json::from_str(&format!("\"{}\"", key.label())).unwrap();
            assert_eq!(parsed, key);
        }
    }
}
