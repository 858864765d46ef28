use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::format::DecimalSeparator;
use crate::hotkey::Hotkey;

/// Keystroke automatically sent after the weight value is typed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostInputAction {
    None,
    Tab,
    Enter,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub separator: DecimalSeparator,
    pub after_action: PostInputAction,
    pub hotkey: Hotkey,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            separator: DecimalSeparator::Comma,
            after_action: PostInputAction::None,
            hotkey: Hotkey::F2,
        }
    }
}

/// In-memory settings store. Nothing is persisted across runs; mutation only
/// happens through the settings commands.
pub struct SettingsStore {
    data: RwLock<AppSettings>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self {
            data: RwLock::new(AppSettings::default()),
        }
    }
}

impl SettingsStore {
    pub fn snapshot(&self) -> AppSettings {
        *self.data.read().unwrap()
    }

    pub fn set_separator(&self, separator: DecimalSeparator) {
        self.data.write().unwrap().separator = separator;
    }

    pub fn set_after_action(&self, action: PostInputAction) {
        self.data.write().unwrap().after_action = action;
    }

    pub fn set_hotkey(&self, hotkey: Hotkey) {
        self.data.write().unwrap().hotkey = hotkey;
    }
}
