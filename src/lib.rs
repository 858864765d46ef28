use std::sync::{Arc, Mutex};

use tauri::{AppHandle, Emitter, Manager, State};
use tauri_plugin_global_shortcut::ShortcutState;

use connection::{spawn_drain_task, ConnectionController, ConnectionState};
use format::{format_weight, DecimalSeparator};
use hotkey::Hotkey;
use input::KeySequence;
use protocol::ScaleReading;
use settings::{AppSettings, PostInputAction, SettingsStore};

mod connection;
mod error;
mod events;
mod format;
mod hotkey;
mod input;
mod protocol;
mod reader;
mod settings;

pub(crate) struct AppState {
    pub(crate) controller: Arc<ConnectionController>,
    pub(crate) last_reading: Arc<Mutex<Option<ScaleReading>>>,
    pub(crate) settings: SettingsStore,
}

/// Last reading plus its display text under the active separator.
#[derive(serde::Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReadingView {
    pub weight: String,
    pub display: String,
    pub units: Option<String>,
    pub stable: bool,
}

#[tauri::command]
fn list_ports() -> Vec<String> {
    serialport::available_ports()
        .map(|v| v.into_iter().map(|p| p.port_name).collect())
        .unwrap_or_default()
}

#[tauri::command]
fn connect(app: AppHandle, state: State<AppState>, port_name: String) -> Result<(), String> {
    let rx = state
        .controller
        .connect(&port_name)
        .map_err(|e| e.to_string())?;
    spawn_drain_task(
        app.clone(),
        state.controller.clone(),
        state.last_reading.clone(),
        rx,
    );
    let _ = app.emit(events::STATE, state.controller.state());
    let _ = app.emit(
        events::STATUS,
        events::StatusMessage::info(format!("Connected to {port_name}")),
    );
    Ok(())
}

#[tauri::command]
fn disconnect(app: AppHandle, state: State<AppState>) -> Result<(), String> {
    state.controller.disconnect().map_err(|e| e.to_string())?;
    let _ = app.emit(events::STATE, state.controller.state());
    Ok(())
}

#[tauri::command]
fn connection_state(state: State<AppState>) -> ConnectionState {
    state.controller.state()
}

#[tauri::command]
fn get_settings(state: State<AppState>) -> AppSettings {
    state.settings.snapshot()
}

#[tauri::command]
fn set_decimal_separator(state: State<AppState>, separator: DecimalSeparator) {
    state.settings.set_separator(separator);
}

#[tauri::command]
fn set_after_action(state: State<AppState>, action: PostInputAction) {
    state.settings.set_after_action(action);
}

#[tauri::command]
fn set_hotkey(app: AppHandle, state: State<AppState>, hotkey: Hotkey) -> Result<(), String> {
    let old = state.settings.snapshot().hotkey;
    hotkey::rebind(&app, old, hotkey)?;
    state.settings.set_hotkey(hotkey);
    let _ = app.emit(
        events::STATUS,
        events::StatusMessage::info(format!("Hotkey changed to {}", hotkey.label())),
    );
    Ok(())
}

#[tauri::command]
fn current_reading(state: State<AppState>) -> Option<ReadingView> {
    let settings = state.settings.snapshot();
    state
        .last_reading
        .lock()
        .unwrap()
        .as_ref()
        .map(|r| ReadingView {
            weight: r.weight.clone(),
            display: format_weight(&r.weight, settings.separator),
            units: r.units.clone(),
            stable: r.stable,
        })
}

/// Manual trigger for the same path the global hotkey takes.
#[tauri::command]
fn type_weight(app: AppHandle) -> Result<String, String> {
    input::inject_current_weight(&app).map_err(|e| e.to_string())
}

/// Dry run: what would be typed right now, without emitting anything.
#[tauri::command]
fn preview_input(state: State<AppState>) -> Result<KeySequence, String> {
    let settings = state.settings.snapshot();
    let reading = state.last_reading.lock().unwrap().clone();
    input::build_key_sequence(reading.as_ref(), &settings).map_err(|e| e.to_string())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("scale-bridge starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(|app, _shortcut, event| {
                    if event.state() == ShortcutState::Pressed {
                        hotkey::handle_press(app);
                    }
                })
                .build(),
        )
        .manage(AppState {
            controller: Arc::new(ConnectionController::default()),
            last_reading: Arc::new(Mutex::new(None)),
            settings: SettingsStore::default(),
        })
        .setup(|app| {
            let default_hotkey = app.state::<AppState>().settings.snapshot().hotkey;
            hotkey::register(app.handle(), default_hotkey)?;
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // connection lifecycle
            list_ports,
            connect,
            disconnect,
            connection_state,
            // settings
            get_settings,
            set_decimal_separator,
            set_after_action,
            set_hotkey,
            // readings & injection
            current_reading,
            type_weight,
            preview_input
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
