//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex};

use crate::app::AppState;
use crate::config::WebcallConfig;
use crate::customization::{BootstrapHooks, HandlerHooks, HostingHooks, LoggingHook, WebcallHooks};
use crate::logging::{LogEntry, LogFilter, LogLevel, LogType};
use crate::webcall::WebcallClients;

#[derive(Debug, Clone)]
pub(crate) struct RecordedEntry {
    pub session_name: String,
    pub log_type: LogType,
    pub log_level: LogLevel,
    pub category: String,
    pub subcategory: String,
    pub description: String,
}

/// Keeps every entry that reached the logging hook.
#[derive(Debug, Default)]
pub(crate) struct RecordingCustomization {
    entries: Mutex<Vec<RecordedEntry>>,
}

impl RecordingCustomization {
    pub fn entries(&self) -> Vec<RecordedEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl LoggingHook for RecordingCustomization {
    fn log(&self, entry: &LogEntry<'_>) {
        self.entries.lock().unwrap().push(RecordedEntry {
            session_name: entry.session_name.to_string(),
            log_type: entry.log_type,
            log_level: entry.log_level,
            category: entry.category.to_string(),
            subcategory: entry.subcategory.to_string(),
            description: entry.description.to_string(),
        });
    }
}

impl BootstrapHooks for RecordingCustomization {}
impl HostingHooks for RecordingCustomization {}
impl HandlerHooks for RecordingCustomization {}
impl WebcallHooks for RecordingCustomization {}

pub(crate) fn recording_state(
    allowed_log_type: LogType,
    allowed_log_level: LogLevel,
) -> (AppState, Arc<RecordingCustomization>) {
    let recorder = Arc::new(RecordingCustomization::default());
    let clients = WebcallClients::new(&WebcallConfig::default(), recorder.as_ref()).unwrap();
    let state = AppState::new(
        recorder.clone(),
        Arc::new(clients),
        LogFilter {
            allowed_log_type,
            allowed_log_level,
        },
    );
    (state, recorder)
}
