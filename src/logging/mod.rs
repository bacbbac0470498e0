//! Logging taxonomy.
//!
//! # Data Flow
//! ```text
//! Session::log*(log_type, level, ...)
//!     → LogFilter (allowed types ∩ minimum level)
//!     → LogEntry
//!     → LoggingHook::log (default: tracing event)
//! ```
//!
//! # Design Decisions
//! - Categories are bit flags so one setting can enable a whole preset
//! - The zero value (`AppRoot`) bypasses category filtering
//! - Descriptions arrive pre-formatted; the sink never templates them

pub mod log_level;
pub mod log_type;

pub use log_level::LogLevel;
pub use log_type::LogType;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One structured log record handed to the logging hook.
#[derive(Debug, Clone, Copy)]
pub struct LogEntry<'a> {
    pub session_id: Uuid,
    pub session_name: &'a str,
    pub log_type: LogType,
    pub log_level: LogLevel,
    pub category: &'a str,
    pub subcategory: &'a str,
    pub description: &'a str,
}

/// Which entries reach the logging hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    pub allowed_log_type: LogType,
    pub allowed_log_level: LogLevel,
}

impl LogFilter {
    pub fn allows(&self, log_type: LogType, log_level: LogLevel) -> bool {
        log_level >= self.allowed_log_level && log_type.is_enabled_in(self.allowed_log_type)
    }
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            allowed_log_type: LogType::GENERAL_LOGGING,
            allowed_log_level: LogLevel::Info,
        }
    }
}

/// Default sink: forward the entry as a `tracing` event.
pub fn emit_tracing_event(entry: &LogEntry<'_>) {
    let log_type = entry.log_type.to_string();
    match entry.log_level {
        LogLevel::Debug => tracing::debug!(
            session_id = %entry.session_id,
            session_name = entry.session_name,
            log_type = %log_type,
            category = entry.category,
            subcategory = entry.subcategory,
            "{}",
            entry.description
        ),
        LogLevel::Info => tracing::info!(
            session_id = %entry.session_id,
            session_name = entry.session_name,
            log_type = %log_type,
            category = entry.category,
            subcategory = entry.subcategory,
            "{}",
            entry.description
        ),
        LogLevel::Warn => tracing::warn!(
            session_id = %entry.session_id,
            session_name = entry.session_name,
            log_type = %log_type,
            category = entry.category,
            subcategory = entry.subcategory,
            "{}",
            entry.description
        ),
        LogLevel::Error | LogLevel::Fatal => tracing::error!(
            session_id = %entry.session_id,
            session_name = entry.session_name,
            log_type = %log_type,
            level_name = entry.log_level.as_str(),
            category = entry.category,
            subcategory = entry.subcategory,
            "{}",
            entry.description
        ),
    }
}
