//! Structured logging for Emma
//!
//! Events go through `tracing` to stderr and to a daily file in the
//! configured log directory. Every event carries a `category`:
//! - ROUTING: crisis screen and emotion classification
//! - AGENT: reply generation
//! - CONVERSATION: session lifecycle
//! - MEMORY: conversation and mood records
//! - ERROR: failures, including recovered ones
//!
//! Message text is never logged, only labels, categories and lengths.

use chrono::Utc;
use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "emma.log";
const LOG_RETENTION_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    Routing,
    Agent,
    Conversation,
    Memory,
    Error,
}

impl LogCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Routing => "ROUTING",
            LogCategory::Agent => "AGENT",
            LogCategory::Conversation => "CONVERSATION",
            LogCategory::Memory => "MEMORY",
            LogCategory::Error => "ERROR",
        }
    }
}

/// Keeps the file writer flushing for the life of the process.
static FILE_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// Install the global subscriber. Safe to call more than once; later calls
/// are no-ops.
pub fn init_logging(log_dir: &Path) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut guard = FILE_GUARD.lock().map_err(|_| "log guard poisoned")?;
    if guard.is_some() {
        return Ok(());
    }

    fs::create_dir_all(log_dir)?;
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (file_writer, file_guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("emma_lib=info,emma=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .try_init()?;

    *guard = Some(file_guard);
    log_conversation(None, "Emma logging initialized");
    Ok(())
}

/// Shorten a session id for log lines.
pub(crate) fn short_id(id: &str) -> &str {
    &id[..8.min(id.len())]
}

pub fn log(category: LogCategory, session_id: Option<&str>, message: &str) {
    let session = session_id.map(short_id).unwrap_or("-");
    match category {
        LogCategory::Error => {
            tracing::warn!(category = category.as_str(), session, "{}", message)
        }
        LogCategory::Routing => {
            tracing::debug!(category = category.as_str(), session, "{}", message)
        }
        _ => tracing::info!(category = category.as_str(), session, "{}", message),
    }
}

pub fn log_routing(session_id: Option<&str>, message: &str) {
    log(LogCategory::Routing, session_id, message);
}

pub fn log_agent(session_id: Option<&str>, message: &str) {
    log(LogCategory::Agent, session_id, message);
}

pub fn log_conversation(session_id: Option<&str>, message: &str) {
    log(LogCategory::Conversation, session_id, message);
}

pub fn log_memory(session_id: Option<&str>, message: &str) {
    log(LogCategory::Memory, session_id, message);
}

pub fn log_error(session_id: Option<&str>, message: &str) {
    log(LogCategory::Error, session_id, message);
}

/// Delete rolled log files older than a week. Returns how many went.
pub fn cleanup_old_logs(log_dir: &Path) -> std::io::Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let cutoff = Utc::now() - chrono::Duration::days(LOG_RETENTION_DAYS);
    let mut deleted = 0;

    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX));
        if !is_log {
            continue;
        }

        let modified: chrono::DateTime<Utc> = match entry.metadata().and_then(|m| m.modified()) {
            Ok(time) => time.into(),
            Err(_) => continue,
        };
        if modified < cutoff && fs::remove_file(&path).is_ok() {
            deleted += 1;
        }
    }

    Ok(deleted)
}
