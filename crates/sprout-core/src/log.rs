use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{
    collections::VecDeque,
    sync::{Mutex, OnceLock},
};

/// Entries retained in the in-process log buffer before the oldest are dropped.
pub const LOG_CAPACITY: usize = 1024;

/// Setting this variable mirrors every entry to stderr.
pub const LOG_ENV_VAR: &str = "SPROUT_LOG";

static LOG: Mutex<VecDeque<LogEntry>> = Mutex::new(VecDeque::new());

///
/// Level
///

#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Display, Serialize, Deserialize,
)]
pub enum Level {
    Debug, // least severe
    Info,
    Ok,
    Warn,
    Error, // most severe
}

///
/// Topic
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[remain::sorted]
pub enum Topic {
    Bootstrap,
    Config,
    Identity,
    Read,
    Seed,
    SelfHeal,
    Store,
    Tier,
}

///
/// LogEntry
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LogEntry {
    pub crate_name: String,
    pub topic: Option<String>,
    pub level: Level,
    pub message: String,
}

#[macro_export]
macro_rules! log {
    // =========================================
    // (1) With topic (normal + trailing comma)
    // =========================================
    ($topic:expr, $level:ident, $fmt:expr $(, $arg:expr)* $(,)?) => {{
        $crate::log!(@inner Some(&$topic.to_string()), $crate::log::Level::$level, $fmt $(, $arg)*);
    }};

    // =========================================
    // (2) No topic (normal + trailing comma)
    // =========================================
    ($level:ident, $fmt:expr $(, $arg:expr)* $(,)?) => {{
        $crate::log!(@inner None::<&str>, $crate::log::Level::$level, $fmt $(, $arg)*);
    }};

    // =========================================
    // INTERNAL
    // =========================================
    (@inner $topic:expr, $level:expr, $fmt:expr $(, $arg:expr)*) => {{
        let level = $level;
        let topic_opt: Option<&str> = $topic;
        let message = format!($fmt $(, $arg)*);

        let crate_name = env!("CARGO_PKG_NAME");
        $crate::log::__append(crate_name, topic_opt, level, &message);

        if $crate::log::__echo_enabled() {
            let final_msg = if let Some(t) = topic_opt {
                format!("[{t}] {message}")
            } else {
                message
            };

            let (color, reset) = match level {
                $crate::log::Level::Ok    => ("\x1b[32m", "\x1b[0m"),
                $crate::log::Level::Info  => ("\x1b[34m", "\x1b[0m"),
                $crate::log::Level::Warn  => ("\x1b[33m", "\x1b[0m"),
                $crate::log::Level::Error => ("\x1b[31m", "\x1b[0m"),
                $crate::log::Level::Debug => ("", ""),
            };

            let label = format!("{color}{:^5}{reset}", level.to_string().to_uppercase());
            eprintln!("{label}|{crate_name:^14}| {final_msg}");
        }
    }};
}

/// Snapshot of the buffered entries, oldest first.
#[must_use]
pub fn entries() -> Vec<LogEntry> {
    with_buffer(|buf| buf.iter().cloned().collect())
}

/// Buffered entries at or above `level`.
#[must_use]
pub fn entries_at_least(level: Level) -> Vec<LogEntry> {
    with_buffer(|buf| buf.iter().filter(|e| e.level >= level).cloned().collect())
}

pub fn clear() {
    with_buffer(VecDeque::clear);
}

///
/// Helpers
///

#[doc(hidden)]
pub fn __append(crate_name: &str, topic: Option<&str>, level: Level, message: &str) {
    let entry = LogEntry {
        crate_name: crate_name.to_string(),
        topic: topic.map(str::to_string),
        level,
        message: message.to_string(),
    };

    with_buffer(|buf| {
        if buf.len() == LOG_CAPACITY {
            buf.pop_front();
        }
        buf.push_back(entry);
    });
}

#[doc(hidden)]
#[must_use]
pub fn __echo_enabled() -> bool {
    static ECHO: OnceLock<bool> = OnceLock::new();

    *ECHO.get_or_init(|| std::env::var_os(LOG_ENV_VAR).is_some())
}

fn with_buffer<R>(f: impl FnOnce(&mut VecDeque<LogEntry>) -> R) -> R {
    // a panic while holding the lock leaves the buffer usable
    let mut guard = LOG.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    f(&mut guard)
}

///
/// TESTS
///
