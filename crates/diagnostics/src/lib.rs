// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Logging setup shared by the lakehouse crates
//!
//! Usage:
//! - Set LAKEHOUSE_LOG=off (default) - no logs
//! - Set LAKEHOUSE_LOG=info - one line per job step
//! - Set LAKEHOUSE_LOG=debug - table URIs, versions, SQL text

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable holding the log level
pub const LOG_ENV: &str = "LAKEHOUSE_LOG";

static INIT: Once = Once::new();

/// Minimum level parsed from `LAKEHOUSE_LOG`. `None` means logging is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a level name. Unknown names fall back to `Info`, `off` disables logging.
    pub fn parse(value: &str) -> (Option<Self>, bool) {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" | "" => (None, true),
            "debug" => (Some(Self::Debug), true),
            "info" => (Some(Self::Info), true),
            "warn" => (Some(Self::Warn), true),
            "error" => (Some(Self::Error), true),
            _ => (Some(Self::Info), false),
        }
    }

    fn emit_level(self) -> emit::Level {
        match self {
            Self::Debug => emit::Level::Debug,
            Self::Info => emit::Level::Info,
            Self::Warn => emit::Level::Warn,
            Self::Error => emit::Level::Error,
        }
    }
}

/// Initialize diagnostics based on the LAKEHOUSE_LOG environment variable
///
/// Call once at startup. Later calls are ignored.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let raw = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
        let (level, known) = LogLevel::parse(&raw);

        let Some(level) = level else {
            return;
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level.emit_level()))
            .init();

        if !known {
            emit::warn!("unknown {env} value '{raw}', using 'info'", env: LOG_ENV, raw: raw.as_str());
        }

        // The runtime must outlive every emitter for the life of the process
        std::mem::forget(rt);
    });
}

/// Log job progress (steps, commits, row counts)
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics (URIs, SQL text, versions)
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log recoverable conditions (fallbacks, config issues)
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures that end the job
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

pub use init_diagnostics as init;
