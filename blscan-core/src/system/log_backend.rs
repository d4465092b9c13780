// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Simple stderr backend for the [`log`] crate.

use std::io::Write;

use log::{LevelFilter, Metadata, Record};

/// A simple logging backend that writes to standard error.
pub struct StderrLogger {
    /// The most verbose level that will be written.
    level: LevelFilter,
}

impl StderrLogger {
    /// Constructs a new [`StderrLogger`] writing messages up to `level`.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// Constructs a new [`StderrLogger`], then immediately leaks it so that it can be used with `set_logger`.
    #[must_use = "Has no effect if the result is unused"]
    pub fn static_new(level: LevelFilter) -> &'static Self {
        Box::leak(Box::new(Self::new(level)))
    }

    /// Installs this logger as the global [`log`] backend and sets the max level to match it.
    ///
    /// # Errors
    ///
    /// May return an `Error` if a logger was already installed.
    pub fn init(&'static self) -> Result<(), log::SetLoggerError> {
        log::set_logger(self).map(|()| log::set_max_level(self.level))
    }

    /// Formats a record the way it is written to standard error.
    fn format(record: &Record) -> String {
        let level = record.level();
        let file = record.file().unwrap_or_default();
        let line = record.line().unwrap_or_default();
        let args = record.args();
        format!("[{level} {file}:{line}] - {args}")
    }
}

impl Default for StderrLogger {
    fn default() -> Self {
        Self::new(LevelFilter::Warn)
    }
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(std::io::stderr().lock(), "{}", Self::format(record));
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}
