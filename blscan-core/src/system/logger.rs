// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The logging capability handed to the scanner.
//!
//! The scanner reports the entries it skips through a [`Logger`] that is passed in explicitly, rather than through
//! a process wide logger. [`LogFacade`] forwards to the [`log`] crate, so that whatever backend the application
//! installed (such as [`super::log_backend::StderrLogger`]) receives the messages. [`MemoryLogger`] keeps them
//! instead, so that tests can count and inspect them.

use std::{
    fmt,
    sync::{Mutex, PoisonError},
};

use log::Level;

/// A leveled sink for diagnostic messages.
pub trait Logger {
    /// Emits one message at the given level.
    fn log(&self, level: Level, args: fmt::Arguments<'_>);

    /// Emits one message at [`Level::Warn`].
    fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }
}

impl<L: Logger + ?Sized> Logger for &L {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        (**self).log(level, args);
    }
}

/// A [`Logger`] that forwards every message to the [`log`] facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogFacade;

impl Logger for LogFacade {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        log::log!(target: "blscan", level, "{args}");
    }
}

/// A [`Logger`] that records every message in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    /// The recorded messages, in emission order.
    records: Mutex<Vec<(Level, String)>>,
}

impl MemoryLogger {
    /// Constructs a new, empty [`MemoryLogger`].
    #[must_use = "Has no effect if the result is unused"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every recorded message with its level.
    #[must_use = "Has no effect if the result is unused"]
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the recorded messages at exactly the given level.
    #[must_use = "Has no effect if the result is unused"]
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, args.to_string()));
    }
}
