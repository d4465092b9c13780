// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Provides [`BootError`], which encapsulates other errors

use std::path::PathBuf;

use thiserror::Error;

/// An `Error` resulting from the library.
#[derive(Error, Debug)]
pub enum BootError {
    /// An error occurred while performing filesystem operations.
    #[error("Filesystem Error: {0}")]
    FsError(#[from] crate::system::fs::FsError),

    /// An entry was read, but its contents did not describe a bootable target.
    #[error("Error parsing config in \"{}\": {source}", path.display())]
    EntryError {
        /// The path to the entry that failed to parse.
        path: PathBuf,

        /// The reason the entry was rejected.
        source: crate::config::parsers::bls::BlsError,
    },
}

impl BootError {
    /// Checks if the error was caused by the contents of an entry, rather than by filesystem access.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::EntryError { .. })
    }
}
