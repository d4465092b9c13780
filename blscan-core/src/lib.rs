// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The `blscan` library crate.
//!
//! This reads `BootLoaderSpec` type #1 entries from a filesystem and turns them into typed [`image::BootImage`]s,
//! so that a boot menu or an automated chooser can enumerate the installed operating systems without knowing anything
//! about the configuration syntax of a particular bootloader.
//!
//! The two entrypoints are [`config::parsers::bls::parse_entry`], which parses exactly one entry file and surfaces
//! the precise error if it is invalid, and [`scan::scan`], which parses every entry under a root and skips (while
//! logging) the ones that are broken.
//!
//! Filesystem access and logging are injected through the [`system::fs::FileSystem`] and [`system::logger::Logger`]
//! traits, so both can be swapped for in-memory implementations in tests.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use blscan_core::{scan::scan, system::{fs::StdFileSystem, logger::LogFacade}};
//!
//! let images = scan(&LogFacade, &StdFileSystem, Path::new("/boot"))?;
//! for image in &images {
//!     println!("{image}");
//! }
//! # Ok::<(), blscan_core::error::BootError>(())
//! ```
//!
//! ## MSRV
//!
//! The minimum supported rust version is 1.88.0.

/// The primary result type that wraps around [`crate::error::BootError`].
pub type BootResult<T> = Result<T, crate::error::BootError>;

pub mod config;
pub mod error;
pub mod image;
pub mod scan;
pub mod system;
