// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Provides [`ScanConfig`], the tunables of a scan.
//!
//! This parses space separated key value pairs, in the same syntax as the BLS entries themselves.
//!
//! Example configuration:
//!
//! ```text
//! # Where entries are searched, relative to the root being scanned
//! entries_dir /loader/entries
//!
//! # The extension of an entry file
//! suffix .conf
//!
//! # Where the GRUB environment block is searched, in order. The first occurrence replaces the defaults
//! grubenv /grub2/grubenv
//! grubenv /grub/grubenv
//!
//! # Expand $variables in options from the GRUB environment block
//! expand_variables true
//! ```

use std::path::PathBuf;

pub mod parsers;

/// The default directory of entries, relative to the root.
const ENTRIES_DIR: &str = "loader/entries";

/// The default extension of an entry file.
const ENTRY_SUFFIX: &str = ".conf";

/// The default locations of the GRUB environment block, relative to the root.
const GRUBENV_PATHS: [&str; 2] = ["grub2/grubenv", "grub/grubenv"];

/// The tunables of a scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    /// The directory holding the entries, relative to the root.
    pub entries_dir: PathBuf,

    /// The extension an entry file must have. This is compared case insensitively.
    pub suffix: String,

    /// The candidate paths of the GRUB environment block, relative to the root. The first readable one is used.
    pub grubenv_paths: Vec<PathBuf>,

    /// Allows `$variables` in options to be expanded from the GRUB environment block.
    pub expand_variables: bool,
}

impl ScanConfig {
    /// Parses the contents of a [`ScanConfig`] format file.
    ///
    /// Unknown keys and values that could not be parsed are ignored, leaving the default in place. If the content
    /// is not valid UTF-8, the default [`ScanConfig`] is returned.
    #[must_use = "Has no effect if the result is unused"]
    pub fn from_bytes(content: &[u8]) -> Self {
        let mut config = Self::default();
        let mut grubenv_seen = false;

        let Ok(content) = str::from_utf8(content) else {
            return config;
        };

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(char::is_whitespace) else {
                continue;
            };
            let value = value.trim();

            match &*key.to_ascii_lowercase() {
                "entries_dir" => config.entries_dir = relative_path(value),
                "suffix" if !value.is_empty() => config.suffix = value.to_owned(),
                "grubenv" => {
                    if !grubenv_seen {
                        config.grubenv_paths.clear();
                        grubenv_seen = true;
                    }
                    config.grubenv_paths.push(relative_path(value));
                }
                "expand_variables" => {
                    if let Ok(value) = value.parse() {
                        config.expand_variables = value;
                    }
                }
                _ => (),
            }
        }

        config
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            entries_dir: PathBuf::from(ENTRIES_DIR),
            suffix: ENTRY_SUFFIX.to_owned(),
            grubenv_paths: GRUBENV_PATHS.iter().map(PathBuf::from).collect(),
            expand_variables: true,
        }
    }
}

/// Strips leading slashes, so that a configured path stays under the root it is joined onto.
fn relative_path(path: &str) -> PathBuf {
    PathBuf::from(path.trim_start_matches('/'))
}
