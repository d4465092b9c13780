// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! A parser for the GRUB environment block.
//!
//! Red Hat derived distributions write BLS entries whose options refer to variables, which are stored in the
//! environment block that GRUB reads and writes at boot:
//!
//! ```text
//! # GRUB Environment Block
//! saved_entry=6a9857a393724b7a981ebb5b8495b9ea-5.14.0-70.el9.x86_64
//! kernelopts=root=/dev/mapper/rhel-root ro crashkernel=auto rhgb quiet
//! ###################################################################
//! ```
//!
//! Without that block, an entry containing `options $kernelopts` would produce an unusable command line.

use std::{collections::BTreeMap, path::Path};

use crate::{
    config::ScanConfig,
    system::{fs::FileSystem, helper::collapse_whitespace},
};

/// The variables of a GRUB environment block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GrubEnv {
    /// The variables, by name.
    vars: BTreeMap<String, String>,
}

impl GrubEnv {
    /// Parses the contents of a GRUB environment block.
    ///
    /// Lines starting with `#` (which includes the padding of the block) and lines without `=` are ignored. If a
    /// variable is assigned more than once, the last assignment is kept.
    #[must_use = "Has no effect if the result is unused"]
    pub fn new(content: &str) -> Self {
        let vars = content
            .lines()
            .filter(|line| !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, value)| (name.to_owned(), value.to_owned()))
            .collect();

        Self { vars }
    }

    /// Loads the first readable GRUB environment block of [`ScanConfig::grubenv_paths`] under a root.
    ///
    /// Returns [`None`] when no block could be read, or when variable expansion is disabled in the [`ScanConfig`].
    /// A block that could not be read is treated the same as a missing one, as most roots do not have one.
    #[must_use = "Has no effect if the result is unused"]
    pub fn load<F: FileSystem + ?Sized>(fs: &F, root: &Path, config: &ScanConfig) -> Option<Self> {
        if !config.expand_variables {
            return None;
        }

        config
            .grubenv_paths
            .iter()
            .find_map(|path| fs.read(&root.join(path)).ok())
            .map(|content| Self::new(&String::from_utf8_lossy(&content)))
    }

    /// Gets the value of a variable.
    #[must_use = "Has no effect if the result is unused"]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Expands `$name` and `${name}` references in a value.
    ///
    /// Undefined variables expand to nothing, as they do in GRUB. A `$` that is not followed by a name, and a `${`
    /// without its closing brace, are kept as is. Whitespace runs in the result are collapsed to one space.
    #[must_use = "Has no effect if the result is unused"]
    pub fn expand(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        let mut rest = value;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            let (name, remaining) = if let Some(braced) = after.strip_prefix('{') {
                match braced.split_once('}') {
                    Some((name, remaining)) => (name, remaining),
                    None => ("", after),
                }
            } else {
                let end = after
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(after.len());
                (&after[..end], &after[end..])
            };

            if name.is_empty() {
                out.push('$');
                rest = after;
            } else {
                out.push_str(self.get(name).unwrap_or_default());
                rest = remaining;
            }
        }
        out.push_str(rest);

        collapse_whitespace(&out)
    }
}
