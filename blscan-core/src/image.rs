// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Provides [`BootImage`], the typed description of one bootable target.
//!
//! A [`BootImage`] always carries exactly one [`BootMethod`]. There is no "unknown" method, so a [`BootImage`] can
//! only exist once an entry was fully validated. Use [`builder::BootImageBuilder`] to construct one.
//!
//! The [`core::fmt::Display`] output (also available through [`BootImage::describe`]) is meant for logs and may
//! change between versions. For comparisons and persistence, use [`PartialEq`] and the [`serde`] representation,
//! which are defined over the typed fields.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

pub mod builder;

/// The mechanism used to start a [`BootImage`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BootMethod {
    /// Boot a Linux kernel directly.
    Linux {
        /// The path to the kernel image.
        kernel_path: PathBuf,

        /// The initrds to load, in the order they appeared.
        initrd_paths: Vec<PathBuf>,

        /// The kernel command line.
        cmdline: String,

        /// The devicetree to hand to the kernel, if any.
        devicetree_path: Option<PathBuf>,
    },

    /// Chainload an EFI executable.
    Efi {
        /// The path to the EFI executable.
        efi_path: PathBuf,

        /// The load options passed to the executable.
        cmdline: String,
    },

    /// Boot a multiboot kernel.
    Multiboot {
        /// The path to the multiboot kernel.
        path: PathBuf,

        /// The modules to load, in the order they appeared.
        modules: Vec<PathBuf>,

        /// The kernel command line.
        cmdline: String,
    },
}

impl BootMethod {
    /// Returns a short lowercase name for the method.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Linux { .. } => "linux",
            Self::Efi { .. } => "efi",
            Self::Multiboot { .. } => "multiboot",
        }
    }

    /// Returns the path of the image that is started first: the kernel, or the EFI executable.
    #[must_use = "Has no effect if the result is unused"]
    pub fn image_path(&self) -> &Path {
        match self {
            Self::Linux { kernel_path, .. } => kernel_path,
            Self::Efi { efi_path, .. } => efi_path,
            Self::Multiboot { path, .. } => path,
        }
    }

    /// Returns the command line of the method.
    #[must_use = "Has no effect if the result is unused"]
    pub fn cmdline(&self) -> &str {
        match self {
            Self::Linux { cmdline, .. }
            | Self::Efi { cmdline, .. }
            | Self::Multiboot { cmdline, .. } => cmdline,
        }
    }
}

impl fmt::Display for BootMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_str(), self.image_path().display())?;

        let extra: &[PathBuf] = match self {
            Self::Linux { initrd_paths, .. } => initrd_paths,
            Self::Multiboot { modules, .. } => modules,
            Self::Efi { .. } => &[],
        };
        if !extra.is_empty() {
            f.write_str(" [")?;
            for (i, path) in extra.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", path.display())?;
            }
            f.write_str("]")?;
        }

        if let Self::Linux {
            devicetree_path: Some(devicetree),
            ..
        } = self
        {
            write!(f, " devicetree={}", devicetree.display())?;
        }

        write!(f, " cmdline={:?}", self.cmdline())
    }
}

/// A validated, bootable target described by one entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootImage {
    /// The name of the entry file without its extension.
    id: String,

    /// How the target is booted.
    method: BootMethod,

    /// The human readable name of the entry.
    title: Option<String>,

    /// The version of the entry.
    version: Option<String>,

    /// The machine-id of the installation the entry belongs to.
    machine_id: Option<String>,

    /// The sort-key of the entry.
    sort_key: Option<String>,

    /// The architecture the entry is meant for, lowercased.
    architecture: Option<String>,

    /// The absolute path of the entry file.
    source_path: PathBuf,
}

impl BootImage {
    /// Returns the identifier of the entry, which is its filename without the extension.
    #[must_use = "Has no effect if the result is unused"]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the [`BootMethod`] of the entry.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn method(&self) -> &BootMethod {
        &self.method
    }

    /// Returns the title of the entry.
    #[must_use = "Has no effect if the result is unused"]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the version of the entry.
    #[must_use = "Has no effect if the result is unused"]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the machine-id of the entry.
    #[must_use = "Has no effect if the result is unused"]
    pub fn machine_id(&self) -> Option<&str> {
        self.machine_id.as_deref()
    }

    /// Returns the sort-key of the entry.
    #[must_use = "Has no effect if the result is unused"]
    pub fn sort_key(&self) -> Option<&str> {
        self.sort_key.as_deref()
    }

    /// Returns the architecture of the entry.
    #[must_use = "Has no effect if the result is unused"]
    pub fn architecture(&self) -> Option<&str> {
        self.architecture.as_deref()
    }

    /// Returns the path to the entry file this image was parsed from.
    #[must_use = "Has no effect if the result is unused"]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Picks the name to show for a [`BootImage`].
    ///
    /// The title and version are joined by a space when either of them is present and not blank. Otherwise, the
    /// id is used, as it still identifies where the entry came from.
    #[must_use = "Has no effect if the result is unused"]
    pub fn label(&self) -> String {
        let parts: Vec<&str> = [self.title(), self.version()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|x| !x.is_empty())
            .collect();

        if parts.is_empty() {
            self.id.clone()
        } else {
            parts.join(" ")
        }
    }

    /// Renders a one line, human readable summary for logs and debugging.
    #[must_use = "Has no effect if the result is unused"]
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BootImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.label(), self.id, self.method)
    }
}
