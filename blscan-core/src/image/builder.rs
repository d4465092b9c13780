// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Boot image builder.

use std::path::PathBuf;

use crate::image::{BootImage, BootMethod};

/// A builder to configure a [`BootImage`].
///
/// The [`BootMethod`] is required up front, so that a [`BootImage`] can never be built without one.
///
/// # Example
///
/// ```
/// use blscan_core::image::{BootMethod, builder::BootImageBuilder};
///
/// let image = BootImageBuilder::new(
///     "shell",
///     "/boot/loader/entries/shell.conf",
///     BootMethod::Efi {
///         efi_path: "/boot/EFI/shellx64.efi".into(),
///         cmdline: String::new(),
///     },
/// )
/// .title("UEFI Shell")
/// .build();
///
/// assert_eq!(image.label(), "UEFI Shell");
/// ```
#[must_use = "Has no effect if the result is unused"]
pub struct BootImageBuilder {
    /// The inner [`BootImage`] that the builder operates on.
    image: BootImage,
}

impl BootImageBuilder {
    /// Constructs a new [`BootImageBuilder`] from the required fields.
    pub fn new(
        id: impl Into<String>,
        source_path: impl Into<PathBuf>,
        method: BootMethod,
    ) -> Self {
        Self {
            image: BootImage {
                id: id.into(),
                method,
                title: None,
                version: None,
                machine_id: None,
                sort_key: None,
                architecture: None,
                source_path: source_path.into(),
            },
        }
    }

    /// Sets the title of a [`BootImage`].
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.image.title = Some(title.into());
        self
    }

    /// Sets the version of a [`BootImage`].
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.image.version = Some(version.into());
        self
    }

    /// Sets the machine-id of a [`BootImage`].
    ///
    /// This is passed through as is. It is not checked to be 32 hexadecimal characters.
    pub fn machine_id(mut self, machine_id: impl Into<String>) -> Self {
        self.image.machine_id = Some(machine_id.into());
        self
    }

    /// Sets the sort-key of a [`BootImage`].
    pub fn sort_key(mut self, sort_key: impl Into<String>) -> Self {
        self.image.sort_key = Some(sort_key.into());
        self
    }

    /// Sets the architecture of a [`BootImage`].
    ///
    /// The architecture is lowercased, as architecture names in entries are case insensitive.
    pub fn architecture(mut self, architecture: impl Into<String>) -> Self {
        self.image.architecture = Some(architecture.into().to_ascii_lowercase());
        self
    }

    /// Builds a [`BootImage`].
    #[must_use = "Has no effect if the result is unused"]
    pub fn build(self) -> BootImage {
        self.image
    }

    /// Assigns a value to a field in a [`BootImage`] if it is [`Some`].
    pub fn assign_if_some<F, T>(self, value: Option<T>, assign: F) -> Self
    where
        F: FnOnce(Self, T) -> Self,
    {
        if let Some(value) = value {
            assign(self, value)
        } else {
            self
        }
    }
}

impl From<&BootImage> for BootImageBuilder {
    fn from(value: &BootImage) -> Self {
        Self {
            image: value.clone(),
        }
    }
}
