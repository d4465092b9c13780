// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! A parser for BootLoaderSpec type #1, a versionless specification for consistent boot entries.
//!
//! Example configuration:
//!
//! ```text
//! # a comment
//!
//! title Linux
//! sort-key linux
//! linux /vmlinuz-linux
//! initrd /intel-ucode.img
//! initrd /initramfs-linux.img
//! options root=UUID=e09d636b-0cd9-4e84-8a39-84432cfc2b8e ro
//! ```
//!
//! Parsing happens in two steps. First, every line is collected into a [`ConfigEntry`], which is nothing more than
//! a map of recognized keys to their string values. Then, [`ConfigEntry::into_image`] decides the boot method and
//! converts the strings into a typed [`BootImage`], resolving paths against the root of the filesystem the entry
//! was found on.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tinyvec::TinyVec;

use crate::{
    BootResult,
    config::{ScanConfig, parsers::grubenv::GrubEnv},
    error::BootError,
    image::{BootImage, BootMethod, builder::BootImageBuilder},
    system::{
        fs::FileSystem,
        helper::{RootedPathError, join_under_root},
    },
};

/// Errors indicating that the contents of an entry do not describe a bootable target.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BlsError {
    /// None of the keys that select a boot method had a value.
    #[error("neither linux, efi, nor multiboot present in BootLoaderSpec config")]
    NoBootMethod,

    /// The entry was not valid UTF-8.
    #[error("config is not valid UTF-8")]
    NotUtf8,

    /// A path climbs above the root of the filesystem.
    #[error("{key} path \"{path}\" escapes the filesystem root")]
    PathEscapesRoot {
        /// The key the path was found under.
        key: &'static str,

        /// The path, as written in the entry.
        path: String,
    },

    /// A path resolves to the root of the filesystem itself.
    #[error("{key} path \"{path}\" does not name a file")]
    EmptyPath {
        /// The key the path was found under.
        key: &'static str,

        /// The path, as written in the entry.
        path: String,
    },
}

/// The keys of a BLS entry that are understood.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Key {
    /// The human readable name of the entry.
    Title,

    /// The version of the entry.
    Version,

    /// The machine-id of the installation.
    MachineId,

    /// The sort-key of the entry.
    SortKey,

    /// The Linux kernel image.
    Linux,

    /// An initrd. May be repeated.
    Initrd,

    /// The command line.
    Options,

    /// The devicetree.
    Devicetree,

    /// An EFI executable.
    Efi,

    /// A multiboot kernel.
    Multiboot,

    /// A multiboot module. May be repeated.
    Module,

    /// The architecture the entry is for.
    Architecture,
}

impl Key {
    /// Matches a key token, ignoring ASCII case. Returns [`None`] for keys that are not understood.
    #[must_use = "Has no effect if the result is unused"]
    pub fn from_token(token: &str) -> Option<Self> {
        let key = match &*token.to_ascii_lowercase() {
            "title" => Self::Title,
            "version" => Self::Version,
            "machine-id" => Self::MachineId,
            "sort-key" => Self::SortKey,
            "linux" => Self::Linux,
            "initrd" => Self::Initrd,
            "options" => Self::Options,
            "devicetree" => Self::Devicetree,
            "efi" => Self::Efi,
            "multiboot" => Self::Multiboot,
            "module" => Self::Module,
            "architecture" => Self::Architecture,
            _ => return None,
        };
        Some(key)
    }

    /// Returns the key as it is written in an entry.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Version => "version",
            Self::MachineId => "machine-id",
            Self::SortKey => "sort-key",
            Self::Linux => "linux",
            Self::Initrd => "initrd",
            Self::Options => "options",
            Self::Devicetree => "devicetree",
            Self::Efi => "efi",
            Self::Multiboot => "multiboot",
            Self::Module => "module",
            Self::Architecture => "architecture",
        }
    }

    /// Checks if every occurrence of the key is kept, rather than only the last.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn is_repeatable(self) -> bool {
        matches!(self, Self::Initrd | Self::Module)
    }
}

/// The raw key-value contents of a BLS entry.
///
/// Repeatable keys keep every value in the order they appeared. For every other key, the latest one is used. This
/// is the usual behavior of BLS consumers, though BootLoaderSpec does not say what should happen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigEntry {
    /// The values of every key that appeared at least once.
    values: BTreeMap<Key, TinyVec<[String; 1]>>,
}

impl ConfigEntry {
    /// Creates a new [`ConfigEntry`], parsing it from a BLS configuration file formatted string.
    ///
    /// Blank lines, comments and lines with an unrecognized key are skipped. The key is separated from its value by
    /// the first run of whitespace, so values may contain spaces.
    #[must_use = "Has no effect if the result is unused"]
    pub fn new(content: &str) -> Self {
        let mut entry = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            entry.assign_to_field(line);
        }

        entry
    }

    /// Creates a new [`ConfigEntry`] from raw bytes.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the content is not valid UTF-8.
    pub fn from_bytes(content: &[u8]) -> Result<Self, BlsError> {
        str::from_utf8(content)
            .map(Self::new)
            .map_err(|_| BlsError::NotUtf8)
    }

    /// Assign a value to the [`ConfigEntry`] given a line containing the key and value.
    fn assign_to_field(&mut self, line: &str) {
        let (key, value) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));

        let Some(key) = Key::from_token(key) else {
            return;
        };

        let values = self.values.entry(key).or_default();
        if !key.is_repeatable() {
            values.clear();
        }
        values.push(value.trim().to_owned());
    }

    /// Gets the value of a key. For repeatable keys, this is the last value.
    #[must_use = "Has no effect if the result is unused"]
    pub fn get(&self, key: Key) -> Option<&str> {
        self.values
            .get(&key)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// Gets every value of a key, in the order they appeared.
    #[must_use = "Has no effect if the result is unused"]
    pub fn get_all(&self, key: Key) -> &[String] {
        self.values
            .get(&key)
            .map(|values| values.as_slice())
            .unwrap_or_default()
    }

    /// Gets the value of a key if it is present and not empty.
    fn get_non_empty(&self, key: Key) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    /// Converts the [`ConfigEntry`] into a [`BootImage`].
    ///
    /// The boot method is chosen from the first key among `linux`, `efi` and `multiboot` that has a value. Every path
    /// is resolved under `fs_root`. If a [`GrubEnv`] is given, the variables in `options` are expanded with it.
    ///
    /// # Errors
    ///
    /// May return an `Error` if none of the boot method keys have a value, or if a path does not stay under the root.
    pub fn into_image(
        self,
        id: impl Into<String>,
        source_path: &Path,
        fs_root: &Path,
        env: Option<&GrubEnv>,
    ) -> Result<BootImage, BlsError> {
        let method = self.boot_method(fs_root, env)?;

        Ok(BootImageBuilder::new(id, source_path, method)
            .assign_if_some(self.get(Key::Title), BootImageBuilder::title)
            .assign_if_some(self.get(Key::Version), BootImageBuilder::version)
            .assign_if_some(self.get(Key::MachineId), BootImageBuilder::machine_id)
            .assign_if_some(self.get(Key::SortKey), BootImageBuilder::sort_key)
            .assign_if_some(
                self.get_non_empty(Key::Architecture),
                BootImageBuilder::architecture,
            )
            .build())
    }

    /// Decides the [`BootMethod`], in the order linux, efi, multiboot.
    fn boot_method(&self, fs_root: &Path, env: Option<&GrubEnv>) -> Result<BootMethod, BlsError> {
        let cmdline = self.cmdline(env);

        if let Some(linux) = self.get_non_empty(Key::Linux) {
            let devicetree_path = self
                .get_non_empty(Key::Devicetree)
                .map(|path| resolve(fs_root, Key::Devicetree, path))
                .transpose()?;

            return Ok(BootMethod::Linux {
                kernel_path: resolve(fs_root, Key::Linux, linux)?,
                initrd_paths: self.resolve_all(fs_root, Key::Initrd)?,
                cmdline,
                devicetree_path,
            });
        }

        if let Some(efi) = self.get_non_empty(Key::Efi) {
            return Ok(BootMethod::Efi {
                efi_path: resolve(fs_root, Key::Efi, efi)?,
                cmdline,
            });
        }

        if let Some(multiboot) = self.get_non_empty(Key::Multiboot) {
            return Ok(BootMethod::Multiboot {
                path: resolve(fs_root, Key::Multiboot, multiboot)?,
                modules: self.resolve_all(fs_root, Key::Module)?,
                cmdline,
            });
        }

        Err(BlsError::NoBootMethod)
    }

    /// Gets the command line from the options, expanding variables if there is a [`GrubEnv`].
    fn cmdline(&self, env: Option<&GrubEnv>) -> String {
        let options = self.get(Key::Options).unwrap_or_default();
        match env {
            Some(env) => env.expand(options),
            None => options.to_owned(),
        }
    }

    /// Resolves every non-empty value of a repeatable key, keeping their order.
    fn resolve_all(&self, fs_root: &Path, key: Key) -> Result<Vec<PathBuf>, BlsError> {
        self.get_all(key)
            .iter()
            .filter(|path| !path.is_empty())
            .map(|path| resolve(fs_root, key, path))
            .collect()
    }
}

/// Resolves a path from an entry under `fs_root`, attributing any error to `key`.
fn resolve(fs_root: &Path, key: Key, path: &str) -> Result<PathBuf, BlsError> {
    join_under_root(fs_root, path).map_err(|e| match e {
        RootedPathError::EscapesRoot => BlsError::PathEscapesRoot {
            key: key.as_str(),
            path: path.to_owned(),
        },
        RootedPathError::Empty => BlsError::EmptyPath {
            key: key.as_str(),
            path: path.to_owned(),
        },
    })
}

/// Parses one BLS entry file into a [`BootImage`], using the default [`ScanConfig`].
///
/// `fs_root` is the root of the filesystem the entry belongs to. Paths inside the entry are resolved under it, so
/// that `linux /vmlinuz` with a root of `/boot` becomes `/boot/vmlinuz`. The id of the image is the filename of the
/// entry without its extension.
///
/// # Errors
///
/// May return an `Error` if the file could not be read ([`BootError::FsError`]), or if its contents do not describe a
/// bootable target ([`BootError::EntryError`]).
pub fn parse_entry<F: FileSystem + ?Sized>(
    fs: &F,
    entry_path: &Path,
    fs_root: &Path,
) -> BootResult<BootImage> {
    parse_entry_with(fs, entry_path, fs_root, &ScanConfig::default())
}

/// Parses one BLS entry file into a [`BootImage`], using the given [`ScanConfig`].
///
/// The GRUB environment block is looked up under `fs_root` as configured.
///
/// # Errors
///
/// May return an `Error` if the file could not be read, or if its contents do not describe a bootable target.
pub fn parse_entry_with<F: FileSystem + ?Sized>(
    fs: &F,
    entry_path: &Path,
    fs_root: &Path,
    config: &ScanConfig,
) -> BootResult<BootImage> {
    let fs_root = fs.absolute(fs_root)?;
    let env = GrubEnv::load(fs, &fs_root, config);
    parse_entry_in(fs, entry_path, &fs_root, env.as_ref())
}

/// Parses one BLS entry file given an already absolute root and an already loaded [`GrubEnv`].
///
/// # Errors
///
/// May return an `Error` if the file could not be read, or if its contents do not describe a bootable target.
pub(crate) fn parse_entry_in<F: FileSystem + ?Sized>(
    fs: &F,
    entry_path: &Path,
    fs_root: &Path,
    env: Option<&GrubEnv>,
) -> BootResult<BootImage> {
    let source_path = fs.absolute(entry_path)?;
    let content = fs.read(&source_path)?;

    let entry_error = |source| BootError::EntryError {
        path: source_path.clone(),
        source,
    };

    let id = source_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    ConfigEntry::from_bytes(&content)
        .and_then(|entry| entry.into_image(id, &source_path, fs_root, env))
        .map_err(entry_error)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::system::fs::MemFileSystem;

    const ROOT: &str = "/boot";

    fn image(content: &str) -> Result<BootImage, BlsError> {
        ConfigEntry::new(content).into_image(
            "test",
            Path::new("/boot/loader/entries/test.conf"),
            Path::new(ROOT),
            None,
        )
    }

    #[test]
    fn test_basic_config() -> Result<(), BlsError> {
        let image = image(
            "
            title Linux
            linux /vmlinuz-linux
            initrd /initramfs-linux.img
            options root=PARTUUID=1234abcd-56ef-78gh-90ij-klmnopqrstuv rw
        ",
        )?;
        assert_eq!(image.title(), Some("Linux"));
        assert_eq!(
            image.method(),
            &BootMethod::Linux {
                kernel_path: PathBuf::from("/boot/vmlinuz-linux"),
                initrd_paths: vec![PathBuf::from("/boot/initramfs-linux.img")],
                cmdline: "root=PARTUUID=1234abcd-56ef-78gh-90ij-klmnopqrstuv rw".to_owned(),
                devicetree_path: None,
            }
        );
        Ok(())
    }

    #[test]
    fn test_multiple_initrd() -> Result<(), BlsError> {
        let image = image(
            "
            linux /vmlinuz
            initrd /initrd1
            initrd /initrd2
            options root=/dev/sda1
        ",
        )?;
        let BootMethod::Linux {
            initrd_paths,
            cmdline,
            ..
        } = image.method()
        else {
            panic!("expected a linux image, got {image}");
        };
        assert_eq!(
            initrd_paths,
            &[PathBuf::from("/boot/initrd1"), PathBuf::from("/boot/initrd2")]
        );
        assert_eq!(cmdline, "root=/dev/sda1");
        Ok(())
    }

    #[test]
    fn test_comment() {
        let entry = ConfigEntry::new(
            "
            # A comment that should be ignored.
            title Linux
            linux /vmlinuz-linux
        ",
        );
        assert_eq!(entry.get(Key::Title), Some("Linux"));
        assert_eq!(entry.get(Key::Linux), Some("/vmlinuz-linux"));
    }

    #[test]
    fn test_duplicate() {
        let entry = ConfigEntry::new(
            "
            title Linux
            title Linux 2
            linux /vmlinuz-linux
        ",
        );
        // the last title in sequence takes priority
        assert_eq!(entry.get(Key::Title), Some("Linux 2"));
        assert_eq!(entry.get_all(Key::Title).len(), 1);
    }

    #[test]
    fn test_invalid_keys() -> Result<(), BlsError> {
        let content = "
            title Linux
            invalid invalid
            someother invalid
            grub_class kernel
            linux /vmlinuz-linux
        ";
        let with_unknown = image(content)?;
        let without_unknown = image("title Linux\nlinux /vmlinuz-linux")?;
        // unknown keys leave no trace in the image
        assert_eq!(with_unknown, without_unknown);
        Ok(())
    }

    #[test]
    fn test_key_case_and_tabs() {
        let entry = ConfigEntry::new("TITLE\tArch Linux\nMachine-ID   6a9857a393724b7a981ebb5b8495b9ea");
        assert_eq!(entry.get(Key::Title), Some("Arch Linux"));
        assert_eq!(
            entry.get(Key::MachineId),
            Some("6a9857a393724b7a981ebb5b8495b9ea")
        );
    }

    #[test]
    fn test_no_boot_method() {
        let err = image("title Foo\nversion 1.0");
        assert_eq!(err, Err(BlsError::NoBootMethod));
        assert!(
            BlsError::NoBootMethod
                .to_string()
                .contains("neither linux, efi, nor multiboot present")
        );

        // a key without a value does not count
        assert_eq!(image("linux\nefi   "), Err(BlsError::NoBootMethod));
    }

    #[test]
    fn test_method_priority() -> Result<(), BlsError> {
        let all = image("multiboot /xen.gz\nefi /shell.efi\nlinux /vmlinuz")?;
        assert_eq!(all.method().as_str(), "linux");

        let efi = image("multiboot /xen.gz\nefi /shell.efi\noptions -nostartup")?;
        assert_eq!(
            efi.method(),
            &BootMethod::Efi {
                efi_path: PathBuf::from("/boot/shell.efi"),
                cmdline: "-nostartup".to_owned(),
            }
        );

        let multiboot = image("multiboot /xen.gz\nmodule /vmlinuz\nmodule /initrd.img")?;
        assert_eq!(
            multiboot.method(),
            &BootMethod::Multiboot {
                path: PathBuf::from("/boot/xen.gz"),
                modules: vec![PathBuf::from("/boot/vmlinuz"), PathBuf::from("/boot/initrd.img")],
                cmdline: String::new(),
            }
        );
        Ok(())
    }

    #[test]
    fn test_metadata() -> Result<(), BlsError> {
        let image = image(
            "
            title Fedora Linux 40
            version 6.8.5-301.fc40.x86_64
            machine-id 6a9857a393724b7a981ebb5b8495b9ea
            sort-key fedora
            architecture X64
            linux /vmlinuz-6.8.5-301.fc40.x86_64
            devicetree /dtbs/board.dtb
        ",
        )?;
        assert_eq!(image.version(), Some("6.8.5-301.fc40.x86_64"));
        assert_eq!(image.machine_id(), Some("6a9857a393724b7a981ebb5b8495b9ea"));
        assert_eq!(image.sort_key(), Some("fedora"));
        assert_eq!(image.architecture(), Some("x64"));
        assert!(matches!(
            image.method(),
            BootMethod::Linux { devicetree_path: Some(path), .. } if path == Path::new("/boot/dtbs/board.dtb")
        ));
        Ok(())
    }

    #[test]
    fn test_path_escape() {
        assert_eq!(
            image("linux /../vmlinuz"),
            Err(BlsError::PathEscapesRoot {
                key: "linux",
                path: "/../vmlinuz".to_owned()
            })
        );
        assert_eq!(
            image("linux /vmlinuz\ninitrd /"),
            Err(BlsError::EmptyPath {
                key: "initrd",
                path: "/".to_owned()
            })
        );
    }

    #[test]
    fn test_grubenv_options() -> Result<(), BlsError> {
        let env = GrubEnv::new("kernelopts=root=/dev/sda1 ro\n");
        let image = ConfigEntry::new("linux /vmlinuz\noptions $kernelopts quiet").into_image(
            "test",
            Path::new("/boot/loader/entries/test.conf"),
            Path::new(ROOT),
            Some(&env),
        )?;
        assert_eq!(image.method().cmdline(), "root=/dev/sda1 ro quiet");
        Ok(())
    }

    #[test]
    fn test_parse_entry() -> BootResult<()> {
        let fs = MemFileSystem::new()
            .with_file(
                "/boot/loader/entries/arch.conf",
                "title Arch Linux\nlinux /vmlinuz-linux\noptions $kernelopts",
            )
            .with_file("/boot/grub2/grubenv", "kernelopts=root=/dev/sda2 rw\n");

        let image = parse_entry(
            &fs,
            Path::new("/boot/loader/entries/arch.conf"),
            Path::new("/boot"),
        )?;
        assert_eq!(image.id(), "arch");
        assert_eq!(image.source_path(), Path::new("/boot/loader/entries/arch.conf"));
        assert_eq!(image.method().image_path(), Path::new("/boot/vmlinuz-linux"));
        assert_eq!(image.method().cmdline(), "root=/dev/sda2 rw");
        Ok(())
    }

    #[test]
    fn test_parse_entry_errors() {
        let fs = MemFileSystem::new()
            .with_file("/boot/loader/entries/bad.conf", "title Foo\nversion 1.0")
            .with_file("/boot/loader/entries/binary.conf", &b"\xff\xfe\xfd"[..]);

        let err = parse_entry(&fs, Path::new("/boot/loader/entries/bad.conf"), Path::new("/boot"));
        let Err(err) = err else {
            panic!("expected an error");
        };
        assert!(err.is_validation());
        assert!(
            err.to_string()
                .contains("neither linux, efi, nor multiboot present")
        );
        assert!(err.to_string().contains("bad.conf"));

        let err = parse_entry(&fs, Path::new("/boot/loader/entries/binary.conf"), Path::new("/boot"));
        assert!(matches!(
            err,
            Err(BootError::EntryError {
                source: BlsError::NotUtf8,
                ..
            })
        ));

        let err = parse_entry(&fs, Path::new("/boot/loader/entries/missing.conf"), Path::new("/boot"));
        assert!(matches!(err, Err(BootError::FsError(_))));
    }

    proptest! {
        #[test]
        fn doesnt_panic(x in any::<Vec<u8>>()) {
            if let Ok(entry) = ConfigEntry::from_bytes(&x) {
                let _ = entry.into_image("fuzz", Path::new("/fuzz.conf"), Path::new(ROOT), None);
            }
        }

        #[test]
        fn sets_title(x in any::<String>()) {
            let x = x.trim();
            let title = format!("title {x}");
            let entry = ConfigEntry::new(&title);
            if !x.is_empty() && !x.contains(['\n', '\r']) {
                prop_assert_eq!(entry.get(Key::Title), Some(x));
            }
        }

        #[test]
        fn keeps_initrd_order(initrds in prop::collection::vec("[a-z0-9_-][a-z0-9_.-]{0,11}", 0..8)) {
            let mut content = String::from("linux /vmlinuz\n");
            for initrd in &initrds {
                content.push_str(&format!("initrd /{initrd}\n"));
            }
            let image = image(&content).map_err(|e| TestCaseError::fail(e.to_string()))?;
            let BootMethod::Linux { initrd_paths, .. } = image.method() else {
                return Err(TestCaseError::fail("expected a linux image"));
            };
            let expected: Vec<PathBuf> = initrds
                .iter()
                .map(|initrd| Path::new(ROOT).join(initrd))
                .collect();
            prop_assert_eq!(initrd_paths, &expected);
        }
    }
}
