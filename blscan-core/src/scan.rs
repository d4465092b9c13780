// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Scans a root for BLS entries, and parses every one of them into a [`BootImage`].
//!
//! Entries are parsed in lexicographic order of their filename, so that the resulting list is the same on every run
//! and on every platform. An entry that fails to parse is reported through the [`Logger`] and skipped, so that one
//! broken entry never hides the others. Only a directory that cannot be listed at all fails the scan.

use std::path::Path;

use crate::{
    BootResult,
    config::{
        ScanConfig,
        parsers::{bls::parse_entry_in, grubenv::GrubEnv},
    },
    image::BootImage,
    system::{fs::FileSystem, helper::has_suffix_ignore_case, logger::Logger},
};

/// Scans `root` for BLS entries using the default [`ScanConfig`].
///
/// Entries are searched in `root/loader/entries`, and must have the `.conf` extension. An empty list is not an error;
/// it is up to the caller to decide if having no bootable entries is a problem.
///
/// # Errors
///
/// May return an `Error` if the entries directory does not exist or could not be listed.
pub fn scan<L, F>(logger: &L, fs: &F, root: &Path) -> BootResult<Vec<BootImage>>
where
    L: Logger + ?Sized,
    F: FileSystem + ?Sized,
{
    scan_with(logger, fs, root, &ScanConfig::default())
}

/// Scans `root` for BLS entries using the given [`ScanConfig`].
///
/// # Errors
///
/// May return an `Error` if the entries directory does not exist or could not be listed.
pub fn scan_with<L, F>(
    logger: &L,
    fs: &F,
    root: &Path,
    config: &ScanConfig,
) -> BootResult<Vec<BootImage>>
where
    L: Logger + ?Sized,
    F: FileSystem + ?Sized,
{
    let root = fs.absolute(root)?;
    let dir = root.join(&config.entries_dir);

    let mut files = fs.list_files(&dir)?;
    files.retain(|name| has_suffix_ignore_case(name, &config.suffix));
    files.sort_unstable();

    let env = GrubEnv::load(fs, &root, config);

    let mut images = Vec::with_capacity(files.len());
    for file in files {
        let path = dir.join(&file);
        match parse_entry_in(fs, &path, &root, env.as_ref()) {
            Ok(image) => images.push(image),
            Err(e) => logger.warn(format_args!("BootLoaderSpec skipping entry {file}: {e}")),
        }
    }

    Ok(images)
}

#[cfg(test)]
mod tests {
    use log::Level;

    use super::*;
    use crate::{
        error::BootError,
        image::BootMethod,
        system::{fs::MemFileSystem, logger::MemoryLogger},
    };

    fn fixture() -> MemFileSystem {
        MemFileSystem::new()
            .with_file(
                "/boot/loader/entries/b-linux.conf",
                "title Linux\nlinux /vmlinuz\ninitrd /initrd1\ninitrd /initrd2\noptions root=/dev/sda1",
            )
            .with_file(
                "/boot/loader/entries/a-shell.conf",
                "title Shell\nefi /EFI/shellx64.efi",
            )
            .with_file(
                "/boot/loader/entries/c-broken.conf",
                "title Foo\nversion 1.0",
            )
            .with_file("/boot/loader/entries/d-escape.conf", "linux /../../etc/passwd")
            .with_file("/boot/loader/entries/README", "not an entry")
            .with_file("/boot/loader/entries/e-xen.CONF", "multiboot /xen.gz\nmodule /vmlinuz")
    }

    #[test]
    fn test_scan_skips_bad_entries() -> BootResult<()> {
        let logger = MemoryLogger::new();
        let images = scan(&logger, &fixture(), Path::new("/boot"))?;

        let ids: Vec<&str> = images.iter().map(BootImage::id).collect();
        assert_eq!(ids, ["a-shell", "b-linux", "e-xen"]);

        let warnings = logger.messages(Level::Warn);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("c-broken.conf"));
        assert!(warnings[0].contains("neither linux, efi, nor multiboot present"));
        assert!(warnings[1].contains("d-escape.conf"));
        assert_eq!(logger.records().len(), 2);
        Ok(())
    }

    #[test]
    fn test_scan_linux_entry() -> BootResult<()> {
        let images = scan(&MemoryLogger::new(), &fixture(), Path::new("/boot"))?;
        let linux = images
            .iter()
            .find(|image| image.id() == "b-linux")
            .map(BootImage::method);

        assert_eq!(
            linux,
            Some(&BootMethod::Linux {
                kernel_path: "/boot/vmlinuz".into(),
                initrd_paths: vec!["/boot/initrd1".into(), "/boot/initrd2".into()],
                cmdline: "root=/dev/sda1".to_owned(),
                devicetree_path: None,
            })
        );
        Ok(())
    }

    #[test]
    fn test_scan_is_stable() -> BootResult<()> {
        let fs = fixture();
        let first = scan(&MemoryLogger::new(), &fs, Path::new("/boot"))?;
        let second = scan(&MemoryLogger::new(), &fs, Path::new("/boot"))?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_scan_missing_dir() {
        let logger = MemoryLogger::new();
        let result = scan(&logger, &fixture(), Path::new("/efi"));
        assert!(matches!(result, Err(BootError::FsError(_))));
        assert!(logger.records().is_empty());
    }

    #[test]
    fn test_scan_empty_dir() -> BootResult<()> {
        let fs = MemFileSystem::new().with_dir("/boot/loader/entries");
        let logger = MemoryLogger::new();
        let images = scan(&logger, &fs, Path::new("/boot"))?;
        assert!(images.is_empty());
        assert!(logger.records().is_empty());
        Ok(())
    }

    #[test]
    fn test_scan_unreadable_entry() -> BootResult<()> {
        // an entry listed by the directory, that fails to be read
        struct Flaky(MemFileSystem);

        impl FileSystem for Flaky {
            fn read(&self, path: &Path) -> Result<Vec<u8>, crate::system::fs::FsError> {
                if path.ends_with("b-linux.conf") {
                    return Err(crate::system::fs::FsError::ReadErr {
                        path: path.to_path_buf(),
                        source: std::io::ErrorKind::PermissionDenied.into(),
                    });
                }
                self.0.read(path)
            }

            fn list_files(&self, dir: &Path) -> Result<Vec<String>, crate::system::fs::FsError> {
                self.0.list_files(dir)
            }
        }

        let logger = MemoryLogger::new();
        let images = scan(&logger, &Flaky(fixture()), Path::new("/boot"))?;
        assert_eq!(images.len(), 2);
        assert_eq!(logger.messages(Level::Warn).len(), 3);
        Ok(())
    }

    #[test]
    fn test_scan_with_config() -> BootResult<()> {
        let fs = MemFileSystem::new()
            .with_file("/esp/entries/rhel.entry", "linux /vmlinuz\noptions $kernelopts")
            .with_file("/esp/entries/ignored.conf", "linux /vmlinuz")
            .with_file("/esp/env", "kernelopts=root=/dev/mapper/rhel-root ro\n");
        let config = ScanConfig {
            entries_dir: "entries".into(),
            suffix: ".entry".to_owned(),
            grubenv_paths: vec!["env".into()],
            expand_variables: true,
        };

        let images = scan_with(&MemoryLogger::new(), &fs, Path::new("/esp"), &config)?;
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id(), "rhel");
        assert_eq!(images[0].method().cmdline(), "root=/dev/mapper/rhel-root ro");
        Ok(())
    }
}
