// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Filesystem capabilities for the parser and the scanner.
//!
//! Nothing in this crate touches [`std::fs`] directly. Instead, every read goes through the [`FileSystem`] trait,
//! which is implemented by [`StdFileSystem`] for the host filesystem and by [`MemFileSystem`] for in-memory fixtures.
//! This keeps the parser and the scanner testable without creating files on disk, and lets a frontend plug in
//! filesystems that are not mounted on the host at all (for example, an image that is read through a library).

use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
};

use thiserror::Error;

/// An error that may result from performing filesystem operations
#[derive(Error, Debug)]
pub enum FsError {
    /// A file could not be opened.
    #[error("Failed to open \"{}\": {source}", path.display())]
    OpenErr {
        /// The path of the file.
        path: PathBuf,

        /// The underlying error.
        source: io::Error,
    },

    /// A file could not be read.
    #[error("Failed to read \"{}\": {source}", path.display())]
    ReadErr {
        /// The path of the file.
        path: PathBuf,

        /// The underlying error.
        source: io::Error,
    },

    /// A directory could not be listed.
    #[error("Failed to list directory \"{}\": {source}", path.display())]
    ReadDirErr {
        /// The path of the directory.
        path: PathBuf,

        /// The underlying error.
        source: io::Error,
    },

    /// A path could not be made absolute.
    #[error("Failed to make \"{}\" absolute: {source}", path.display())]
    AbsoluteErr {
        /// The path that was attempted to be made absolute.
        path: PathBuf,

        /// The underlying error.
        source: io::Error,
    },
}

/// The read-only filesystem operations needed to parse and scan entries.
pub trait FileSystem {
    /// Reads the entire content of a file into a [`Vec<u8>`].
    ///
    /// # Errors
    ///
    /// May return an `Error` if the file could not be opened, or could not be read.
    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError>;

    /// Lists the names of the regular files in a directory, in no particular order.
    ///
    /// Subdirectories are not included, and neither are files whose names are not valid UTF-8.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the directory does not exist or could not be listed.
    fn list_files(&self, dir: &Path) -> Result<Vec<String>, FsError>;

    /// Makes a path absolute without touching the filesystem.
    ///
    /// The default implementation treats relative paths as relative to `/`.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the path could not be made absolute.
    fn absolute(&self, path: &Path) -> Result<PathBuf, FsError> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(Path::new("/").join(path))
        }
    }
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        (**self).read(path)
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<String>, FsError> {
        (**self).list_files(dir)
    }

    fn absolute(&self, path: &Path) -> Result<PathBuf, FsError> {
        (**self).absolute(path)
    }
}

/// The host filesystem, accessed through [`std::fs`].
#[derive(Clone, Copy, Debug, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        let mut file = File::open(path).map_err(|source| FsError::OpenErr {
            path: path.to_path_buf(),
            source,
        })?;

        let mut buf = Vec::new();
        file.read_to_end(&mut buf)
            .map_err(|source| FsError::ReadErr {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(buf)
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<String>, FsError> {
        let read_dir_err = |source| FsError::ReadDirErr {
            path: dir.to_path_buf(),
            source,
        };

        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(read_dir_err)? {
            let entry = entry.map_err(read_dir_err)?;

            // follows symlinks, so a link to an entry is still an entry
            if !entry.path().is_file() {
                continue;
            }

            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }

        Ok(names)
    }

    fn absolute(&self, path: &Path) -> Result<PathBuf, FsError> {
        std::path::absolute(path).map_err(|source| FsError::AbsoluteErr {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// An in-memory filesystem.
///
/// Every ancestor of an inserted file is a directory, as is every path added with [`Self::add_dir`]. Paths are
/// stored exactly as given, so fixtures should use absolute paths.
///
/// # Example
///
/// ```
/// use std::path::Path;
///
/// use blscan_core::system::fs::{FileSystem, MemFileSystem};
///
/// let fs = MemFileSystem::new()
///     .with_file("/boot/loader/entries/linux.conf", "linux /vmlinuz")
///     .with_dir("/boot/loader/empty");
///
/// assert_eq!(fs.list_files(Path::new("/boot/loader/entries"))?, ["linux.conf"]);
/// assert!(fs.list_files(Path::new("/boot/loader/empty"))?.is_empty());
/// # Ok::<(), blscan_core::system::fs::FsError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemFileSystem {
    /// The files, keyed by their full path.
    files: BTreeMap<PathBuf, Vec<u8>>,

    /// Every known directory.
    dirs: BTreeSet<PathBuf>,
}

impl MemFileSystem {
    /// Creates an empty [`MemFileSystem`].
    #[must_use = "Has no effect if the result is unused"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a file, replacing any previous content, and registers its ancestors as directories.
    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files.insert(path, content.into());
    }

    /// Registers a directory and its ancestors, so that an empty directory can be listed.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        for ancestor in path.as_ref().ancestors() {
            self.dirs.insert(ancestor.to_path_buf());
        }
    }

    /// Builder style version of [`Self::add_file`].
    #[must_use = "Has no effect if the result is unused"]
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.add_file(path, content);
        self
    }

    /// Builder style version of [`Self::add_dir`].
    #[must_use = "Has no effect if the result is unused"]
    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.add_dir(path);
        self
    }
}

impl FileSystem for MemFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FsError::OpenErr {
                path: path.to_path_buf(),
                source: io::ErrorKind::NotFound.into(),
            })
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<String>, FsError> {
        if !self.dirs.contains(dir) {
            return Err(FsError::ReadDirErr {
                path: dir.to_path_buf(),
                source: io::ErrorKind::NotFound.into(),
            });
        }

        Ok(self
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .filter_map(|path| path.file_name()?.to_str())
            .map(ToOwned::to_owned)
            .collect())
    }
}
