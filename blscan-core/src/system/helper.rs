// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Various helper functions for other modules.

use std::{
    ffi::OsStr,
    path::{Component, Path, PathBuf},
};

/// The reasons a path inside an entry cannot be placed under a filesystem root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RootedPathError {
    /// The path climbs above the root with `..`.
    EscapesRoot,

    /// The path resolves to the root itself.
    Empty,
}

/// Joins a path found inside an entry onto a filesystem root.
///
/// The path is treated as relative to `root` even if it begins with `/`, and is normalized lexically: `.` is
/// dropped, and `..` removes the previous component. This never touches the filesystem, so symlinks are not
/// followed.
///
/// # Errors
///
/// May return an `Error` if a `..` would climb above `root`, or if nothing remains of the path after normalizing.
pub(crate) fn join_under_root(root: &Path, path: &str) -> Result<PathBuf, RootedPathError> {
    let mut parts: Vec<&OsStr> = Vec::new();

    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(RootedPathError::EscapesRoot);
                }
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => (),
        }
    }

    if parts.is_empty() {
        return Err(RootedPathError::Empty);
    }

    let mut joined = root.to_path_buf();
    joined.extend(parts);
    Ok(joined)
}

/// Checks if a filename ends with a suffix, ignoring ASCII case.
#[must_use = "Has no effect if the result is unused"]
pub(crate) fn has_suffix_ignore_case(filename: &str, suffix: &str) -> bool {
    filename.len() >= suffix.len()
        && filename
            .get(filename.len() - suffix.len()..)
            .is_some_and(|end| end.eq_ignore_ascii_case(suffix))
}

/// Collapses every run of whitespace into a single space, and trims both ends.
#[must_use = "Has no effect if the result is unused"]
pub(crate) fn collapse_whitespace(str: &str) -> String {
    str.split_whitespace().collect::<Vec<_>>().join(" ")
}
