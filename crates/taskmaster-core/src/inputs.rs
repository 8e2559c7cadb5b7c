// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folder scanning for batch operations.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, TaskMasterError};
use crate::types::FileKind;

/// Regular files directly inside `folder` whose kind satisfies `accept`,
/// sorted by file name.
///
/// An empty result is `NoMatchingFiles`, labelled with `expected`.
pub fn collect_files(
    folder: &Path,
    expected: &str,
    accept: impl Fn(FileKind) -> bool,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if FileKind::from_path(&path).is_some_and(&accept) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(folder = %folder.display(), count = files.len(), "collected input files");

    if files.is_empty() {
        return Err(TaskMasterError::NoMatchingFiles {
            folder: folder.display().to_string(),
            expected: expected.to_string(),
        });
    }
    Ok(files)
}
