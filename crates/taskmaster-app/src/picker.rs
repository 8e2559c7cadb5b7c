// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Numbered file/folder picker over the working directory.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use taskmaster_core::output::extension_of;
use tracing::debug;

use crate::console;

/// What the picker lists.
#[derive(Debug, Clone, Copy)]
pub enum Filter {
    /// Regular files with one of these lowercase extensions.
    Extensions(&'static [&'static str]),
    /// Directories only.
    Folders,
}

pub const PDF: Filter = Filter::Extensions(&["pdf"]);
pub const IMAGES: Filter = Filter::Extensions(&[
    "jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff", "webp", "ico",
]);
pub const CSV: Filter = Filter::Extensions(&["csv"]);
pub const XLSX: Filter = Filter::Extensions(&["xlsx"]);

impl Filter {
    fn accepts(&self, path: &Path) -> bool {
        match self {
            Self::Folders => path.is_dir(),
            Self::Extensions(exts) => path.is_file() && exts.contains(&extension_of(path).as_str()),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Folders => "folders".to_string(),
            Self::Extensions(exts) => format!(".{} files", exts.join("/.")),
        }
    }
}

pub struct Picker {
    root: PathBuf,
}

impl Picker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Matching entries of the root, sorted by name. Hidden entries are
    /// skipped.
    pub fn entries(&self, filter: Filter) -> io::Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let path = entry.path();
            if filter.accepts(&path) {
                entries.push(path);
            }
        }
        entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(entries)
    }

    /// List the entries and read a 1-based choice.
    ///
    /// `0` or end of input cancels. Anything else that is not a listed number
    /// re-prompts.
    pub fn choose<R: BufRead, W: Write>(
        &self,
        filter: Filter,
        input: &mut R,
        out: &mut W,
    ) -> io::Result<Option<PathBuf>> {
        let entries = self.entries(filter)?;
        if entries.is_empty() {
            console::print_warning(
                out,
                &format!("No {} found in {}.", filter.describe(), self.root.display()),
            );
            return Ok(None);
        }

        console::print_menu_line(out, &format!("Available {}:", filter.describe()));
        for (index, path) in entries.iter().enumerate() {
            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            console::print_menu_line(out, &format!("{}. {}", index + 1, name));
        }
        console::print_menu_line(out, "0. Cancel");

        loop {
            write!(out, "Enter the number of your choice: ")?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(None);
            }

            match line.trim().parse::<usize>() {
                Ok(0) => return Ok(None),
                Ok(n) if n <= entries.len() => {
                    let chosen = entries[n - 1].clone();
                    debug!(path = %chosen.display(), "picked");
                    return Ok(Some(chosen));
                }
                _ => console::print_error(
                    out,
                    &format!("Invalid choice. Enter a number between 0 and {}.", entries.len()),
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"").unwrap();
        std::fs::write(dir.path().join("a.PDF"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();
        std::fs::write(dir.path().join(".hidden.pdf"), b"").unwrap();
        std::fs::create_dir(dir.path().join("scans")).unwrap();
        dir
    }

    fn choose(dir: &Path, filter: Filter, typed: &str) -> (Option<PathBuf>, String) {
        let mut input = Cursor::new(typed.as_bytes().to_vec());
        let mut out = Vec::new();
        let chosen = Picker::new(dir).choose(filter, &mut input, &mut out).unwrap();
        (chosen, String::from_utf8(out).unwrap())
    }

    #[test]
    fn lists_sorted_matches_only() {
        let dir = fixture();
        let entries = Picker::new(dir.path()).entries(PDF).unwrap();
        let names: Vec<_> = entries
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);

        let folders = Picker::new(dir.path()).entries(Filter::Folders).unwrap();
        assert_eq!(folders.len(), 1);
        assert!(folders[0].ends_with("scans"));
    }

    #[test]
    fn picks_by_number() {
        let dir = fixture();
        let (chosen, _) = choose(dir.path(), PDF, "2\n");
        assert!(chosen.unwrap().ends_with("b.pdf"));
    }

    #[test]
    fn invalid_input_reprompts() {
        let dir = fixture();
        let (chosen, out) = choose(dir.path(), PDF, "abc\n9\n1\n");
        assert!(chosen.unwrap().ends_with("a.PDF"));
        assert_eq!(out.matches("Invalid choice").count(), 2);
    }

    #[test]
    fn zero_and_eof_cancel() {
        let dir = fixture();
        assert!(choose(dir.path(), PDF, "0\n").0.is_none());
        assert!(choose(dir.path(), PDF, "").0.is_none());
    }

    #[test]
    fn empty_listing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let (chosen, out) = choose(dir.path(), CSV, "1\n");
        assert!(chosen.is_none());
        assert!(out.contains("No .csv files found"));
    }
}
