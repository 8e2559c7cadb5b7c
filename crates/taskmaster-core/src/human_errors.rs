// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the terminal menu.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives the colour used by the shell.

use crate::error::TaskMasterError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// User must do something (pick a file, fix a folder) before retrying.
    ActionRequired,
    /// The input itself is unusable; retrying the same file will not help.
    Permanent,
    /// Filesystem hiccup or similar; trying again may work.
    Transient,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown below the message).
    pub suggestion: String,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `TaskMasterError` into a `HumanError` for console display.
pub fn humanize_error(err: &TaskMasterError) -> HumanError {
    match err {
        TaskMasterError::NoSelection => HumanError {
            message: "Nothing was selected.".into(),
            suggestion: "Pick a file or folder from the numbered list.".into(),
            severity: Severity::ActionRequired,
        },

        TaskMasterError::NoMatchingFiles { folder, expected } => HumanError {
            message: format!("No {expected} files were found."),
            suggestion: format!("Put the files into {folder} and try again."),
            severity: Severity::ActionRequired,
        },

        TaskMasterError::UnsupportedFormat(detail) => HumanError {
            message: "This file type isn't supported.".into(),
            suggestion: format!("Convert the file to a supported format first. ({detail})"),
            severity: Severity::Permanent,
        },

        TaskMasterError::Decode(file) => HumanError {
            message: "The CSV file's text encoding couldn't be read.".into(),
            suggestion: format!("Re-save {file} as UTF-8 from your spreadsheet program."),
            severity: Severity::Permanent,
        },

        TaskMasterError::Spreadsheet(detail) => HumanError {
            message: "There's a problem with a spreadsheet.".into(),
            suggestion: format!("Check that the file opens in a spreadsheet program. ({detail})"),
            severity: Severity::Permanent,
        },

        TaskMasterError::PdfError(detail) => HumanError {
            message: "There's a problem with a PDF file.".into(),
            suggestion: format!("The file may be damaged or encrypted. ({detail})"),
            severity: Severity::Permanent,
        },

        TaskMasterError::ImageError(detail) => HumanError {
            message: "There's a problem with an image.".into(),
            suggestion: format!("Try saving it as a JPEG or PNG first. ({detail})"),
            severity: Severity::Permanent,
        },

        TaskMasterError::Exif(detail) => HumanError {
            message: "The image's metadata couldn't be read.".into(),
            suggestion: format!("The EXIF block may be damaged. ({detail})"),
            severity: Severity::Permanent,
        },

        TaskMasterError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Try choosing it again.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Permission denied.".into(),
                suggestion: "Check the permissions of the file and of the output folder.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                severity: Severity::Transient,
            },
        },

        TaskMasterError::Serialization(_) | TaskMasterError::Config(_) => HumanError {
            message: "The configuration file couldn't be used.".into(),
            suggestion: "Fix or delete taskmaster.json; defaults are used meanwhile.".into(),
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_selection_is_action_required() {
        let human = humanize_error(&TaskMasterError::NoSelection);
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn decode_failure_names_the_file() {
        let human = humanize_error(&TaskMasterError::Decode("data.csv".into()));
        assert_eq!(human.severity, Severity::Permanent);
        assert!(human.suggestion.contains("data.csv"));
    }

    #[test]
    fn not_found_is_action_required() {
        let err = TaskMasterError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }

    #[test]
    fn generic_io_is_transient() {
        let err = TaskMasterError::Io(std::io::Error::other("disk full"));
        assert_eq!(humanize_error(&err).severity, Severity::Transient);
    }
}
