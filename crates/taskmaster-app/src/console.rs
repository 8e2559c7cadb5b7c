// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Terminal presentation: colours, logo, screen clearing, and the decorative
// spinner.

use std::io::Write;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use taskmaster_core::error::TaskMasterError;
use taskmaster_core::human_errors::{Severity, humanize_error};

const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[91m";
const YELLOW: &str = "\x1b[93m";
const CYAN: &str = "\x1b[96m";
const RESET: &str = "\x1b[0m";

const LOGO: &str = r"
  _____         _    __  __           _
 |_   _|_ _ ___| | _|  \/  | __ _ ___| |_ ___ _ __
   | |/ _` / __| |/ / |\/| |/ _` / __| __/ _ \ '__|
   | | (_| \__ \   <| |  | | (_| \__ \ ||  __/ |
   |_|\__,_|___/_|\_\_|  |_|\__,_|___/\__\___|_|
";

// Console writes are best effort; a closed stdout surfaces on the next read.

pub fn print_logo(out: &mut impl Write) {
    let _ = writeln!(out, "{CYAN}{LOGO}{RESET}");
    let _ = writeln!(out, "{CYAN}  Spreadsheets, images and PDFs, one menu away.{RESET}\n");
}

/// Clear the screen and home the cursor.
pub fn clear_screen(out: &mut impl Write) {
    let _ = write!(out, "\x1b[2J\x1b[H");
    let _ = out.flush();
}

pub fn print_menu_line(out: &mut impl Write, line: &str) {
    let _ = writeln!(out, "{GREEN}{line}{RESET}");
}

pub fn print_success(out: &mut impl Write, message: &str) {
    let _ = writeln!(out, "{GREEN}{message}{RESET}");
}

pub fn print_warning(out: &mut impl Write, message: &str) {
    let _ = writeln!(out, "{YELLOW}{message}{RESET}");
}

pub fn print_error(out: &mut impl Write, message: &str) {
    let _ = writeln!(out, "{RED}{message}{RESET}");
}

/// Print an error as plain English plus a suggestion.
pub fn print_failure(out: &mut impl Write, err: &TaskMasterError) {
    let human = humanize_error(err);
    let tag = match human.severity {
        Severity::ActionRequired => "Action needed",
        Severity::Permanent => "Failed",
        Severity::Transient => "Try again",
    };
    let _ = writeln!(out, "{RED}{tag}: {}{RESET}", human.message);
    let _ = writeln!(out, "{RED}  {}{RESET}", human.suggestion);
}

pub fn print_goodbye(out: &mut impl Write) {
    let _ = writeln!(out, "\n{GREEN}Goodbye!{RESET}");
    let _ = out.flush();
}

/// Purely decorative spinner shown before an operation starts. It does not
/// track progress; `duration_ms == 0` skips it.
pub fn decorative_spinner(label: &str, duration_ms: u64) {
    if duration_ms == 0 {
        return;
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(label.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    std::thread::sleep(Duration::from_millis(duration_ms));
    spinner.finish_and_clear();
}
