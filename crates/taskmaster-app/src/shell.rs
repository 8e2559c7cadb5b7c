// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interactive numbered-menu shell.
//
// Generic over its input and output so the whole menu tree runs against
// in-memory buffers in tests.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use taskmaster_core::error::Result;
use taskmaster_core::output::file_name_of;
use taskmaster_core::{AppConfig, ImageTarget, OutputLayout};
use taskmaster_document::{ImageHandler, PdfHandler, SpreadsheetMerger};
use tracing::{error, info};

use crate::console;
use crate::picker::{self, Filter, Picker};

/// The façades, built once from the config.
struct Tools {
    config: AppConfig,
    pdf: PdfHandler,
    images: ImageHandler,
    sheets: SpreadsheetMerger,
}

pub struct Shell<R, W> {
    input: R,
    out: W,
    picker: Picker,
    tools: Tools,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, out: W, config: AppConfig, workdir: PathBuf) -> Self {
        let layout = OutputLayout::from_config(&config);
        let tools = Tools {
            pdf: PdfHandler::new(layout.clone()),
            images: ImageHandler::from_config(layout.clone(), &config),
            sheets: SpreadsheetMerger::new(layout),
            config,
        };
        Self {
            input,
            out,
            picker: Picker::new(workdir),
            tools,
        }
    }

    /// Main loop. Returns on `0` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        if self.tools.config.clear_screen {
            console::clear_screen(&mut self.out);
        }
        console::print_logo(&mut self.out);

        loop {
            let choice = self.menu(
                "Main menu:",
                &["1. PDF tools", "2. Image tools", "3. Spreadsheet tools", "0. Exit"],
            )?;
            match choice.as_deref() {
                None | Some("0") => break,
                Some("1") => self.pdf_menu()?,
                Some("2") => self.image_menu()?,
                Some("3") => self.sheet_menu()?,
                Some(other) => self.invalid(other),
            }
        }

        info!("exiting the program");
        console::print_goodbye(&mut self.out);
        Ok(())
    }

    // -- Submenus ---------------------------------------------------------------

    fn pdf_menu(&mut self) -> io::Result<()> {
        loop {
            let choice = self.menu(
                "PDF tools:",
                &[
                    "1. Split into single pages",
                    "2. Merge a folder of PDFs",
                    "3. Remove blank pages",
                    "4. Compress",
                    "5. Images in a folder to PDF",
                    "0. Back",
                ],
            )?;
            match choice.as_deref() {
                None | Some("0") => return Ok(()),
                Some("1") => {
                    let Some(path) = self.pick(picker::PDF)? else { continue };
                    let result = self.run_op("Splitting", |t| t.pdf.split(&path));
                    self.report(result, |files| {
                        format!("Split into {} files in the split folder.", files.len())
                    });
                }
                Some("2") => {
                    let Some(folder) = self.pick(Filter::Folders)? else { continue };
                    let result = self.run_op("Merging", |t| t.pdf.merge(&folder));
                    if let Ok(report) = &result {
                        for (path, reason) in &report.skipped {
                            console::print_warning(
                                &mut self.out,
                                &format!("Skipped {}: {}", file_name_of(path), reason),
                            );
                        }
                    }
                    self.report(result, |report| {
                        format!(
                            "Merged {} pages from {} files into {}",
                            report.pages,
                            report.merged.len(),
                            report.output.display()
                        )
                    });
                }
                Some("3") => {
                    let Some(path) = self.pick(picker::PDF)? else { continue };
                    let result = self.run_op("Removing blank pages", |t| t.pdf.remove_blank(&path));
                    self.report(result, |report| {
                        format!(
                            "Removed {} blank pages, kept {}: {}",
                            report.removed,
                            report.kept,
                            report.output.display()
                        )
                    });
                }
                Some("4") => {
                    let Some(path) = self.pick(picker::PDF)? else { continue };
                    let result = self.run_op("Compressing", |t| t.pdf.compress_pdf(&path));
                    self.report(result, |report| {
                        format!(
                            "Compressed {} bytes to {} bytes: {}",
                            report.original_bytes,
                            report.compressed_bytes,
                            report.output.display()
                        )
                    });
                }
                Some("5") => {
                    let Some(folder) = self.pick(Filter::Folders)? else { continue };
                    let result = self.run_op("Building PDF", |t| t.pdf.images_to_pdf(&folder));
                    self.report(result, |output| format!("Created {}", output.display()));
                }
                Some(other) => self.invalid(other),
            }
        }
    }

    fn image_menu(&mut self) -> io::Result<()> {
        loop {
            let choice = self.menu(
                "Image tools:",
                &[
                    "1. Extract EXIF data",
                    "2. Remove EXIF data",
                    "3. Compress",
                    "4. Resize",
                    "5. Convert format",
                    "6. Convert a whole folder",
                    "7. Images to captioned PDF",
                    "0. Back",
                ],
            )?;
            match choice.as_deref() {
                None | Some("0") => return Ok(()),
                Some("1") => {
                    let Some(path) = self.pick(picker::IMAGES)? else { continue };
                    match self.run_op("Reading EXIF", |t| t.images.extract_exif_data(&path)) {
                        Ok(true) => console::print_success(
                            &mut self.out,
                            &format!("EXIF data of {} saved in the exif_data folder.", file_name_of(&path)),
                        ),
                        Ok(false) => console::print_warning(
                            &mut self.out,
                            &format!("No EXIF data found in {}.", file_name_of(&path)),
                        ),
                        Err(err) => self.failure(&err),
                    }
                }
                Some("2") => {
                    let Some(path) = self.pick(picker::IMAGES)? else { continue };
                    let result = self.run_op("Removing EXIF", |t| t.images.remove_exif_data(&path));
                    self.report(result, |output| format!("Saved {}", output.display()));
                }
                Some("3") => {
                    let Some(path) = self.pick(picker::IMAGES)? else { continue };
                    let default = self.tools.images.default_quality();
                    let Some(quality) = self.ask_number("JPEG quality 1-100", default)? else { continue };
                    let result = self.run_op("Compressing", |t| t.images.compress_image(&path, quality));
                    self.report(result, |output| format!("Saved {}", output.display()));
                }
                Some("4") => {
                    let Some(path) = self.pick(picker::IMAGES)? else { continue };
                    let Some(width) = self.ask_number("Max width", 1920_u32)? else { continue };
                    let Some(height) = self.ask_number("Max height", 1080_u32)? else { continue };
                    let result =
                        self.run_op("Resizing", |t| t.images.resize_image(&path, width, height));
                    self.report(result, |output| format!("Saved {}", output.display()));
                }
                Some("5") => {
                    let Some(path) = self.pick(picker::IMAGES)? else { continue };
                    let Some(target) = self.pick_target()? else { continue };
                    let result = self.run_op("Converting", |t| t.images.convert_format(&path, target));
                    self.report(result, |output| format!("Saved {}", output.display()));
                }
                Some("6") => {
                    let Some(folder) = self.pick(Filter::Folders)? else { continue };
                    let Some(target) = self.pick_target()? else { continue };
                    let result = self.run_op("Converting folder", |t| {
                        t.images.batch_convert_format(&folder, target)
                    });
                    if let Ok(report) = &result {
                        for (path, reason) in &report.failed {
                            console::print_error(
                                &mut self.out,
                                &format!("Could not convert {}: {}", file_name_of(path), reason),
                            );
                        }
                    }
                    self.report(result, |report| {
                        format!(
                            "Converted {} images ({} failed) into the converted folder.",
                            report.converted.len(),
                            report.failed.len()
                        )
                    });
                }
                Some("7") => {
                    let Some(folder) = self.pick(Filter::Folders)? else { continue };
                    let default = format!("{}_captioned", file_name_of(&folder));
                    let Some(name) = self.ask_text("Output file name", &default)? else { continue };
                    let result = self.run_op("Building booklet", |t| {
                        t.images.images_to_pdf_with_filenames(&folder, &name)
                    });
                    self.report(result, |output| format!("Created {}", output.display()));
                }
                Some(other) => self.invalid(other),
            }
        }
    }

    /// Merges act on one chosen folder for the whole visit to this menu.
    fn sheet_menu(&mut self) -> io::Result<()> {
        let mut folder: Option<PathBuf> = None;
        loop {
            if let Some(current) = &folder {
                let line = format!("Folder: {}", file_name_of(current));
                console::print_menu_line(&mut self.out, &line);
            }
            let choice = self.menu(
                "Spreadsheet tools:",
                &[
                    "1. Merge workbook (one sheet per file)",
                    "2. Merge worksheet (single sheet)",
                    "3. CSV to XLSX",
                    "4. XLSX to CSV",
                    "5. Choose another folder",
                    "0. Back",
                ],
            )?;
            match choice.as_deref() {
                None | Some("0") => return Ok(()),
                Some(merge @ ("1" | "2")) => {
                    if folder.is_none() {
                        folder = self.pick(Filter::Folders)?;
                    }
                    let Some(dir) = folder.clone() else { continue };
                    let result = if merge == "1" {
                        self.run_op("Merging workbook", |t| t.sheets.merge_workbook(&dir))
                    } else {
                        self.run_op("Merging worksheet", |t| t.sheets.merge_worksheet(&dir))
                    };
                    self.report(result, |summary| {
                        format!(
                            "Wrote {} rows in {} sheet(s) to {}",
                            summary.rows,
                            summary.sheets.len(),
                            summary.output.display()
                        )
                    });
                }
                Some("3") => {
                    let Some(path) = self.pick(picker::CSV)? else { continue };
                    let result = self.run_op("Converting", |t| t.sheets.csv_to_excel(&path));
                    self.report(result, |output| format!("Saved {}", output.display()));
                }
                Some("4") => {
                    let Some(path) = self.pick(picker::XLSX)? else { continue };
                    let result = self.run_op("Converting", |t| t.sheets.excel_to_csv(&path));
                    self.report(result, |output| format!("Saved {}", output.display()));
                }
                Some("5") => folder = self.pick(Filter::Folders)?,
                Some(other) => self.invalid(other),
            }
        }
    }

    // -- Helpers ----------------------------------------------------------------

    /// Print a titled menu and read the choice. `None` on end of input.
    fn menu(&mut self, title: &str, items: &[&str]) -> io::Result<Option<String>> {
        writeln!(self.out)?;
        console::print_menu_line(&mut self.out, title);
        for item in items {
            console::print_menu_line(&mut self.out, item);
        }
        self.ask("Enter the number of the option: ")
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask for free text; empty input takes `default`.
    fn ask_text(&mut self, label: &str, default: &str) -> io::Result<Option<String>> {
        let answer = self.ask(&format!("{label} [{default}]: "))?;
        Ok(answer.map(|text| if text.is_empty() { default.to_string() } else { text }))
    }

    /// Ask for a number until one parses; empty input takes `default`.
    fn ask_number<T>(&mut self, label: &str, default: T) -> io::Result<Option<T>>
    where
        T: FromStr + std::fmt::Display + Copy,
    {
        loop {
            let Some(text) = self.ask(&format!("{label} [{default}]: "))? else {
                return Ok(None);
            };
            if text.is_empty() {
                return Ok(Some(default));
            }
            match text.parse() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => console::print_error(&mut self.out, "Please enter a number."),
            }
        }
    }

    fn pick(&mut self, filter: Filter) -> io::Result<Option<PathBuf>> {
        self.picker.choose(filter, &mut self.input, &mut self.out)
    }

    fn pick_target(&mut self) -> io::Result<Option<ImageTarget>> {
        console::print_menu_line(&mut self.out, "Target format:");
        for (index, target) in ImageTarget::ALL.iter().enumerate() {
            console::print_menu_line(&mut self.out, &format!("{}. {}", index + 1, target.label()));
        }
        console::print_menu_line(&mut self.out, "0. Cancel");
        loop {
            let Some(text) = self.ask("Enter the number of the format: ")? else {
                return Ok(None);
            };
            match text.parse::<usize>() {
                Ok(0) => return Ok(None),
                Ok(n) if n <= ImageTarget::ALL.len() => return Ok(Some(ImageTarget::ALL[n - 1])),
                _ => self.invalid(&text),
            }
        }
    }

    /// Show the decorative spinner, then run one façade call.
    fn run_op<T>(&mut self, label: &str, op: impl FnOnce(&Tools) -> Result<T>) -> Result<T> {
        let _ = self.out.flush();
        console::decorative_spinner(label, self.tools.config.progress_animation_ms);
        op(&self.tools)
    }

    fn report<T>(&mut self, result: Result<T>, describe: impl FnOnce(&T) -> String) {
        match result {
            Ok(value) => {
                let message = describe(&value);
                info!("{message}");
                console::print_success(&mut self.out, &message);
            }
            Err(err) => self.failure(&err),
        }
    }

    fn failure(&mut self, err: &taskmaster_core::TaskMasterError) {
        error!(%err, "operation failed");
        console::print_failure(&mut self.out, err);
    }

    fn invalid(&mut self, choice: &str) {
        info!(choice, "invalid menu choice");
        console::print_error(&mut self.out, "Invalid choice. Please enter a valid option.");
    }
}
