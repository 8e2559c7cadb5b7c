// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spreadsheet merger — combine a folder of CSV/XLSX files into one workbook
// (one sheet per file) or one worksheet (rows stacked), and convert single
// files between CSV and XLSX.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use taskmaster_core::error::Result;
use taskmaster_core::inputs::collect_files;
use taskmaster_core::output::{self, OutputLayout, file_name_of, stem_of};
use tracing::{info, instrument};

use super::reader::{read_csv, read_table, read_xlsx};
use super::table::{Cell, SOURCE_COLUMN, Table};
use super::writer::{SheetNamer, SheetStyle, add_table_sheet, save_workbook, write_csv};

/// Result of a successful merge.
#[derive(Debug, Clone)]
pub struct MergeSummary {
    pub output: PathBuf,
    /// Sheet names in the order they were written.
    pub sheets: Vec<String>,
    /// Data rows written across all sheets (headers excluded).
    pub rows: usize,
}

/// Merges and converts spreadsheets into the output directory.
///
/// Merges are all-or-nothing: every input is loaded before anything is
/// written, so one unreadable file leaves no partial workbook behind.
pub struct SpreadsheetMerger {
    layout: OutputLayout,
}

impl SpreadsheetMerger {
    pub fn new(layout: OutputLayout) -> Self {
        Self { layout }
    }

    /// Every CSV/XLSX file in `folder` as its own sheet of
    /// `merged_workbook.xlsx`, each with a `Source File` column.
    #[instrument(skip_all, fields(folder = %folder.display()))]
    pub fn merge_workbook(&self, folder: &Path) -> Result<MergeSummary> {
        let sources = load_tagged_tables(folder)?;

        let mut namer = SheetNamer::new();
        let mut workbook = Workbook::new();
        let mut sheets = Vec::with_capacity(sources.len());
        let mut rows = 0;

        for (position, (path, table)) in sources.iter().enumerate() {
            let sheet_name = namer.assign(&stem_of(path), position + 1);
            add_table_sheet(&mut workbook, &sheet_name, table, SheetStyle::default())?;
            info!(file = %file_name_of(path), sheet = %sheet_name, "added file as sheet");
            rows += table.row_count();
            sheets.push(sheet_name);
        }

        let output = self.layout.file(output::MERGED_WORKBOOK)?;
        save_workbook(&mut workbook, &output)?;
        info!(output = %output.display(), sheets = sheets.len(), "all files merged into workbook");

        Ok(MergeSummary {
            output,
            sheets,
            rows,
        })
    }

    /// Every CSV/XLSX file in `folder` stacked into the single sheet `Sheet1`
    /// of `merged_worksheet.xlsx`. Columns are the union of all inputs.
    #[instrument(skip_all, fields(folder = %folder.display()))]
    pub fn merge_worksheet(&self, folder: &Path) -> Result<MergeSummary> {
        let sources = load_tagged_tables(folder)?;
        for (path, table) in &sources {
            info!(file = %file_name_of(path), rows = table.row_count(), "merged into single worksheet");
        }

        let combined = Table::stack(
            sources.into_iter().map(|(_, table)| table).collect(),
            Some(SOURCE_COLUMN),
        );

        let mut workbook = Workbook::new();
        add_table_sheet(&mut workbook, "Sheet1", &combined, SheetStyle::default())?;

        let output = self.layout.file(output::MERGED_WORKSHEET)?;
        save_workbook(&mut workbook, &output)?;
        info!(output = %output.display(), rows = combined.row_count(), "all files merged into single worksheet");

        Ok(MergeSummary {
            output,
            sheets: vec!["Sheet1".to_string()],
            rows: combined.row_count(),
        })
    }

    /// Convert a CSV file to `<stem>.xlsx` with a bold header and fitted
    /// column widths.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn csv_to_excel(&self, path: &Path) -> Result<PathBuf> {
        let table = read_csv(path)?;

        let mut workbook = Workbook::new();
        add_table_sheet(&mut workbook, "Sheet1", &table, SheetStyle { autofit: true })?;

        let output = self
            .layout
            .file(&output::converted_name(&stem_of(path), "xlsx"))?;
        save_workbook(&mut workbook, &output)?;
        info!(output = %output.display(), rows = table.row_count(), "CSV converted to XLSX");
        Ok(output)
    }

    /// Convert the first worksheet of an XLSX file to `<stem>.csv`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn excel_to_csv(&self, path: &Path) -> Result<PathBuf> {
        let table = read_xlsx(path)?;
        let output = self
            .layout
            .file(&output::converted_name(&stem_of(path), "csv"))?;
        write_csv(&table, &output)?;
        info!(output = %output.display(), rows = table.row_count(), "XLSX converted to CSV");
        Ok(output)
    }
}

/// Load every spreadsheet in `folder` (sorted) and tag its rows with the file
/// name. Fails on the first unreadable file.
fn load_tagged_tables(folder: &Path) -> Result<Vec<(PathBuf, Table)>> {
    let files = collect_files(folder, "CSV/XLSX", |kind| kind.is_spreadsheet())?;
    let mut tables = Vec::with_capacity(files.len());
    for path in files {
        let mut table = read_table(&path)?;
        table.fill_column(SOURCE_COLUMN, Cell::Text(file_name_of(&path)));
        tables.push((path, table));
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, open_workbook_auto};
    use taskmaster_core::TaskMasterError;

    fn write(dir: &Path, name: &str, text: &str) {
        std::fs::write(dir.join(name), text).unwrap();
    }

    fn read_sheet(path: &Path, sheet: &str) -> Vec<Vec<Data>> {
        let mut workbook = open_workbook_auto(path).unwrap();
        let range = workbook.worksheet_range(sheet).unwrap();
        range.rows().map(|r| r.to_vec()).collect()
    }

    #[test]
    fn workbook_gets_one_sheet_per_file() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(input.path(), "b.csv", "x,y\n1,2\n3,4\n5,6\n");
        write(input.path(), "a.csv", "x,y\n7,8\n");
        write(input.path(), "ignore.txt", "nope");

        let merger = SpreadsheetMerger::new(OutputLayout::new(out.path()));
        let summary = merger.merge_workbook(input.path()).unwrap();

        assert_eq!(summary.sheets, vec!["a", "b"]);
        assert_eq!(summary.rows, 4);
        assert!(summary.output.ends_with("merged_workbook.xlsx"));

        let rows = read_sheet(&summary.output, "b");
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0][2], Data::String("Source File".into()));
        assert!(rows[1..].iter().all(|r| r[2] == Data::String("b.csv".into())));
    }

    #[test]
    fn worksheet_stacks_rows() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(input.path(), "one.csv", "x,y\n1,2\n");
        write(input.path(), "two.csv", "x,z\n3,4\n5,6\n");

        let merger = SpreadsheetMerger::new(OutputLayout::new(out.path()));
        let summary = merger.merge_worksheet(input.path()).unwrap();
        assert_eq!(summary.rows, 3);

        let rows = read_sheet(&summary.output, "Sheet1");
        let header: Vec<String> = rows[0].iter().map(|d| d.to_string()).collect();
        assert_eq!(header, vec!["x", "y", "z", "Source File"]);
        assert_eq!(rows[1][2], Data::Empty);
        assert_eq!(rows[3][3], Data::String("two.csv".into()));
    }

    #[test]
    fn one_bad_file_aborts_the_merge() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(input.path(), "good.csv", "x\n1\n");
        write(input.path(), "bad.xlsx", "this is not a zip archive");

        let merger = SpreadsheetMerger::new(OutputLayout::new(out.path()));
        assert!(merger.merge_workbook(input.path()).is_err());
        assert!(!out.path().join("merged_workbook.xlsx").exists());
    }

    #[test]
    fn empty_folder_is_reported() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let merger = SpreadsheetMerger::new(OutputLayout::new(out.path()));
        let err = merger.merge_worksheet(input.path()).unwrap_err();
        assert!(matches!(err, TaskMasterError::NoMatchingFiles { .. }));
    }

    #[test]
    fn csv_to_excel_and_back() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(input.path(), "people.csv", "name,age\nAsha,31\nRavi,27\n");

        let merger = SpreadsheetMerger::new(OutputLayout::new(out.path()));
        let xlsx = merger.csv_to_excel(&input.path().join("people.csv")).unwrap();
        assert!(xlsx.ends_with("people.xlsx"));

        let rows = read_sheet(&xlsx, "Sheet1");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2][0], Data::String("Ravi".into()));
        assert_eq!(rows[2][1], Data::Float(27.0));

        let csv_path = merger.excel_to_csv(&xlsx).unwrap();
        let text = std::fs::read_to_string(csv_path).unwrap();
        assert_eq!(text, "name,age\nAsha,31\nRavi,27\n");
    }
}
