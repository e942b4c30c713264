//! The link sheet: one row per recorded job URL.
//!
//! An xlsx workbook with a `Links` sheet (header row plus data rows) and a
//! `Data` sheet listing the status choices. The `Status` column of `Links`
//! carries a dropdown validated against that list. Rows are read back with
//! `calamine`; every append rewrites the workbook through `rust_xlsxwriter`,
//! keeping whatever the user typed into `Status` and `Notes`.

use super::write_atomic;
use crate::error::StoreError;
use calamine::{Data, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::{DataValidation, Formula, Workbook, XlsxError};
use std::collections::HashSet;
use std::path::PathBuf;

pub const LINKS_SHEET: &str = "Links";
pub const DATA_SHEET: &str = "Data";

pub const SHEET_HEADERS: [&str; 7] = [
    "Date",
    "From",
    "Subject",
    "Job URL",
    "Gmail Permalink",
    "Status",
    "Notes",
];

const COLUMN_WIDTHS: [f64; 7] = [22.0, 38.0, 50.0, 85.0, 60.0, 14.0, 40.0];

pub const STATUS_CHOICES: [&str; 7] = [
    "",
    "To Review",
    "Applied",
    "Interview",
    "Offer",
    "Rejected",
    "On Hold",
];

/// `Data!A2:A8`, the status choices below the `Statuses` heading.
const STATUS_LIST: &str = "=Data!$A$2:$A$8";
const STATUS_COLUMN: u16 = 5;
/// Last zero-based row of the dropdown (`F2:F10000`).
const VALIDATED_LAST_ROW: u32 = 9_999;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRow {
    pub date: String,
    pub from: String,
    pub subject: String,
    pub job_url: String,
    pub permalink: String,
    pub status: String,
    pub notes: String,
}

impl LinkRow {
    fn cells(&self) -> [&str; 7] {
        [
            &self.date,
            &self.from,
            &self.subject,
            &self.job_url,
            &self.permalink,
            &self.status,
            &self.notes,
        ]
    }

    fn from_cells(cells: &[Data]) -> Self {
        let cell = |col: usize| cells.get(col).map(ToString::to_string).unwrap_or_default();
        Self {
            date: cell(0),
            from: cell(1),
            subject: cell(2),
            job_url: cell(3),
            permalink: cell(4),
            status: cell(5),
            notes: cell(6),
        }
    }
}

pub struct LinkSheet {
    path: PathBuf,
}

impl LinkSheet {
    /// Open the sheet at `path`, creating an empty workbook if none exists.
    pub fn ensure(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let sheet = Self { path: path.into() };
        if !sheet.path.exists() {
            tracing::info!(path = %sheet.path.display(), "creating link sheet");
            sheet.save(&[])?;
        }
        Ok(sheet)
    }

    /// Every non-empty `Job URL` cell, trimmed.
    pub fn existing_urls(&self) -> Result<HashSet<String>, StoreError> {
        Ok(self
            .rows()?
            .iter()
            .map(|row| row.job_url.trim())
            .filter(|url| !url.is_empty())
            .map(ToString::to_string)
            .collect())
    }

    /// Data rows of the `Links` sheet, header excluded, blank rows skipped.
    pub fn rows(&self) -> Result<Vec<LinkRow>, StoreError> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path).map_err(|e| self.unreadable(e))?;
        if !workbook.sheet_names().iter().any(|name| name == LINKS_SHEET) {
            return Err(StoreError::MissingSheet {
                path: self.path.clone(),
                sheet: LINKS_SHEET.to_string(),
            });
        }
        let range = workbook
            .worksheet_range(LINKS_SHEET)
            .map_err(|e| self.unreadable(e))?;
        Ok(range
            .rows()
            .skip(1)
            .filter(|cells| cells.iter().any(|c| !matches!(c, Data::Empty)))
            .map(LinkRow::from_cells)
            .collect())
    }

    pub fn append_rows(&self, rows: &[LinkRow]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut all = self.rows()?;
        all.extend_from_slice(rows);
        self.save(&all)
    }

    fn unreadable(&self, source: calamine::XlsxError) -> StoreError {
        StoreError::Workbook {
            path: self.path.clone(),
            source,
        }
    }

    fn save(&self, rows: &[LinkRow]) -> Result<(), StoreError> {
        let buffer = build_workbook(rows).map_err(|source| StoreError::WorkbookWrite {
            path: self.path.clone(),
            source,
        })?;
        write_atomic(&self.path, buffer)
    }
}

fn build_workbook(rows: &[LinkRow]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();

    let links = workbook.add_worksheet();
    links.set_name(LINKS_SHEET)?;
    for ((col, header), width) in (0u16..).zip(SHEET_HEADERS).zip(COLUMN_WIDTHS) {
        links.write_string(0, col, header)?;
        links.set_column_width(col, width)?;
    }
    for (row_num, row) in (1u32..).zip(rows) {
        for (col, value) in (0u16..).zip(row.cells()) {
            if !value.is_empty() {
                links.write_string(row_num, col, value)?;
            }
        }
    }
    let status_dropdown = DataValidation::new().allow_list_formula(Formula::new(STATUS_LIST));
    links.add_data_validation(
        1,
        STATUS_COLUMN,
        VALIDATED_LAST_ROW,
        STATUS_COLUMN,
        &status_dropdown,
    )?;

    let data = workbook.add_worksheet();
    data.set_name(DATA_SHEET)?;
    data.write_string(0, 0, "Statuses")?;
    for (row_num, status) in (1u32..).zip(STATUS_CHOICES) {
        if !status.is_empty() {
            data.write_string(row_num, 0, status)?;
        }
    }

    workbook.save_to_buffer()
}
