use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use calamine::Data;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{
    aggregate::CategorySummary,
    clean::{to_excel_serial, Column, Dataset, OrderId, Transaction},
    PipelineError, Result,
};

pub const RAW_DATA_SHEET: &str = "Raw_Data";
pub const CATEGORY_SHEET: &str = "Revenue_By_Category";

const DATE_NUM_FMT: &str = "yyyy-mm-dd hh:mm:ss";
const AMOUNT_NUM_FMT: &str = "#,##0.00";
const OVERFLOW_MARKER: &str = "#NUM!";

struct Formats {
    header: Format,
    date: Format,
    amount: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            date: Format::new().set_num_format(DATE_NUM_FMT),
            amount: Format::new().set_num_format(AMOUNT_NUM_FMT),
        }
    }
}

/// Writes the cleaned rows and the category rollup as a two-sheet workbook.
///
/// The workbook is written to a temporary file next to `file_path` and moved
/// over it once complete, so a failed run never leaves a truncated report.
pub fn write_report<P: AsRef<Path>>(
    dataset: &Dataset,
    summary: &[CategorySummary],
    file_path: P,
) -> Result<()> {
    let path = file_path.as_ref();
    let buffer = build_workbook(dataset, summary)
        .and_then(|mut workbook| workbook.save_to_buffer())
        .map_err(|e| PipelineError::report_write(path, e))?;

    let dir = parent_dir(path);
    fs::create_dir_all(&dir).map_err(|e| PipelineError::report_write(path, e))?;
    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| PipelineError::report_write(path, e))?;
    tmp.write_all(&buffer)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| PipelineError::report_write(path, e))?;
    tmp.persist(path)
        .map_err(|e| PipelineError::report_write(path, e.error))?;

    debug!("report written: {} bytes to {}", buffer.len(), path.display());
    Ok(())
}

/// Directory that will hold `path`; `.` for a bare file name.
pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn build_workbook(
    dataset: &Dataset,
    summary: &[CategorySummary],
) -> std::result::Result<Workbook, XlsxError> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet().set_name(RAW_DATA_SHEET)?;
    write_header(sheet, &dataset.columns, &formats)?;
    for (i, record) in dataset.records.iter().enumerate() {
        let row = i as u32 + 1;
        for (col, column) in dataset.layout.iter().enumerate() {
            write_field(sheet, row, col as u16, record, *column, &formats)?;
        }
    }
    sheet.autofit();

    let sheet = workbook.add_worksheet().set_name(CATEGORY_SHEET)?;
    write_header(sheet, &["Category", "Revenue", "Orders"], &formats)?;
    for (i, c) in summary.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, &c.category)?;
        write_amount(sheet, row, 1, c.revenue, &formats)?;
        sheet.write_number(row, 2, c.orders as f64)?;
    }
    sheet.autofit();

    Ok(workbook)
}

fn write_header<S: AsRef<str>>(
    sheet: &mut Worksheet,
    names: &[S],
    formats: &Formats,
) -> std::result::Result<(), XlsxError> {
    for (col, name) in names.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name.as_ref(), &formats.header)?;
    }
    Ok(())
}

fn write_field(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    record: &Transaction,
    column: Column,
    formats: &Formats,
) -> std::result::Result<(), XlsxError> {
    match column {
        Column::OrderId => match &record.order_id {
            OrderId::Number(n) => sheet.write_number(row, col, *n as f64)?,
            OrderId::Float(bits) => sheet.write_number(row, col, f64::from_bits(*bits))?,
            OrderId::Text(s) => sheet.write_string(row, col, s)?,
        },
        Column::Date => {
            let Some(dt) = record.date else {
                return Ok(());
            };
            sheet.write_number_with_format(row, col, to_excel_serial(dt), &formats.date)?
        }
        Column::Product => {
            let Some(product) = &record.product else {
                return Ok(());
            };
            sheet.write_string(row, col, product)?
        }
        Column::Category => sheet.write_string(row, col, &record.category)?,
        Column::Quantity => sheet.write_number(row, col, record.quantity)?,
        Column::Price => sheet.write_number(row, col, record.price)?,
        Column::Revenue => {
            write_amount(sheet, row, col, record.revenue, formats)?;
            return Ok(());
        }
        Column::Extra(i) => {
            if let Some(cell) = record.extra.get(i) {
                write_cell(sheet, row, col, cell, formats)?;
            }
            return Ok(());
        }
    };
    Ok(())
}

/// A sum that overflowed `f64` has no number representation in the workbook.
fn write_amount(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    amount: f64,
    formats: &Formats,
) -> std::result::Result<(), XlsxError> {
    if amount.is_finite() {
        sheet.write_number_with_format(row, col, amount, &formats.amount)?;
    } else {
        sheet.write_string(row, col, OVERFLOW_MARKER)?;
    }
    Ok(())
}

/// Passes an untouched input cell through to the report.
fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Data,
    formats: &Formats,
) -> std::result::Result<(), XlsxError> {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            sheet.write_string(row, col, s)?
        }
        Data::Float(f) => sheet.write_number(row, col, *f)?,
        Data::Int(i) => sheet.write_number(row, col, *i as f64)?,
        Data::Bool(b) => sheet.write_boolean(row, col, *b)?,
        Data::DateTime(dt) => {
            sheet.write_number_with_format(row, col, dt.as_f64(), &formats.date)?
        }
        Data::Error(_) | Data::Empty => return Ok(()),
    };
    Ok(())
}
