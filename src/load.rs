use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::debug;

use crate::{PipelineError, Result};

pub const ORDER_ID: &str = "OrderID";
pub const DATE: &str = "Date";
pub const PRODUCT: &str = "Product";
pub const CATEGORY: &str = "Category";
pub const QUANTITY: &str = "Quantity";
pub const PRICE: &str = "Price";

pub const REQUIRED_COLUMNS: [&str; 6] = [ORDER_ID, DATE, PRODUCT, CATEGORY, QUANTITY, PRICE];

/// Sheet contents as read from disk, before any coercion.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    pub columns: Vec<String>,
    /// Every row is exactly `columns.len()` cells wide.
    pub rows: Vec<Vec<Data>>,
}

/// Position of each required column in a [`RawDataset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub order_id: usize,
    pub date: usize,
    pub product: usize,
    pub category: usize,
    pub quantity: usize,
    pub price: usize,
}

/// Reads the first worksheet of `file_path`; its first row names the columns.
pub fn load_dataset<P: AsRef<Path>>(file_path: P) -> Result<RawDataset> {
    let path = file_path.as_ref();
    let load_failure = |source| PipelineError::LoadFailure {
        path: path.to_path_buf(),
        source,
    };

    let mut spreadsheet = open_workbook_auto(path).map_err(load_failure)?;
    let range = spreadsheet
        .worksheet_range_at(0)
        .ok_or(calamine::Error::Msg("workbook contains no worksheets"))
        .and_then(|r| r)
        .map_err(load_failure)?;

    let Some(columns) = range.headers() else {
        debug!("first worksheet of {} is empty", path.display());
        return Ok(RawDataset::default());
    };
    let width = columns.len();
    let rows = range
        .rows()
        .skip(1)
        .map(|r| {
            let mut row = r.to_vec();
            row.resize(width, Data::Empty);
            row
        })
        .collect();
    debug!("columns in {}: {:?}", path.display(), columns);

    Ok(RawDataset { columns, rows })
}

/// Checks that every required column is present.
///
/// Fails with the missing names, in the order of [`REQUIRED_COLUMNS`].
pub fn validate_columns(columns: &[String]) -> Result<Schema> {
    let position = |name: &str| columns.iter().position(|c| c == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| position(name).is_none())
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::SchemaMismatch { missing });
    }

    let required = |name: &'static str| {
        position(name).ok_or_else(|| PipelineError::SchemaMismatch {
            missing: vec![name.to_string()],
        })
    };
    Ok(Schema {
        order_id: required(ORDER_ID)?,
        date: required(DATE)?,
        product: required(PRODUCT)?,
        category: required(CATEGORY)?,
        quantity: required(QUANTITY)?,
        price: required(PRICE)?,
    })
}
