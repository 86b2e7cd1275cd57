use calamine::Data;
use time::{
    format_description::BorrowedFormatItem,
    macros::{datetime, format_description},
    Date, Duration, PrimitiveDateTime,
};
use tracing::debug;

use crate::load::{RawDataset, Schema};

pub const REVENUE: &str = "Revenue";

/// Day zero of the Excel 1900 date system, as used by every serial after 1900-02-28.
const EXCEL_EPOCH: PrimitiveDateTime = datetime!(1899-12-30 0:00);
/// Serial of 9999-12-31, the last date Excel can represent.
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

static EMPTY: Data = Data::Empty;

static DATE_FMTS: &[&[BorrowedFormatItem]] = &[
    format_description!("[year]-[month]-[day]"),
    format_description!("[year]/[month]/[day]"),
    format_description!("[month]/[day]/[year]"),
];
static DATETIME_FMTS: &[&[BorrowedFormatItem]] = &[
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
];

/// Opaque order identifier; integral numbers and their float spelling are one order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OrderId {
    Number(i64),
    /// Bit pattern of a non-integral number, kept apart from its text spelling.
    Float(u64),
    Text(String),
}

/// Where a report column takes its values from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    OrderId,
    Date,
    Product,
    Category,
    Quantity,
    Price,
    Revenue,
    /// Index into [`Transaction::extra`].
    Extra(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub order_id: OrderId,
    pub date: Option<PrimitiveDateTime>,
    pub product: Option<String>,
    pub category: String,
    pub quantity: f64,
    pub price: f64,
    pub revenue: f64,
    /// Cells of the columns outside the required set, untouched.
    pub extra: Vec<Data>,
}

/// Why rows were discarded; a row is counted under its first missing field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropCounts {
    pub order_id: usize,
    pub category: usize,
    pub quantity: usize,
    pub price: usize,
    /// Quantity times price overflowed the range of `f64`.
    pub revenue: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.order_id + self.category + self.quantity + self.price + self.revenue
    }
}

/// Cleaned rows. Every record has an order id, a category, a quantity and a price.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub layout: Vec<Column>,
    pub records: Vec<Transaction>,
    pub dropped: DropCounts,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Coerces every row of `raw` and keeps only the complete ones.
pub fn clean_dataset(raw: RawDataset, schema: &Schema) -> Dataset {
    let (mut columns, mut layout) = (Vec::new(), Vec::new());
    let mut extra_indices = Vec::new();
    for (pos, name) in raw.columns.iter().enumerate() {
        let column = match pos {
            p if p == schema.order_id => Column::OrderId,
            p if p == schema.date => Column::Date,
            p if p == schema.product => Column::Product,
            p if p == schema.category => Column::Category,
            p if p == schema.quantity => Column::Quantity,
            p if p == schema.price => Column::Price,
            _ if name == REVENUE && !layout.contains(&Column::Revenue) => Column::Revenue,
            _ => {
                extra_indices.push(pos);
                Column::Extra(extra_indices.len() - 1)
            }
        };
        columns.push(name.clone());
        layout.push(column);
    }
    if !layout.contains(&Column::Revenue) {
        columns.push(REVENUE.to_string());
        layout.push(Column::Revenue);
    }

    let mut dropped = DropCounts::default();
    let mut records = Vec::with_capacity(raw.rows.len());
    for row in raw.rows {
        let fields = (
            to_order_id(cell(&row, schema.order_id)),
            to_text(cell(&row, schema.category)),
            to_number(cell(&row, schema.quantity)),
            to_number(cell(&row, schema.price)),
        );
        let (order_id, category, quantity, price) = match fields {
            (Some(order_id), Some(category), Some(quantity), Some(price)) => {
                (order_id, category, quantity, price)
            }
            (None, ..) => {
                dropped.order_id += 1;
                continue;
            }
            (_, None, ..) => {
                dropped.category += 1;
                continue;
            }
            (_, _, None, _) => {
                dropped.quantity += 1;
                continue;
            }
            (.., None) => {
                dropped.price += 1;
                continue;
            }
        };
        let revenue = quantity * price;
        if !revenue.is_finite() {
            dropped.revenue += 1;
            continue;
        }

        records.push(Transaction {
            order_id,
            date: to_datetime(cell(&row, schema.date)),
            product: to_text(cell(&row, schema.product)),
            category,
            quantity,
            price,
            revenue,
            extra: extra_indices.iter().map(|&i| cell(&row, i).clone()).collect(),
        });
    }
    debug!(
        "kept {} rows, dropped {} ({:?})",
        records.len(),
        dropped.total(),
        dropped
    );

    Dataset {
        columns,
        layout,
        records,
        dropped,
    }
}

/// Text value of a cell; blank strings and error cells are missing.
pub fn to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            (!s.is_empty()).then(|| s.clone())
        }
        Data::Float(f) => Some(format_float(*f)),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => Some(format_float(dt.as_f64())),
    }
}

pub fn to_order_id(cell: &Data) -> Option<OrderId> {
    match cell {
        Data::Int(i) => Some(OrderId::Number(*i)),
        Data::Float(f) => Some(match integral(*f) {
            Some(i) => OrderId::Number(i),
            None => OrderId::Float(f.to_bits()),
        }),
        other => to_text(other).map(OrderId::Text),
    }
}

/// Numeric value of a cell; anything that is not a finite number is missing.
pub fn to_number(cell: &Data) -> Option<f64> {
    let value = match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// Date value of a cell; numbers are read as Excel serial dates.
pub fn to_datetime(cell: &Data) -> Option<PrimitiveDateTime> {
    match cell {
        Data::DateTime(dt) => from_excel_serial(dt.as_f64()),
        Data::Float(f) => from_excel_serial(*f),
        Data::Int(i) => from_excel_serial(*i as f64),
        Data::String(s) | Data::DateTimeIso(s) => parse_datetime(s.trim()),
        _ => None,
    }
}

pub fn parse_datetime(s: &str) -> Option<PrimitiveDateTime> {
    DATETIME_FMTS
        .iter()
        .find_map(|fmt| PrimitiveDateTime::parse(s, fmt).ok())
        .or_else(|| {
            DATE_FMTS
                .iter()
                .find_map(|fmt| Date::parse(s, fmt).ok())
                .map(Date::midnight)
        })
}

pub fn from_excel_serial(serial: f64) -> Option<PrimitiveDateTime> {
    if !serial.is_finite() || !(0.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let seconds = (serial * SECONDS_PER_DAY).round() as i64;
    EXCEL_EPOCH.checked_add(Duration::seconds(seconds))
}

pub fn to_excel_serial(dt: PrimitiveDateTime) -> f64 {
    (dt - EXCEL_EPOCH).as_seconds_f64() / SECONDS_PER_DAY
}

fn cell(row: &[Data], pos: usize) -> &Data {
    row.get(pos).unwrap_or(&EMPTY)
}

fn integral(f: f64) -> Option<i64> {
    // 2^53: beyond this not every integer is representable as f64
    (f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0).then_some(f as i64)
}

fn format_float(f: f64) -> String {
    match integral(f) {
        Some(i) => i.to_string(),
        None => f.to_string(),
    }
}
