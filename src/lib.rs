pub mod aggregate;
pub mod chart;
pub mod clean;
pub mod config;
pub mod console;
pub mod error;
pub mod load;
pub mod pipeline;
pub mod report;
pub mod select;
pub mod summary;

pub use aggregate::{compute_kpis, summarize_by_category, CategorySummary, Kpis};
pub use chart::render_chart;
pub use clean::{clean_dataset, Dataset, OrderId, Transaction};
pub use config::Config;
pub use error::{PipelineError, Result};
pub use load::{load_dataset, validate_columns, RawDataset, Schema, REQUIRED_COLUMNS};
pub use pipeline::{run, RunSummary};
pub use report::write_report;
pub use select::latest_input_file;
pub use summary::{print_summary, render_summary};
