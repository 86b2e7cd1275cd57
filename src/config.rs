use std::path::{Path, PathBuf};

const DATA_FOLDER: &str = "data";
const OUTPUT_FOLDER: &str = "output";
const INPUT_EXTENSION: &str = "xlsx";
const REPORT_NAME: &str = "Daily_Sales_Report.xlsx";
const CHART_NAME: &str = "revenue_chart.png";
const CURRENCY_SYMBOL: &str = "₹";

/// Locations and names used by a single pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Extension (without the dot) of the files considered as input.
    pub input_extension: String,
    pub report_name: String,
    pub chart_name: String,
    pub currency_symbol: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DATA_FOLDER),
            output_dir: PathBuf::from(OUTPUT_FOLDER),
            input_extension: INPUT_EXTENSION.to_string(),
            report_name: REPORT_NAME.to_string(),
            chart_name: CHART_NAME.to_string(),
            currency_symbol: CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl Config {
    pub fn new<I: AsRef<Path>, O: AsRef<Path>>(input_dir: I, output_dir: O) -> Self {
        Self {
            input_dir: input_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_report_name(mut self, name: impl Into<String>) -> Self {
        self.report_name = name.into();
        self
    }

    pub fn with_chart_name(mut self, name: impl Into<String>) -> Self {
        self.chart_name = name.into();
        self
    }

    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_name)
    }

    pub fn chart_path(&self) -> PathBuf {
        self.output_dir.join(&self.chart_name)
    }
}
