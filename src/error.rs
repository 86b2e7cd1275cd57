use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Boxed cause for failures that can originate from more than one library.
pub type Cause = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no .{extension} files found in {}", dir.display())]
    NoInputFound { dir: PathBuf, extension: String },

    #[error("failed to load input file {}", path.display())]
    LoadFailure {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("missing columns: {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    #[error("failed to write report {}", path.display())]
    ReportWriteFailure {
        path: PathBuf,
        #[source]
        source: Cause,
    },

    #[error("failed to render chart {}: {message}", path.display())]
    ChartRenderFailure { path: PathBuf, message: String },
}

impl PipelineError {
    /// Every failure aborts the run except a chart that could not be drawn.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PipelineError::ChartRenderFailure { .. })
    }

    pub(crate) fn report_write(path: impl Into<PathBuf>, source: impl Into<Cause>) -> Self {
        PipelineError::ReportWriteFailure {
            path: path.into(),
            source: source.into(),
        }
    }
}
