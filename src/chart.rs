use std::path::Path;

use plotters::prelude::*;
use tempfile::Builder;
use tracing::debug;

use crate::{aggregate::CategorySummary, report::parent_dir, PipelineError, Result};

const CHART_SIZE: (u32, u32) = (700, 400);
const TITLE: &str = "Revenue by Category";

type DrawResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Draws one bar per category, bar height being the summed revenue.
///
/// The image is rendered beside `file_path` and only moved into place once
/// complete.
pub fn render_chart<P: AsRef<Path>>(summary: &[CategorySummary], file_path: P) -> Result<()> {
    let path = file_path.as_ref();
    let failure = |message: String| PipelineError::ChartRenderFailure {
        path: path.to_path_buf(),
        message,
    };

    if let Some(c) = summary.iter().find(|c| !c.revenue.is_finite()) {
        return Err(failure(format!(
            "revenue of category {} is not a finite number",
            c.category
        )));
    }

    let suffix = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let tmp = Builder::new()
        .prefix(".chart")
        .suffix(&suffix)
        .tempfile_in(parent_dir(path))
        .map_err(|e| failure(e.to_string()))?;

    draw(summary, tmp.path()).map_err(|e| failure(e.to_string()))?;
    tmp.persist(path).map_err(|e| failure(e.error.to_string()))?;

    debug!("chart with {} bars written to {}", summary.len(), path.display());
    Ok(())
}

fn draw(summary: &[CategorySummary], path: &Path) -> DrawResult<()> {
    let labels: Vec<&str> = summary.iter().map(|c| c.category.as_str()).collect();
    let (low, high) = value_range(summary);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d((0..labels.len().max(1)).into_segmented(), low..high)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Category")
        .y_desc("Revenue")
        .x_labels(labels.len().max(1))
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).map(|l| l.to_string()).unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.filled())
            .margin(10)
            .data(summary.iter().enumerate().map(|(i, c)| (i, c.revenue))),
    )?;

    root.present()?;
    Ok(())
}

/// Value axis bounds; always spans zero so bars grow from the axis.
fn value_range(summary: &[CategorySummary]) -> (f64, f64) {
    let max = summary.iter().map(|c| c.revenue).fold(0., f64::max);
    let min = summary.iter().map(|c| c.revenue).fold(0., f64::min);
    let high = if max > 0. { max * 1.1 } else { 1. };
    let low = if min < 0. { min * 1.1 } else { 0. };
    (low, high)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> Vec<CategorySummary> {
        vec![
            CategorySummary {
                category: "Home".to_string(),
                revenue: 40.,
                orders: 3,
            },
            CategorySummary {
                category: "Tools".to_string(),
                revenue: 25.,
                orders: 2,
            },
        ]
    }

    #[test]
    fn value_axis_covers_zero_and_the_tallest_bar() {
        let (low, high) = value_range(&summary());
        assert_eq!(low, 0.);
        assert!((high - 44.).abs() < 1e-9);

        assert_eq!(value_range(&[]), (0., 1.));

        let refund = CategorySummary {
            category: "Returns".to_string(),
            revenue: -10.,
            orders: 1,
        };
        let (low, high) = value_range(&[refund]);
        assert!((low + 11.).abs() < 1e-9);
        assert_eq!(high, 1.);
    }

    #[test]
    fn infinite_revenue_is_a_chart_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let mut bars = summary();
        bars[0].revenue = f64::INFINITY;
        let err = render_chart(&bars, &path).unwrap_err();
        assert!(matches!(err, PipelineError::ChartRenderFailure { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn missing_directory_is_a_chart_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("chart.png");
        let err = render_chart(&summary(), &path).unwrap_err();
        assert!(matches!(err, PipelineError::ChartRenderFailure { .. }));
        assert!(!err.is_fatal());
        assert!(!path.exists());
    }

    #[test]
    fn chart_is_written_to_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        render_chart(&summary(), &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path() != path)
            .count();
        assert_eq!(leftovers, 0);
    }
}
