use std::path::PathBuf;

use tracing::debug;

use crate::{
    aggregate::{compute_kpis, summarize_by_category, CategorySummary, Kpis},
    chart::render_chart,
    clean::clean_dataset,
    console::{format_info, format_success, format_warning, run_time},
    load::{load_dataset, validate_columns},
    report::write_report,
    select::latest_input_file,
    summary::print_summary,
    Config, Result,
};

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub input: PathBuf,
    pub kpis: Kpis,
    pub categories: Vec<CategorySummary>,
    pub report: PathBuf,
    /// `None` when the chart could not be rendered.
    pub chart: Option<PathBuf>,
}

/// Runs every step once, in order, stopping at the first fatal error.
///
/// A chart that cannot be rendered is reported and skipped; the KPI summary is
/// still printed and the run succeeds.
pub fn run(config: &Config) -> Result<RunSummary> {
    println!("\n{}", format_info("Sales report started"));
    println!("{}", format_info(&format!("Run time: {}", run_time())));

    let input = latest_input_file(&config.input_dir, &config.input_extension)?;
    println!(
        "{}",
        format_info(&format!("Processing file: {}", input.display()))
    );

    let raw = load_dataset(&input)?;
    println!(
        "{}",
        format_success(&format!("Data loaded successfully ({} rows)", raw.rows.len()))
    );

    let schema = validate_columns(&raw.columns)?;
    debug!("required columns at {:?}", schema);
    let dataset = clean_dataset(raw, &schema);
    println!(
        "{}",
        format_success(&format!(
            "Data cleaned successfully ({} rows kept, {} dropped)",
            dataset.len(),
            dataset.dropped.total()
        ))
    );

    let kpis = compute_kpis(&dataset);
    let categories = summarize_by_category(&dataset);
    println!("{}", format_success("KPIs calculated"));

    let report = config.report_path();
    write_report(&dataset, &categories, &report)?;
    println!(
        "{}",
        format_success(&format!("Excel report generated: {}", report.display()))
    );

    let chart_path = config.chart_path();
    let chart = match render_chart(&categories, &chart_path) {
        Ok(()) => {
            println!(
                "{}",
                format_success(&format!("Chart created: {}", chart_path.display()))
            );
            Some(chart_path)
        }
        Err(e) => {
            println!("{}", format_warning(&e.to_string()));
            None
        }
    };

    print_summary(&kpis, &config.currency_symbol);
    println!("\n{}", format_success("Daily sales report completed"));

    Ok(RunSummary {
        input,
        kpis,
        categories,
        report,
        chart,
    })
}
