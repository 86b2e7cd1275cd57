use std::path::Path;

use calamine::{open_workbook, Reader, Xlsx};
use daily_sales_report::{render_summary, run, Config, PipelineError, REQUIRED_COLUMNS};
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

enum Cell {
    N(f64),
    S(&'static str),
}

use Cell::{N, S};

fn write_sales(path: &Path, columns: &[&str], rows: &[Vec<Cell>]) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in columns.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    for (i, row) in rows.iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            match cell {
                N(n) => sheet.write_number(i as u32 + 1, col as u16, *n)?,
                S(s) => sheet.write_string(i as u32 + 1, col as u16, *s)?,
            };
        }
    }
    workbook.save(path)?;
    Ok(())
}

fn scenario_rows() -> Vec<Vec<Cell>> {
    vec![
        vec![N(1.), S("2024-01-01"), S("Widget"), S("Tools"), N(2.), N(10.)],
        vec![N(2.), S("2024-01-02"), S("Gadget"), S("Tools"), N(1.), N(5.)],
        vec![N(3.), S("bad-date"), S("Gizmo"), S("Home"), N(3.), S("x")],
    ]
}

fn workspace() -> anyhow::Result<(TempDir, Config)> {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir(dir.path().join("data"))?;
    let config = Config::new(dir.path().join("data"), dir.path().join("output"));
    Ok((dir, config))
}

#[test]
fn concrete_scenario_end_to_end() -> anyhow::Result<()> {
    let (_dir, config) = workspace()?;
    write_sales(
        &config.input_dir.join("sales.xlsx"),
        &REQUIRED_COLUMNS,
        &scenario_rows(),
    )?;

    let outcome = run(&config)?;
    assert_eq!(outcome.kpis.total_revenue, 25.);
    assert_eq!(outcome.kpis.total_orders, 2);
    assert_eq!(outcome.kpis.average_order_value, 12.5);
    assert_eq!(outcome.categories.len(), 1);
    assert_eq!(outcome.categories[0].category, "Tools");
    assert_eq!(outcome.categories[0].revenue, 25.);
    assert_eq!(outcome.categories[0].orders, 2);
    assert_eq!(outcome.chart.as_deref(), Some(config.chart_path().as_path()));
    assert!(std::fs::metadata(config.chart_path())?.len() > 0);

    let mut report: Xlsx<_> = open_workbook(config.report_path())?;
    assert_eq!(report.sheet_names(), ["Raw_Data", "Revenue_By_Category"]);
    let raw = report.worksheet_range("Raw_Data")?;
    assert_eq!(raw.height(), 3);
    assert_eq!(raw.headers().unwrap_or_default().last().map(String::as_str), Some("Revenue"));
    let by_category = report.worksheet_range("Revenue_By_Category")?;
    assert_eq!(by_category.height(), 2);
    Ok(())
}

#[test]
fn empty_input_directory_halts_without_output() -> anyhow::Result<()> {
    let (_dir, config) = workspace()?;
    std::fs::write(config.input_dir.join("readme.txt"), "not a workbook")?;

    let err = run(&config).unwrap_err();
    assert!(matches!(err, PipelineError::NoInputFound { .. }));
    assert!(err.is_fatal());
    assert!(!config.output_dir.exists());
    Ok(())
}

#[test]
fn missing_columns_halt_before_any_artifact() -> anyhow::Result<()> {
    let (_dir, config) = workspace()?;
    write_sales(
        &config.input_dir.join("sales.xlsx"),
        &["OrderID", "Date", "Product", "Category", "Price", "Region"],
        &[vec![N(1.), S("2024-01-01"), S("Widget"), S("Tools"), N(10.), S("West")]],
    )?;

    match run(&config) {
        Err(PipelineError::SchemaMismatch { missing }) => assert_eq!(missing, ["Quantity"]),
        other => panic!("expected a schema mismatch, got {other:?}"),
    }
    assert!(!config.output_dir.exists());
    Ok(())
}

#[test]
fn unreadable_latest_file_is_a_load_failure() -> anyhow::Result<()> {
    let (_dir, config) = workspace()?;
    std::fs::write(config.input_dir.join("corrupt.xlsx"), b"plain bytes")?;

    let err = run(&config).unwrap_err();
    assert!(matches!(err, PipelineError::LoadFailure { .. }));
    assert!(!config.output_dir.exists());
    Ok(())
}

#[test]
fn chart_failure_still_completes_the_run() -> anyhow::Result<()> {
    let (_dir, config) = workspace()?;
    let config = config.with_chart_name("no/such/dir/chart.png");
    write_sales(
        &config.input_dir.join("sales.xlsx"),
        &REQUIRED_COLUMNS,
        &scenario_rows(),
    )?;

    let outcome = run(&config)?;
    assert!(outcome.chart.is_none());
    assert!(config.report_path().exists());
    assert!(!config.chart_path().exists());
    assert_eq!(outcome.kpis.total_orders, 2);
    Ok(())
}

#[test]
fn overflowing_rows_are_dropped_and_the_run_completes() -> anyhow::Result<()> {
    let (_dir, config) = workspace()?;
    let mut rows = scenario_rows();
    rows.push(vec![N(4.), S("2024-01-03"), S("Bulk"), S("Tools"), N(1e200), N(1e200)]);
    write_sales(&config.input_dir.join("sales.xlsx"), &REQUIRED_COLUMNS, &rows)?;

    let outcome = run(&config)?;
    assert_eq!(outcome.kpis.total_revenue, 25.);
    assert_eq!(outcome.kpis.total_orders, 2);
    assert!(outcome.chart.is_some());
    Ok(())
}

#[test]
fn rerunning_on_the_same_input_gives_the_same_figures() -> anyhow::Result<()> {
    let (_dir, config) = workspace()?;
    write_sales(
        &config.input_dir.join("sales.xlsx"),
        &["Region", "OrderID", "Date", "Product", "Category", "Quantity", "Price"],
        &[
            vec![S("West"), N(10.), S("2024-02-01"), S("Lamp"), S("Home"), N(2.), N(1250.5)],
            vec![S("East"), N(11.), S("2024-02-01"), S("Saw"), S("Tools"), N(1.), N(99.99)],
            vec![S("East"), N(11.), S("2024-02-01"), S("Nails"), S("Tools"), N(10.), N(0.25)],
            vec![S("West"), S(""), S("2024-02-02"), S("Rug"), S("Home"), N(1.), N(80.)],
        ],
    )?;

    let first = run(&config)?;
    let second = run(&config)?;
    assert_eq!(first.input, second.input);
    assert_eq!(first.kpis, second.kpis);
    assert_eq!(first.categories, second.categories);
    assert_eq!(
        render_summary(&first.kpis, "₹"),
        render_summary(&second.kpis, "₹")
    );
    assert_eq!(first.kpis.total_orders, 2);

    let summed: f64 = first.categories.iter().map(|c| c.revenue).sum();
    assert!((summed - first.kpis.total_revenue).abs() < 1e-9);
    Ok(())
}
