use std::process::ExitCode;

use daily_sales_report::{console, run, Config};

fn main() -> ExitCode {
    console::init_tracing();

    match run(&Config::default()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            let e = anyhow::Error::from(e);
            eprintln!("{}", console::format_error(&format!("{e:#}")));
            ExitCode::FAILURE
        }
    }
}
