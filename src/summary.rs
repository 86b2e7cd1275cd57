use crate::aggregate::Kpis;

/// Renders the KPI block printed at the end of a run.
pub fn render_summary(kpis: &Kpis, currency: &str) -> String {
    [
        "========= KPI SUMMARY =========".to_string(),
        format!(
            "Total Revenue       : {currency}{}",
            format_amount(kpis.total_revenue)
        ),
        format!("Total Orders        : {}", kpis.total_orders),
        format!(
            "Average Order Value : {currency}{}",
            format_amount(kpis.average_order_value)
        ),
        "================================".to_string(),
    ]
    .join("\n")
}

pub fn print_summary(kpis: &Kpis, currency: &str) {
    println!("\n{}", render_summary(kpis, currency));
}

/// Two decimals with comma-grouped thousands, e.g. `-1,234,567.89`.
pub fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0. && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{cents}")
}
