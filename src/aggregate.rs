use std::collections::{BTreeMap, HashSet};

use crate::clean::{Dataset, OrderId};

/// Whole-run figures.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kpis {
    pub total_revenue: f64,
    pub total_orders: usize,
    pub average_order_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub category: String,
    pub revenue: f64,
    pub orders: usize,
}

pub fn compute_kpis(dataset: &Dataset) -> Kpis {
    let total_revenue: f64 = dataset.records.iter().map(|t| t.revenue).sum();
    let total_orders = dataset
        .records
        .iter()
        .map(|t| &t.order_id)
        .collect::<HashSet<_>>()
        .len();
    Kpis {
        total_revenue,
        total_orders,
        average_order_value: average_order_value(total_revenue, total_orders),
    }
}

/// Zero when there are no orders.
pub fn average_order_value(total_revenue: f64, total_orders: usize) -> f64 {
    if total_orders == 0 {
        0.
    } else {
        total_revenue / total_orders as f64
    }
}

/// One row per distinct category, sorted by category name.
pub fn summarize_by_category(dataset: &Dataset) -> Vec<CategorySummary> {
    let mut groups: BTreeMap<&str, (f64, HashSet<&OrderId>)> = BTreeMap::new();
    for t in &dataset.records {
        let (revenue, orders) = groups.entry(t.category.as_str()).or_default();
        *revenue += t.revenue;
        orders.insert(&t.order_id);
    }
    groups
        .into_iter()
        .map(|(category, (revenue, orders))| CategorySummary {
            category: category.to_string(),
            revenue,
            orders: orders.len(),
        })
        .collect()
}
