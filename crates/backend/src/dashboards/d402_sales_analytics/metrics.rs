//! Aggregations over a (filtered) slice.
//!
//! All functions are pure. Ratios with a zero denominator and changes
//! without a prior period are `None`, never infinity or NaN. Groups with
//! equal totals are ordered by group label.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use contracts::dashboards::d402_sales_analytics::{
    CategoryTotal, GroupShare, GroupTotal, KpiSnapshot, MonthlyAggregate, ParetoRow,
};
use contracts::domain::a001_sales_record::{Column, SalesTable};

/// Groups counted in the top-share KPIs
pub const TOP_SHARE_GROUPS: usize = 10;

/// Rows in the category/subcategory table
pub const CATEGORY_TABLE_LIMIT: usize = 20;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// Percent change from `prev` to `cur`; `None` when `prev` is zero.
fn pct_change(cur: f64, prev: f64) -> Option<f64> {
    ratio(cur, prev).map(|r| (r - 1.0) * 100.0)
}

#[derive(Debug, Default)]
struct MonthAcc<'a> {
    revenue: f64,
    orders: HashSet<&'a str>,
    units: f64,
}

/// Revenue, distinct orders and units per month, ascending by month.
/// Rows without a month are dropped.
fn month_totals(slice: &SalesTable) -> Vec<(String, f64, usize, f64)> {
    let mut months: BTreeMap<&str, MonthAcc> = BTreeMap::new();

    for row in &slice.rows {
        let Some(ym) = row.year_month.as_deref() else {
            continue;
        };
        let acc = months.entry(ym).or_default();
        acc.revenue += row.sales_amount.unwrap_or(0.0);
        acc.units += row.quantity.unwrap_or(0.0);
        if let Some(order) = row.order_number.as_deref() {
            acc.orders.insert(order);
        }
    }

    months
        .into_iter()
        .map(|(ym, acc)| (ym.to_string(), acc.revenue, acc.orders.len(), acc.units))
        .collect()
}

/// Sum of `value_field` per non-null `group_field` value, sorted by total
/// descending, then label ascending. Empty when the group column is absent.
fn group_totals(slice: &SalesTable, group_field: &str, value_field: &str) -> Vec<(String, f64)> {
    if !slice.schema.has_name(group_field) {
        return Vec::new();
    }

    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for row in &slice.rows {
        if let Some(group) = row.value_text(group_field) {
            *totals.entry(group).or_insert(0.0) += row.value_number(value_field).unwrap_or(0.0);
        }
    }

    let mut sorted: Vec<(String, f64)> = totals.into_iter().collect();
    // BTreeMap order is by label, so a stable sort on value keeps label order for ties
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));
    sorted
}

fn revenue_by(slice: &SalesTable, column: Column) -> Vec<(String, f64)> {
    group_totals(slice, column.as_str(), Column::SalesAmount.as_str())
}

/// Percent of total revenue held by the `n` largest groups.
fn top_n_share_pct(slice: &SalesTable, column: Column, n: usize) -> Option<f64> {
    if slice.is_empty() || !slice.schema.has(column) {
        return None;
    }
    let totals = revenue_by(slice, column);
    if totals.is_empty() {
        return None;
    }
    let total: f64 = totals.iter().map(|(_, v)| v).sum();
    let top: f64 = totals.iter().take(n).map(|(_, v)| v).sum();
    ratio(top, total).map(|share| share * 100.0)
}

// ---------------------------------------------------------------------------
// Monthly series
// ---------------------------------------------------------------------------

/// One row per month present in the slice, ascending.
///
/// `rolling_3m_revenue` averages the current and two preceding rows and is
/// `None` for the first two rows.
pub fn compute_monthly(slice: &SalesTable) -> Vec<MonthlyAggregate> {
    let totals = month_totals(slice);
    let mut out: Vec<MonthlyAggregate> = Vec::with_capacity(totals.len());

    for (i, (year_month, revenue, orders, units)) in totals.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| &totals[p]);
        let rolling_3m_revenue = if i >= 2 {
            Some(totals[i - 2..=i].iter().map(|t| t.1).sum::<f64>() / 3.0)
        } else {
            None
        };

        out.push(MonthlyAggregate {
            year_month: year_month.clone(),
            revenue: *revenue,
            orders: *orders,
            units: *units,
            aov: ratio(*revenue, *orders as f64),
            asp: ratio(*revenue, *units),
            upo: ratio(*units, *orders as f64),
            mom_revenue_pct: prev.and_then(|p| pct_change(*revenue, p.1)),
            mom_orders_pct: prev.and_then(|p| pct_change(*orders as f64, p.2 as f64)),
            rolling_3m_revenue,
        });
    }

    out
}

// ---------------------------------------------------------------------------
// KPI snapshot
// ---------------------------------------------------------------------------

/// Whole-slice KPIs.
pub fn kpis(slice: &SalesTable) -> KpiSnapshot {
    let revenue: f64 = slice.rows.iter().filter_map(|r| r.sales_amount).sum();
    let units: f64 = slice.rows.iter().filter_map(|r| r.quantity).sum();
    let orders = slice
        .rows
        .iter()
        .filter_map(|r| r.order_number.as_deref())
        .collect::<HashSet<_>>()
        .len();

    let customers = if slice.schema.has(Column::CustomerKey) {
        distinct_count(slice, Column::CustomerKey)
    } else if slice.schema.has(Column::CustomerName) {
        distinct_count(slice, Column::CustomerName)
    } else {
        0
    };

    let (latest_mom_revenue_pct, latest_mom_orders_pct) = latest_mom(slice);

    KpiSnapshot {
        revenue,
        orders,
        units,
        customers,
        aov: ratio(revenue, orders as f64),
        asp: ratio(revenue, units),
        upo: ratio(units, orders as f64),
        top10_customer_share_pct: top_n_share_pct(slice, Column::CustomerName, TOP_SHARE_GROUPS),
        top10_product_share_pct: top_n_share_pct(slice, Column::ProductName, TOP_SHARE_GROUPS),
        latest_mom_revenue_pct,
        latest_mom_orders_pct,
    }
}

fn distinct_count(slice: &SalesTable, column: Column) -> usize {
    slice
        .rows
        .iter()
        .filter_map(|r| r.text(column))
        .collect::<BTreeSet<_>>()
        .len()
}

/// Change of the last month against the one before it.
fn latest_mom(slice: &SalesTable) -> (Option<f64>, Option<f64>) {
    if !slice.schema.has(Column::YearMonth) {
        return (None, None);
    }
    let totals = month_totals(slice);
    match totals.as_slice() {
        [.., prev, last] => (
            pct_change(last.1, prev.1),
            pct_change(last.2 as f64, prev.2 as f64),
        ),
        _ => (None, None),
    }
}

// ---------------------------------------------------------------------------
// Concentration
// ---------------------------------------------------------------------------

/// Ranked cumulative share of `value_field` over `group_field`.
///
/// `cum_share` is `None` on every row when the grand total is zero.
pub fn pareto_curve(slice: &SalesTable, group_field: &str, value_field: &str) -> Vec<ParetoRow> {
    let totals = group_totals(slice, group_field, value_field);
    let grand_total: f64 = totals.iter().map(|(_, v)| v).sum();

    let mut cum_value = 0.0;
    totals
        .into_iter()
        .enumerate()
        .map(|(i, (group, value))| {
            cum_value += value;
            ParetoRow {
                group,
                value,
                rank: i + 1,
                cum_value,
                cum_share: ratio(cum_value, grand_total),
            }
        })
        .collect()
}

/// The `n` groups with the highest revenue.
pub fn top_groups(slice: &SalesTable, column: Column, n: usize) -> Vec<GroupTotal> {
    revenue_by(slice, column)
        .into_iter()
        .take(n)
        .map(|(group, revenue)| GroupTotal { group, revenue })
        .collect()
}

/// Revenue per group with its share of the slice, one decimal.
/// `None` when the column is absent.
pub fn share_breakdown(slice: &SalesTable, column: Column) -> Option<Vec<GroupShare>> {
    if !slice.schema.has(column) {
        return None;
    }
    let totals = revenue_by(slice, column);
    let total: f64 = totals.iter().map(|(_, v)| v).sum();

    Some(
        totals
            .into_iter()
            .map(|(group, revenue)| GroupShare {
                group,
                revenue,
                share_pct: ratio(revenue, total).map(|s| (s * 1000.0).round() / 10.0),
            })
            .collect(),
    )
}

/// Revenue per category (and subcategory when present), highest first.
/// `None` when the table has no category column.
pub fn category_breakdown(slice: &SalesTable, limit: usize) -> Option<Vec<CategoryTotal>> {
    if !slice.schema.has(Column::Category) {
        return None;
    }
    let with_sub = slice.schema.has(Column::Subcategory);

    let mut totals: BTreeMap<(String, Option<String>), f64> = BTreeMap::new();
    for row in &slice.rows {
        let Some(category) = row.category.clone() else {
            continue;
        };
        let subcategory = if with_sub {
            match row.subcategory.clone() {
                Some(s) => Some(s),
                None => continue,
            }
        } else {
            None
        };
        *totals.entry((category, subcategory)).or_insert(0.0) += row.sales_amount.unwrap_or(0.0);
    }

    let mut sorted: Vec<_> = totals.into_iter().collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));

    Some(
        sorted
            .into_iter()
            .take(limit)
            .map(|((category, subcategory), revenue)| CategoryTotal {
                category,
                subcategory,
                revenue,
            })
            .collect(),
    )
}
