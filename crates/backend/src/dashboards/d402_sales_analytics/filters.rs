use std::collections::BTreeSet;

use contracts::dashboards::d402_sales_analytics::{FilterOptions, SliceFilter, ALL};
use contracts::domain::a001_sales_record::{Column, SalesRecord, SalesTable};

/// Categorical slicers: (column, selected value) pairs of a filter.
fn categorical(filter: &SliceFilter) -> [(Column, &str); 3] {
    [
        (Column::CustomerSegment, filter.segment.as_str()),
        (Column::Category, filter.category.as_str()),
        (Column::Subcategory, filter.subcategory.as_str()),
    ]
}

/// Narrow an enriched table to a month range and the categorical slicers.
///
/// `year_month` is compared as text; the zero-padded "YYYY-MM" format makes
/// that chronological. A slicer set to "All", or naming a column the table
/// does not have, is skipped. Rows with a null value never match a concrete
/// slicer. The caller rejects `start_month > end_month` beforehand.
pub fn filter_slice(table: &SalesTable, filter: &SliceFilter) -> SalesTable {
    let active: Vec<(Column, &str)> = categorical(filter)
        .into_iter()
        .filter(|(column, value)| *value != ALL && table.schema.has(*column))
        .collect();

    let rows = table
        .rows
        .iter()
        .filter(|row| in_month_range(row, filter) && matches_all(row, &active))
        .cloned()
        .collect();

    table.with_rows(rows)
}

fn in_month_range(row: &SalesRecord, filter: &SliceFilter) -> bool {
    match row.year_month.as_deref() {
        Some(ym) => ym >= filter.start_month.as_str() && ym <= filter.end_month.as_str(),
        None => false,
    }
}

fn matches_all(row: &SalesRecord, active: &[(Column, &str)]) -> bool {
    active
        .iter()
        .all(|(column, value)| row.text(*column).as_deref() == Some(*value))
}

/// Slicer choices for the dashboard controls.
///
/// The default end month is the second-to-last month present, since the
/// latest month of an extract is usually partial.
pub fn filter_options(table: &SalesTable) -> FilterOptions {
    let months: Vec<String> = distinct_values(table, Column::YearMonth);

    let default_start = months.first().cloned();
    let default_end = if months.len() >= 2 {
        months.get(months.len() - 2).cloned()
    } else {
        months.last().cloned()
    };

    FilterOptions {
        default_start,
        default_end,
        segments: with_all(distinct_values(table, Column::CustomerSegment)),
        categories: with_all(distinct_values(table, Column::Category)),
        subcategories: with_all(distinct_values(table, Column::Subcategory)),
        months,
    }
}

fn distinct_values(table: &SalesTable, column: Column) -> Vec<String> {
    if !table.schema.has(column) {
        return Vec::new();
    }
    table
        .rows
        .iter()
        .filter_map(|r| r.text(column))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn with_all(values: Vec<String>) -> Vec<String> {
    std::iter::once(ALL.to_string()).chain(values).collect()
}
