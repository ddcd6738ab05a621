//! Enrichment of the fact table with its dimensions.
//!
//! Joins are declared as `JoinSpec` values instead of being inferred from
//! shared column names, so a renamed key column in an extract shows up as a
//! logged mismatch rather than a silently empty join.

use std::collections::HashMap;

use contracts::domain::a001_sales_record::{Column, SalesTable};
use contracts::domain::a002_dimension::{DimensionRecord, DimensionTable};

/// Left join of the fact table with one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinSpec {
    /// Key column on the fact side
    pub fact_key: Column,
    /// Key column the dimension must be keyed by
    pub dim_key: &'static str,
    /// Appended to dimension columns whose name the fact table already uses
    pub suffix: &'static str,
}

pub const CUSTOMER_JOIN: JoinSpec = JoinSpec {
    fact_key: Column::CustomerKey,
    dim_key: "customer_key",
    suffix: "_cust",
};

pub const PRODUCT_JOIN: JoinSpec = JoinSpec {
    fact_key: Column::ProductKey,
    dim_key: "product_key",
    suffix: "_prd",
};

/// Derive `year_month` and join both dimensions.
pub fn enrich(
    fact: &SalesTable,
    customers: &DimensionTable,
    products: &DimensionTable,
) -> SalesTable {
    let with_months = with_year_month(fact);
    let with_customers = left_join(&with_months, customers, &CUSTOMER_JOIN);
    left_join(&with_customers, products, &PRODUCT_JOIN)
}

/// Copy of `fact` guaranteed to carry a `year_month` column.
pub fn with_year_month(fact: &SalesTable) -> SalesTable {
    let mut out = fact.clone();
    if !out.schema.has(Column::YearMonth) {
        for row in &mut out.rows {
            row.derive_year_month();
        }
        out.schema.insert(Column::YearMonth.as_str());
    }
    out
}

/// Left join: every fact row is kept exactly once.
///
/// Unmatched rows get null dimension attributes. When a key repeats in the
/// dimension, the first row wins.
pub fn left_join(fact: &SalesTable, dim: &DimensionTable, spec: &JoinSpec) -> SalesTable {
    if dim.key_column != spec.dim_key {
        tracing::warn!(
            "join skipped: {} is keyed by '{}', join expects '{}'",
            dim.name,
            dim.key_column,
            spec.dim_key
        );
        return fact.clone();
    }

    let mut index: HashMap<&str, &DimensionRecord> = HashMap::new();
    for record in &dim.rows {
        if let Some(key) = record.key.as_deref() {
            index.entry(key).or_insert(record);
        }
    }

    let targets: Vec<(&str, String)> = dim
        .attribute_columns()
        .map(|col| {
            let target = if fact.schema.has_name(col) {
                format!("{}{}", col, spec.suffix)
            } else {
                col.to_string()
            };
            (col, target)
        })
        .collect();

    let mut schema = fact.schema.clone();
    for (_, target) in &targets {
        schema.insert(target.clone());
    }

    let mut matched = 0usize;
    let rows = fact
        .rows
        .iter()
        .map(|row| {
            let mut out = row.clone();
            let hit = row
                .text(spec.fact_key)
                .and_then(|key| index.get(key.as_str()).copied());
            if let Some(record) = hit {
                matched += 1;
                for (col, target) in &targets {
                    out.set_value(target, record.attributes.get(*col).map(String::as_str));
                }
            }
            out
        })
        .collect();

    tracing::debug!(
        "joined {} on {}: {}/{} fact rows matched",
        dim.name,
        spec.dim_key,
        matched,
        fact.len()
    );

    SalesTable::new(schema, rows)
}
