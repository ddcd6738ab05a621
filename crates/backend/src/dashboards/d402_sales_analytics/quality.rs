use std::collections::{BTreeSet, HashSet};

use contracts::dashboards::d402_sales_analytics::{DqIndicators, NullRate, SliceQuality};
use contracts::domain::a001_sales_record::{Column, SalesRecord, SalesTable};
use contracts::domain::a002_dimension::DimensionTable;

/// Null-rate rows shown for a slice
pub const NULL_RATE_LIMIT: usize = 12;

/// Structural defect counts over the full enriched fact table.
///
/// Every count is computed independently; a column the table lacks yields 0.
pub fn dq_indicators(
    fact: &SalesTable,
    customers: &DimensionTable,
    products: &DimensionTable,
) -> DqIndicators {
    DqIndicators {
        missing_customer_key_rows: count_if(fact, Column::CustomerKey, |r| {
            r.customer_key.is_none()
        }),
        missing_product_key_rows: count_if(fact, Column::ProductKey, |r| r.product_key.is_none()),
        negative_quantity_rows: count_if(fact, Column::Quantity, |r| {
            r.quantity.is_some_and(|q| q < 0.0)
        }),
        negative_sales_rows: count_if(fact, Column::SalesAmount, |r| {
            r.sales_amount.is_some_and(|s| s < 0.0)
        }),
        zero_or_negative_price_rows: count_if(fact, Column::Price, |r| {
            r.price.is_some_and(|p| p <= 0.0)
        }),
        missing_customer_keys_in_dim: referential_integrity_violations(
            fact,
            Column::CustomerKey,
            customers,
        ),
        missing_product_keys_in_dim: referential_integrity_violations(
            fact,
            Column::ProductKey,
            products,
        ),
    }
}

fn count_if(table: &SalesTable, column: Column, pred: impl Fn(&SalesRecord) -> bool) -> usize {
    if !table.schema.has(column) {
        return 0;
    }
    table.rows.iter().filter(|r| pred(r)).count()
}

/// Number of distinct non-null fact keys with no match in the dimension.
///
/// Set difference cardinality, not a row count.
pub fn referential_integrity_violations(
    fact: &SalesTable,
    fact_key: Column,
    dim: &DimensionTable,
) -> usize {
    if !fact.schema.has(fact_key) {
        return 0;
    }
    let fact_keys: BTreeSet<String> = fact.rows.iter().filter_map(|r| r.text(fact_key)).collect();
    let dim_keys = dim.distinct_keys();

    fact_keys
        .iter()
        .filter(|k| !dim_keys.contains(k.as_str()))
        .count()
}

/// Rows whose key repeats a key seen on an earlier row (null keys included).
pub fn duplicate_key_count(dim: &DimensionTable) -> usize {
    let mut seen: HashSet<Option<&str>> = HashSet::new();
    dim.rows
        .iter()
        .filter(|r| !seen.insert(r.key.as_deref()))
        .count()
}

/// Fraction of null cells per column, highest first, at most `limit` rows.
///
/// Ties are ordered by column name. An empty table has no rates.
pub fn null_rates(table: &SalesTable, limit: usize) -> Vec<NullRate> {
    if table.is_empty() {
        return Vec::new();
    }

    let total = table.len() as f64;
    let mut rates: Vec<NullRate> = table
        .schema
        .names()
        .iter()
        .map(|name| {
            let nulls = table.rows.iter().filter(|r| r.is_null(name)).count();
            NullRate {
                field: name.clone(),
                null_rate: nulls as f64 / total,
            }
        })
        .collect();

    rates.sort_by(|a, b| {
        b.null_rate
            .total_cmp(&a.null_rate)
            .then_with(|| a.field.cmp(&b.field))
    });
    rates.truncate(limit);
    rates
}

/// Quality view of one slice, paired with the sample-wide integrity counts.
pub fn slice_quality(slice: &SalesTable, global: &DqIndicators) -> SliceQuality {
    SliceQuality {
        rows: slice.len(),
        missing_customer_keys_in_dim: global.missing_customer_keys_in_dim,
        missing_product_keys_in_dim: global.missing_product_keys_in_dim,
        null_rates: null_rates(slice, NULL_RATE_LIMIT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_sales_record::SalesSchema;
    use contracts::domain::a002_dimension::DimensionRecord;

    fn fact_with_keys(keys: &[Option<&str>]) -> SalesTable {
        SalesTable::new(
            SalesSchema::from_names(["order_number", "customer_key", "product_key"]),
            keys.iter()
                .map(|k| SalesRecord {
                    customer_key: k.map(str::to_string),
                    product_key: Some("10".into()),
                    ..Default::default()
                })
                .collect(),
        )
    }

    fn dim_with_keys(key_column: &str, keys: &[Option<&str>]) -> DimensionTable {
        DimensionTable {
            name: "dim".into(),
            key_column: key_column.into(),
            columns: vec![key_column.into()],
            rows: keys
                .iter()
                .map(|k| DimensionRecord {
                    key: k.map(str::to_string),
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[test]
    fn test_referential_violation_is_set_difference() {
        // keys {1,2,3} against {2,3}; key 1 appears twice but counts once
        let fact = fact_with_keys(&[Some("1"), Some("1"), Some("2"), Some("3"), None]);
        let dim = dim_with_keys("customer_key", &[Some("2"), Some("3")]);
        assert_eq!(referential_integrity_violations(&fact, Column::CustomerKey, &dim), 1);
    }

    #[test]
    fn test_dq_indicators_counts() {
        let schema = SalesSchema::from_names([
            "order_number",
            "customer_key",
            "product_key",
            "quantity",
            "price",
            "sales_amount",
        ]);
        let row = |ck: Option<&str>, pk: Option<&str>, q: f64, p: f64, s: Option<f64>| SalesRecord {
            customer_key: ck.map(str::to_string),
            product_key: pk.map(str::to_string),
            quantity: Some(q),
            price: Some(p),
            sales_amount: s,
            ..Default::default()
        };
        let fact = SalesTable::new(
            schema,
            vec![
                row(Some("1"), Some("10"), 1.0, 10.0, Some(10.0)),
                row(None, Some("10"), -1.0, 0.0, Some(-10.0)),
                row(Some("9"), None, 2.0, -5.0, None),
            ],
        );
        let customers = dim_with_keys("customer_key", &[Some("1")]);
        let products = dim_with_keys("product_key", &[Some("10")]);

        let dq = dq_indicators(&fact, &customers, &products);
        assert_eq!(
            dq,
            DqIndicators {
                missing_customer_key_rows: 1,
                missing_product_key_rows: 1,
                negative_quantity_rows: 1,
                negative_sales_rows: 1,
                zero_or_negative_price_rows: 2,
                missing_customer_keys_in_dim: 1,
                missing_product_keys_in_dim: 0,
            }
        );
    }

    #[test]
    fn test_absent_columns_count_zero() {
        let fact = SalesTable::new(
            SalesSchema::from_names(["order_number"]),
            vec![SalesRecord::default(), SalesRecord::default()],
        );
        let dim = dim_with_keys("customer_key", &[]);
        let dq = dq_indicators(&fact, &dim, &dim);
        assert_eq!(dq, DqIndicators::default());
    }

    #[test]
    fn test_duplicate_key_count() {
        let dim = dim_with_keys(
            "product_key",
            &[Some("1"), Some("2"), Some("1"), None, None, Some("1")],
        );
        assert_eq!(duplicate_key_count(&dim), 3);
    }

    #[test]
    fn test_null_rates_sorted_and_limited() {
        let fact = fact_with_keys(&[Some("1"), None, None, Some("2")]);
        let rates = null_rates(&fact, 2);

        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].field, "order_number");
        assert_eq!(rates[0].null_rate, 1.0);
        assert_eq!(rates[1].field, "customer_key");
        assert_eq!(rates[1].null_rate, 0.5);
    }

    #[test]
    fn test_null_rate_ties_ordered_by_name() {
        let table = SalesTable::new(
            SalesSchema::from_names(["sales_amount", "category", "order_number"]),
            vec![SalesRecord {
                order_number: Some("SO1".into()),
                ..Default::default()
            }],
        );
        let fields: Vec<String> = null_rates(&table, NULL_RATE_LIMIT)
            .into_iter()
            .map(|r| r.field)
            .collect();
        assert_eq!(fields, vec!["category", "sales_amount", "order_number"]);
    }

    #[test]
    fn test_slice_quality_uses_global_integrity_counts() {
        let fact = fact_with_keys(&[Some("1")]);
        let global = DqIndicators {
            missing_customer_keys_in_dim: 4,
            missing_product_keys_in_dim: 2,
            ..Default::default()
        };
        let q = slice_quality(&fact, &global);
        assert_eq!(q.rows, 1);
        assert_eq!(q.missing_customer_keys_in_dim, 4);
        assert_eq!(q.missing_product_keys_in_dim, 2);
        assert_eq!(q.null_rates.len(), 3);
    }
}
