use thiserror::Error;

/// An input table does not carry the columns the dashboard relies on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{table} is missing required columns: {missing:?}. Available columns: {available:?}")]
    MissingColumns {
        table: String,
        missing: Vec<String>,
        available: Vec<String>,
    },
}

pub const FACT_SALES_REQUIRED: &[&str] = &[
    "order_number",
    "order_date",
    "customer_key",
    "product_key",
    "sales_amount",
];
pub const CUSTOMERS_REQUIRED: &[&str] = &["customer_key"];
pub const PRODUCTS_REQUIRED: &[&str] = &["product_key"];

/// Fail with the full list of missing columns (in `required` order) and the
/// columns that are available.
pub fn assert_required_columns<S: AsRef<str>>(
    columns: &[S],
    required: &[&str],
    table: &str,
) -> Result<(), SchemaError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|r| !columns.iter().any(|c| c.as_ref() == **r))
        .map(|r| r.to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    Err(SchemaError::MissingColumns {
        table: table.to_string(),
        missing,
        available: columns.iter().map(|c| c.as_ref().to_string()).collect(),
    })
}
