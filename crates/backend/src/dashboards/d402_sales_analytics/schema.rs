use contracts::domain::a001_sales_record::{Column, SalesTable};

/// Alternate product name columns, in order of preference.
const PRODUCT_NAME_FALLBACKS: &[&str] = &["prd_name", "product", "name"];

/// Id shown when a row has neither customer_number nor customer_key.
const UNKNOWN_CUSTOMER: &str = "unknown";

/// Guarantee the display columns used across the dashboard
///
/// Adds:
/// - `product_name`: first present of `prd_name`, `product`, `name`, else
///   `product_key` as text (only when `product_name` is absent)
/// - `customer_display`: `"{id} — {first} {last}"`, id from the row's
///   `customer_number`, else its `customer_key`, else `"unknown"`; just the
///   id when there is no name
/// - `customer_name`: same value as `customer_display`, kept for older
///   consumers of the field
///
/// Returns a new table; the input is untouched.
pub fn ensure_display_columns(table: &SalesTable) -> SalesTable {
    let mut out = table.clone();

    if !out.schema.has(Column::ProductName) {
        let source = PRODUCT_NAME_FALLBACKS
            .iter()
            .copied()
            .find(|c| out.schema.has_name(c));

        match source {
            Some(col) => {
                for row in &mut out.rows {
                    row.product_name = row.value_text(col);
                }
                out.schema.insert(Column::ProductName.as_str());
            }
            None if out.schema.has(Column::ProductKey) => {
                for row in &mut out.rows {
                    row.product_name = row.product_key.clone();
                }
                out.schema.insert(Column::ProductName.as_str());
            }
            None => {}
        }
    }

    let id_columns: Vec<Column> = [Column::CustomerNumber, Column::CustomerKey]
        .into_iter()
        .filter(|c| out.schema.has(*c))
        .collect();
    let has_first = out.schema.has(Column::FirstName);
    let has_last = out.schema.has(Column::LastName);

    for row in &mut out.rows {
        let id = id_columns
            .iter()
            .find_map(|c| row.text(*c))
            .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string());
        let first = if has_first { row.first_name.as_deref() } else { None }.unwrap_or("");
        let last = if has_last { row.last_name.as_deref() } else { None }.unwrap_or("");
        let name = format!("{} {}", first, last);
        let name = name.trim();

        let display = if name.is_empty() {
            id
        } else {
            format!("{} — {}", id, name)
        };
        row.customer_name = Some(display.clone());
        row.customer_display = Some(display);
    }
    out.schema.insert(Column::CustomerDisplay.as_str());
    out.schema.insert(Column::CustomerName.as_str());

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_sales_record::{SalesRecord, SalesSchema};

    fn table(columns: &[&str], rows: Vec<SalesRecord>) -> SalesTable {
        SalesTable::new(SalesSchema::from_names(columns.iter().copied()), rows)
    }

    #[test]
    fn test_display_with_number_and_name() {
        let input = table(
            &["customer_number", "first_name", "last_name"],
            vec![SalesRecord {
                customer_number: Some("C1".into()),
                first_name: Some("Jane".into()),
                last_name: Some("Doe".into()),
                ..Default::default()
            }],
        );
        let out = ensure_display_columns(&input);
        assert_eq!(out.rows[0].customer_display.as_deref(), Some("C1 — Jane Doe"));
        assert_eq!(out.rows[0].customer_name.as_deref(), Some("C1 — Jane Doe"));
        assert!(out.schema.has(Column::CustomerDisplay));
        assert!(out.schema.has(Column::CustomerName));
    }

    #[test]
    fn test_display_key_only() {
        let input = table(
            &["customer_key"],
            vec![SalesRecord {
                customer_key: Some("X9".into()),
                ..Default::default()
            }],
        );
        let out = ensure_display_columns(&input);
        assert_eq!(out.rows[0].customer_display.as_deref(), Some("X9"));
    }

    #[test]
    fn test_display_prefers_customer_number_over_key() {
        let input = table(
            &["customer_key", "customer_number", "last_name"],
            vec![SalesRecord {
                customer_key: Some("17".into()),
                customer_number: Some("AW00011000".into()),
                last_name: Some("Yang".into()),
                ..Default::default()
            }],
        );
        let out = ensure_display_columns(&input);
        assert_eq!(out.rows[0].customer_display.as_deref(), Some("AW00011000 — Yang"));
    }

    #[test]
    fn test_display_without_id_columns() {
        let input = table(
            &["first_name"],
            vec![SalesRecord {
                first_name: Some("Ana".into()),
                ..Default::default()
            }],
        );
        let out = ensure_display_columns(&input);
        assert_eq!(out.rows[0].customer_display.as_deref(), Some("unknown — Ana"));
    }

    #[test]
    fn test_product_name_fallbacks() {
        let mut alt = SalesRecord {
            product_key: Some("10".into()),
            ..Default::default()
        };
        alt.attributes.insert("prd_name".into(), "Road-150".into());
        let out = ensure_display_columns(&table(&["product_key", "prd_name"], vec![alt]));
        assert_eq!(out.rows[0].product_name.as_deref(), Some("Road-150"));

        let key_only = SalesRecord {
            product_key: Some("10".into()),
            ..Default::default()
        };
        let out = ensure_display_columns(&table(&["product_key"], vec![key_only]));
        assert_eq!(out.rows[0].product_name.as_deref(), Some("10"));
        assert!(out.schema.has(Column::ProductName));
    }

    #[test]
    fn test_existing_product_name_is_kept() {
        let input = table(
            &["product_key", "product_name"],
            vec![SalesRecord {
                product_key: Some("10".into()),
                product_name: Some("Road Bike".into()),
                ..Default::default()
            }],
        );
        let out = ensure_display_columns(&input);
        assert_eq!(out.rows[0].product_name.as_deref(), Some("Road Bike"));
        assert_eq!(input.rows[0].customer_display, None);
    }
}
