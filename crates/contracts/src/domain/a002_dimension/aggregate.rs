use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A row of a customer or product dimension extract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionRecord {
    /// Normalized key; `None` for a null key cell.
    pub key: Option<String>,
    /// Non-key cells; a missing entry is a null cell.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// A dimension table keyed by `key_column`.
///
/// Keys are expected, not guaranteed, to be unique; duplicates and keys that
/// the fact table references but the dimension lacks are reported as data
/// quality signals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionTable {
    pub name: String,
    pub key_column: String,
    /// All columns in source order, key column included.
    pub columns: Vec<String>,
    pub rows: Vec<DimensionRecord>,
}

impl DimensionTable {
    /// Columns other than the key, in source order.
    pub fn attribute_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(move |c| *c != self.key_column)
    }

    /// Distinct non-null keys.
    pub fn distinct_keys(&self) -> BTreeSet<&str> {
        self.rows.iter().filter_map(|r| r.key.as_deref()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: Option<&str>) -> DimensionRecord {
        DimensionRecord {
            key: key.map(str::to_string),
            attributes: BTreeMap::new(),
        }
    }

    #[test]
    fn test_distinct_keys_skip_nulls() {
        let dim = DimensionTable {
            name: "dim_customers".into(),
            key_column: "customer_key".into(),
            columns: vec!["customer_key".into(), "first_name".into()],
            rows: vec![row(Some("2")), row(None), row(Some("3")), row(Some("2"))],
        };
        let keys: Vec<&str> = dim.distinct_keys().into_iter().collect();
        assert_eq!(keys, vec!["2", "3"]);
        assert_eq!(dim.attribute_columns().collect::<Vec<_>>(), vec!["first_name"]);
    }
}
