//! Loading of the flat sample extracts.
//!
//! All five files must be present before anything is read; a partial load is
//! never returned. Cells are trimmed and null markers become `None`.

use std::io::Read;
use std::path::{Path, PathBuf};

use contracts::domain::a001_sales_record::{SalesRecord, SalesSchema, SalesTable};
use contracts::domain::a002_dimension::{DimensionRecord, DimensionTable};
use contracts::domain::common::values::{clean_cell, normalize_key};
use thiserror::Error;

use super::schema_checks::{
    assert_required_columns, SchemaError, CUSTOMERS_REQUIRED, FACT_SALES_REQUIRED,
    PRODUCTS_REQUIRED,
};

/// (table name, file name) of every expected extract.
pub const REQUIRED_FILES: &[(&str, &str)] = &[
    ("fact_sales", "fact_sales_sample.csv"),
    ("dim_customers", "dim_customers_sample.csv"),
    ("dim_products", "dim_products_sample.csv"),
    ("report_customers", "report_customers_sample.csv"),
    ("report_products", "report_products_sample.csv"),
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(
        "Missing sample files in {}: {missing:?}. Ensure the directory exists or set {} to point at it.",
        .dir.display(),
        crate::shared::config::DATA_DIR_ENV
    )]
    MissingFiles { dir: PathBuf, missing: Vec<String> },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read CSV headers of {table}: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A parsed CSV file before typing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// The five extracts, typed.
#[derive(Debug, Clone)]
pub struct SampleData {
    pub fact_sales: SalesTable,
    pub dim_customers: DimensionTable,
    pub dim_products: DimensionTable,
    pub report_customers: DimensionTable,
    pub report_products: DimensionTable,
}

/// Load every sample extract from `dir`.
pub fn load_sample(dir: &Path) -> Result<SampleData, LoadError> {
    let missing: Vec<String> = REQUIRED_FILES
        .iter()
        .filter(|(_, file)| !dir.join(file).exists())
        .map(|(_, file)| file.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(LoadError::MissingFiles {
            dir: dir.to_path_buf(),
            missing,
        });
    }

    let raw = |table: &str| -> Result<RawTable, LoadError> {
        let file = REQUIRED_FILES
            .iter()
            .find(|(name, _)| *name == table)
            .map(|(_, file)| *file)
            .unwrap_or_default();
        read_table_file(table, &dir.join(file))
    };

    let data = SampleData {
        fact_sales: fact_from_raw(raw("fact_sales")?)?,
        dim_customers: dimension_from_raw(raw("dim_customers")?, "customer_key", CUSTOMERS_REQUIRED)?,
        dim_products: dimension_from_raw(raw("dim_products")?, "product_key", PRODUCTS_REQUIRED)?,
        report_customers: dimension_from_raw(
            raw("report_customers")?,
            "customer_key",
            CUSTOMERS_REQUIRED,
        )?,
        report_products: dimension_from_raw(
            raw("report_products")?,
            "product_key",
            PRODUCTS_REQUIRED,
        )?,
    };

    tracing::info!(
        "Sample loaded from {}: fact_sales={} rows, dim_customers={}, dim_products={}, report_customers={}, report_products={}",
        dir.display(),
        data.fact_sales.len(),
        data.dim_customers.len(),
        data.dim_products.len(),
        data.report_customers.len(),
        data.report_products.len(),
    );

    Ok(data)
}

pub fn read_table_file(table: &str, path: &Path) -> Result<RawTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_table(table, file).map_err(|e| match e {
        LoadError::Io { source, .. } => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Parse CSV text with a header row. Malformed records are skipped with a
/// warning.
pub fn read_table<R: Read>(table: &str, mut reader: R) -> Result<RawTable, LoadError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|source| LoadError::Io {
            path: PathBuf::from(table),
            source,
        })?;

    // Strip UTF-8 BOM if present
    let text = text.trim_start_matches('\u{FEFF}');

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|source| LoadError::Csv {
            table: table.to_string(),
            source,
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for result in csv_reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("{}: skipping malformed CSV record: {}", table, e);
                skipped += 1;
                continue;
            }
        };

        let row: Vec<Option<String>> = (0..headers.len())
            .map(|i| record.get(i).and_then(clean_cell).map(str::to_string))
            .collect();
        rows.push(row);
    }

    if skipped > 0 {
        tracing::warn!("{}: {} malformed records skipped", table, skipped);
    }

    Ok(RawTable {
        name: table.to_string(),
        headers,
        rows,
    })
}

/// Type the fact table. Dates that do not parse become `None`.
pub fn fact_from_raw(raw: RawTable) -> Result<SalesTable, LoadError> {
    assert_required_columns(&raw.headers, FACT_SALES_REQUIRED, &raw.name)?;

    let schema = SalesSchema::from_names(raw.headers.iter().cloned());
    let rows = raw
        .rows
        .iter()
        .map(|cells| {
            let mut record = SalesRecord::default();
            for (name, cell) in raw.headers.iter().zip(cells) {
                record.set_value(name, cell.as_deref());
            }
            record
        })
        .collect();

    Ok(SalesTable::new(schema, rows))
}

/// Type a dimension table keyed by `key_column`.
pub fn dimension_from_raw(
    raw: RawTable,
    key_column: &str,
    required: &[&str],
) -> Result<DimensionTable, LoadError> {
    assert_required_columns(&raw.headers, required, &raw.name)?;
    let key_idx = raw.column_index(key_column);

    let rows = raw
        .rows
        .iter()
        .map(|cells| {
            let mut record = DimensionRecord::default();
            for (i, (name, cell)) in raw.headers.iter().zip(cells).enumerate() {
                if Some(i) == key_idx {
                    record.key = cell.as_deref().and_then(normalize_key);
                } else if let Some(value) = cell {
                    record.attributes.insert(name.clone(), value.clone());
                }
            }
            record
        })
        .collect();

    Ok(DimensionTable {
        name: raw.name,
        key_column: key_column.to_string(),
        columns: raw.headers,
        rows,
    })
}
