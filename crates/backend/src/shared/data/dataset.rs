use std::collections::BTreeSet;
use std::path::Path;

use contracts::dashboards::d402_sales_analytics::DqIndicators;
use contracts::domain::a001_sales_record::SalesTable;
use once_cell::sync::OnceCell;

use super::enrichment::enrich;
use super::sample_loader::{load_sample, SampleData};
use crate::dashboards::d402_sales_analytics::{quality, schema};

static DATASET: OnceCell<SalesDataset> = OnceCell::new();

/// The read-only dataset every dashboard request works on.
#[derive(Debug, Clone)]
pub struct SalesDataset {
    /// Fact table joined with both report dimensions, display columns added
    pub enriched: SalesTable,
    /// Sample-wide data quality counts, computed once
    pub dq: DqIndicators,
}

impl SalesDataset {
    pub fn build(sample: SampleData) -> Self {
        for dim in [
            &sample.dim_customers,
            &sample.dim_products,
            &sample.report_customers,
            &sample.report_products,
        ] {
            let duplicates = quality::duplicate_key_count(dim);
            if duplicates > 0 {
                tracing::warn!("{}: {} rows repeat an earlier key", dim.name, duplicates);
            }
        }

        let enriched = schema::ensure_display_columns(&enrich(
            &sample.fact_sales,
            &sample.report_customers,
            &sample.report_products,
        ));
        let dq = quality::dq_indicators(&enriched, &sample.report_customers, &sample.report_products);

        for (name, count) in dq.entries() {
            tracing::info!("DQ {}: {}", name, count);
        }

        Self { enriched, dq }
    }
}

/// Load the sample from `dir` and publish it for the handlers.
pub fn initialize_dataset(dir: &Path) -> anyhow::Result<()> {
    let sample = load_sample(dir)?;
    let dataset = SalesDataset::build(sample);

    let months: BTreeSet<&str> = dataset
        .enriched
        .rows
        .iter()
        .filter_map(|r| r.year_month.as_deref())
        .collect();
    tracing::info!(
        "Dataset ready: {} enriched rows, {} columns, {} months ({} .. {})",
        dataset.enriched.len(),
        dataset.enriched.schema.len(),
        months.len(),
        months.first().copied().unwrap_or("-"),
        months.last().copied().unwrap_or("-")
    );

    DATASET
        .set(dataset)
        .map_err(|_| anyhow::anyhow!("dataset already initialized"))?;
    Ok(())
}

pub fn get_dataset() -> anyhow::Result<&'static SalesDataset> {
    DATASET
        .get()
        .ok_or_else(|| anyhow::anyhow!("dataset has not been initialized"))
}
