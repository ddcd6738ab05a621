use serde::{Deserialize, Serialize};

/// Sentinel filter value meaning "no filter on this dimension".
pub const ALL: &str = "All";

pub const DEFAULT_TOP_N: usize = 10;
pub const MIN_TOP_N: usize = 5;
pub const MAX_TOP_N: usize = 25;

fn all() -> String {
    ALL.to_string()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Slice selection sent by the dashboard for every tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceRequest {
    /// First month, "YYYY-MM"
    pub start_month: String,
    /// Last month (inclusive), "YYYY-MM"
    pub end_month: String,
    #[serde(default = "all")]
    pub segment: String,
    #[serde(default = "all")]
    pub category: String,
    #[serde(default = "all")]
    pub subcategory: String,
    /// Number of groups in top-N charts (5..=25, default 10)
    #[serde(default)]
    pub top_n: Option<usize>,
}

impl SliceRequest {
    pub fn new(start_month: &str, end_month: &str) -> Self {
        Self {
            start_month: start_month.to_string(),
            end_month: end_month.to_string(),
            segment: all(),
            category: all(),
            subcategory: all(),
            top_n: None,
        }
    }

    /// Reject an inverted month range. Months are zero-padded, so string
    /// order is chronological order.
    pub fn validate(&self) -> Result<(), String> {
        if self.start_month > self.end_month {
            return Err("Start month must be <= End month.".to_string());
        }
        Ok(())
    }

    pub fn top_n(&self) -> usize {
        self.top_n
            .unwrap_or(DEFAULT_TOP_N)
            .clamp(MIN_TOP_N, MAX_TOP_N)
    }

    pub fn filter(&self) -> SliceFilter {
        SliceFilter {
            start_month: self.start_month.clone(),
            end_month: self.end_month.clone(),
            segment: self.segment.clone(),
            category: self.category.clone(),
            subcategory: self.subcategory.clone(),
        }
    }
}

/// Parameters of the slice filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceFilter {
    pub start_month: String,
    pub end_month: String,
    pub segment: String,
    pub category: String,
    pub subcategory: String,
}

impl SliceFilter {
    /// Month range only, categorical filters set to "All".
    pub fn months(start_month: &str, end_month: &str) -> Self {
        Self {
            start_month: start_month.to_string(),
            end_month: end_month.to_string(),
            segment: all(),
            category: all(),
            subcategory: all(),
        }
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// One month of a slice. Ratios are `None` when their denominator is zero
/// or the prior period is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub year_month: String,
    pub revenue: f64,
    pub orders: usize,
    pub units: f64,
    pub aov: Option<f64>,
    pub asp: Option<f64>,
    pub upo: Option<f64>,
    pub mom_revenue_pct: Option<f64>,
    pub mom_orders_pct: Option<f64>,
    pub rolling_3m_revenue: Option<f64>,
}

/// Whole-slice KPI snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSnapshot {
    pub revenue: f64,
    pub orders: usize,
    pub units: f64,
    pub customers: usize,
    pub aov: Option<f64>,
    pub asp: Option<f64>,
    pub upo: Option<f64>,
    pub top10_customer_share_pct: Option<f64>,
    pub top10_product_share_pct: Option<f64>,
    pub latest_mom_revenue_pct: Option<f64>,
    pub latest_mom_orders_pct: Option<f64>,
}

/// One group on a Pareto curve, in rank order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoRow {
    pub group: String,
    pub value: f64,
    /// 1-based
    pub rank: usize,
    pub cum_value: f64,
    /// `None` when the grand total is zero
    pub cum_share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotal {
    pub group: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupShare {
    pub group: String,
    pub revenue: f64,
    /// Percent of the slice total, one decimal
    pub share_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    /// `None` when the table has no subcategory column
    pub subcategory: Option<String>,
    pub revenue: f64,
}

// ---------------------------------------------------------------------------
// Data quality
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DqIndicators {
    pub missing_customer_key_rows: usize,
    pub missing_product_key_rows: usize,
    pub negative_quantity_rows: usize,
    pub negative_sales_rows: usize,
    pub zero_or_negative_price_rows: usize,
    pub missing_customer_keys_in_dim: usize,
    pub missing_product_keys_in_dim: usize,
}

impl DqIndicators {
    /// `(name, count)` pairs in display order.
    pub fn entries(&self) -> [(&'static str, usize); 7] {
        [
            ("missing_customer_key_rows", self.missing_customer_key_rows),
            ("missing_product_key_rows", self.missing_product_key_rows),
            ("negative_quantity_rows", self.negative_quantity_rows),
            ("negative_sales_rows", self.negative_sales_rows),
            ("zero_or_negative_price_rows", self.zero_or_negative_price_rows),
            ("missing_customer_keys_in_dim", self.missing_customer_keys_in_dim),
            ("missing_product_keys_in_dim", self.missing_product_keys_in_dim),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullRate {
    pub field: String,
    pub null_rate: f64,
}

/// Data quality view of the selected slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceQuality {
    pub rows: usize,
    /// Sample-wide, not slice-specific
    pub missing_customer_keys_in_dim: usize,
    /// Sample-wide, not slice-specific
    pub missing_product_keys_in_dim: usize,
    pub null_rates: Vec<NullRate>,
}

// ---------------------------------------------------------------------------
// Dashboard responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub months: Vec<String>,
    pub default_start: Option<String>,
    pub default_end: Option<String>,
    /// "All" first, then sorted distinct values
    pub segments: Vec<String>,
    pub categories: Vec<String>,
    pub subcategories: Vec<String>,
}

/// A KPI prepared for a dashboard card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiCard {
    pub id: String,
    pub title: String,
    pub value: Option<f64>,
    /// Formatted value, "—" when undefined
    pub display: String,
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveResponse {
    pub kpis: KpiSnapshot,
    pub cards: Vec<KpiCard>,
    pub monthly: Vec<MonthlyAggregate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendsResponse {
    pub monthly: Vec<MonthlyAggregate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomersResponse {
    pub top_customers: Vec<GroupTotal>,
    pub pareto: Vec<ParetoRow>,
    /// `None` when the data has no customer_segment column
    pub segment_shares: Option<Vec<GroupShare>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductsResponse {
    pub top_products: Vec<GroupTotal>,
    pub pareto: Vec<ParetoRow>,
    /// `None` when the data has no category column
    pub categories: Option<Vec<CategoryTotal>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_inverted_range() {
        assert!(SliceRequest::new("2013-01", "2013-03").validate().is_ok());
        assert!(SliceRequest::new("2013-03", "2013-03").validate().is_ok());
        let err = SliceRequest::new("2013-04", "2013-03").validate().unwrap_err();
        assert_eq!(err, "Start month must be <= End month.");
    }

    #[test]
    fn test_request_defaults_from_json() {
        let req: SliceRequest =
            serde_json::from_str(r#"{"start_month":"2013-01","end_month":"2013-06"}"#).unwrap();
        assert_eq!(req.segment, ALL);
        assert_eq!(req.category, ALL);
        assert_eq!(req.subcategory, ALL);
        assert_eq!(req.top_n(), DEFAULT_TOP_N);
    }

    #[test]
    fn test_top_n_is_clamped() {
        let mut req = SliceRequest::new("2013-01", "2013-06");
        req.top_n = Some(1);
        assert_eq!(req.top_n(), MIN_TOP_N);
        req.top_n = Some(100);
        assert_eq!(req.top_n(), MAX_TOP_N);
        req.top_n = Some(15);
        assert_eq!(req.top_n(), 15);
    }
}
