use contracts::dashboards::d402_sales_analytics::{
    CustomersResponse, DqIndicators, ExecutiveResponse, FilterOptions, KpiCard, KpiSnapshot,
    ProductsResponse, SliceQuality, SliceRequest, TrendsResponse,
};
use contracts::domain::a001_sales_record::{Column, SalesTable};
use thiserror::Error;

use super::{filters, metrics, quality};
use crate::shared::data::dataset::SalesDataset;
use crate::shared::format::{
    format_grouped, format_money0, format_money2, format_number, format_pct1, format_ratio2,
    format_signed_pct1,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidRequest(String),
}

/// Validate the request and cut the slice it selects.
fn slice(ds: &SalesDataset, request: &SliceRequest) -> Result<SalesTable, ServiceError> {
    request.validate().map_err(ServiceError::InvalidRequest)?;
    let slice = filters::filter_slice(&ds.enriched, &request.filter());
    tracing::debug!(
        "D402: slice {}..{} segment={} category={} subcategory={} -> {} rows",
        request.start_month,
        request.end_month,
        request.segment,
        request.category,
        request.subcategory,
        slice.len()
    );
    Ok(slice)
}

pub fn filter_options(ds: &SalesDataset) -> FilterOptions {
    filters::filter_options(&ds.enriched)
}

pub fn global_dq(ds: &SalesDataset) -> DqIndicators {
    ds.dq.clone()
}

/// KPI snapshot with cards and the monthly series.
pub fn executive(ds: &SalesDataset, request: &SliceRequest) -> Result<ExecutiveResponse, ServiceError> {
    let slice = slice(ds, request)?;
    let kpis = metrics::kpis(&slice);
    Ok(ExecutiveResponse {
        cards: kpi_cards(&kpis),
        monthly: metrics::compute_monthly(&slice),
        kpis,
    })
}

pub fn trends(ds: &SalesDataset, request: &SliceRequest) -> Result<TrendsResponse, ServiceError> {
    let slice = slice(ds, request)?;
    Ok(TrendsResponse {
        monthly: metrics::compute_monthly(&slice),
    })
}

pub fn customers(ds: &SalesDataset, request: &SliceRequest) -> Result<CustomersResponse, ServiceError> {
    let slice = slice(ds, request)?;
    Ok(CustomersResponse {
        top_customers: metrics::top_groups(&slice, Column::CustomerName, request.top_n()),
        pareto: metrics::pareto_curve(
            &slice,
            Column::CustomerName.as_str(),
            Column::SalesAmount.as_str(),
        ),
        segment_shares: metrics::share_breakdown(&slice, Column::CustomerSegment),
    })
}

pub fn products(ds: &SalesDataset, request: &SliceRequest) -> Result<ProductsResponse, ServiceError> {
    let slice = slice(ds, request)?;
    Ok(ProductsResponse {
        top_products: metrics::top_groups(&slice, Column::ProductName, request.top_n()),
        pareto: metrics::pareto_curve(
            &slice,
            Column::ProductName.as_str(),
            Column::SalesAmount.as_str(),
        ),
        categories: metrics::category_breakdown(&slice, metrics::CATEGORY_TABLE_LIMIT),
    })
}

pub fn data_quality(ds: &SalesDataset, request: &SliceRequest) -> Result<SliceQuality, ServiceError> {
    let slice = slice(ds, request)?;
    Ok(quality::slice_quality(&slice, &ds.dq))
}

// ---------------------------------------------------------------------------
// KPI cards
// ---------------------------------------------------------------------------

fn card(id: &str, title: &str, value: Option<f64>, display: String, subtitle: Option<&str>) -> KpiCard {
    KpiCard {
        id: id.to_string(),
        title: title.to_string(),
        value,
        display,
        subtitle: subtitle.map(str::to_string),
    }
}

/// Executive tab cards, in display order.
pub fn kpi_cards(k: &KpiSnapshot) -> Vec<KpiCard> {
    vec![
        card("revenue", "Revenue", Some(k.revenue), format_money0(Some(k.revenue)), None),
        card("orders", "Orders", Some(k.orders as f64), format_number(k.orders), None),
        card(
            "units",
            "Units",
            Some(k.units),
            format_grouped(k.units, 0),
            None,
        ),
        card(
            "customers",
            "Active Customers",
            Some(k.customers as f64),
            format_number(k.customers),
            None,
        ),
        card("aov", "AOV", k.aov, format_money0(k.aov), Some("Revenue / Orders")),
        card("asp", "ASP", k.asp, format_money2(k.asp), Some("Revenue / Units")),
        card("upo", "Units per Order", k.upo, format_ratio2(k.upo), Some("Units / Orders")),
        card(
            "mom_revenue",
            "MoM Revenue",
            k.latest_mom_revenue_pct,
            format_signed_pct1(k.latest_mom_revenue_pct),
            Some("Latest month vs previous"),
        ),
        card(
            "mom_orders",
            "MoM Orders",
            k.latest_mom_orders_pct,
            format_signed_pct1(k.latest_mom_orders_pct),
            Some("Latest month vs previous"),
        ),
        card(
            "top10_customer_share",
            "Top 10 Customers Share",
            k.top10_customer_share_pct,
            format_pct1(k.top10_customer_share_pct),
            Some("Share of revenue"),
        ),
        card(
            "top10_product_share",
            "Top 10 Products Share",
            k.top10_product_share_pct,
            format_pct1(k.top10_product_share_pct),
            Some("Share of revenue"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_sales_record::{SalesRecord, SalesSchema};

    fn sale(order: &str, ym: &str, customer: &str, segment: &str, amount: f64) -> SalesRecord {
        SalesRecord {
            order_number: Some(order.into()),
            year_month: Some(ym.into()),
            customer_key: Some(customer.into()),
            customer_name: Some(format!("C{customer}")),
            customer_segment: Some(segment.into()),
            product_name: Some("Road Bike".into()),
            quantity: Some(1.0),
            sales_amount: Some(amount),
            ..Default::default()
        }
    }

    fn dataset() -> SalesDataset {
        let schema = SalesSchema::from_names([
            "order_number",
            "year_month",
            "customer_key",
            "customer_name",
            "customer_segment",
            "product_name",
            "quantity",
            "sales_amount",
        ]);
        SalesDataset {
            enriched: SalesTable::new(
                schema,
                vec![
                    sale("SO1", "2013-01", "1", "VIP", 100.0),
                    sale("SO2", "2013-02", "2", "Regular", 150.0),
                    sale("SO3", "2013-03", "1", "VIP", 90.0),
                ],
            ),
            dq: DqIndicators {
                missing_customer_keys_in_dim: 2,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let request = SliceRequest::new("2013-03", "2013-01");
        let err = executive(&dataset(), &request).unwrap_err();
        assert_eq!(
            err,
            ServiceError::InvalidRequest("Start month must be <= End month.".into())
        );
        assert!(data_quality(&dataset(), &request).is_err());
    }

    #[test]
    fn test_executive_response() {
        let response = executive(&dataset(), &SliceRequest::new("2013-01", "2013-03")).unwrap();
        assert_eq!(response.kpis.revenue, 340.0);
        assert_eq!(response.kpis.orders, 3);
        assert_eq!(response.monthly.len(), 3);
        assert_eq!(response.cards.len(), 11);

        let revenue = response.cards.iter().find(|c| c.id == "revenue").unwrap();
        assert_eq!(revenue.display, "$340");
        let mom = response.cards.iter().find(|c| c.id == "mom_revenue").unwrap();
        assert_eq!(mom.display, "-40.0%");
    }

    #[test]
    fn test_customers_respects_segment_filter() {
        let mut request = SliceRequest::new("2013-01", "2013-03");
        request.segment = "VIP".into();
        let response = customers(&dataset(), &request).unwrap();

        assert_eq!(response.top_customers.len(), 1);
        assert_eq!(response.top_customers[0].group, "C1");
        assert_eq!(response.top_customers[0].revenue, 190.0);
        let shares = response.segment_shares.unwrap();
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].share_pct, Some(100.0));
    }

    #[test]
    fn test_products_without_category_column() {
        let response = products(&dataset(), &SliceRequest::new("2013-01", "2013-03")).unwrap();
        assert_eq!(response.top_products[0].group, "Road Bike");
        assert_eq!(response.pareto.len(), 1);
        assert_eq!(response.categories, None);
    }

    #[test]
    fn test_slice_quality_carries_global_counts() {
        let q = data_quality(&dataset(), &SliceRequest::new("2013-02", "2013-02")).unwrap();
        assert_eq!(q.rows, 1);
        assert_eq!(q.missing_customer_keys_in_dim, 2);
    }

    #[test]
    fn test_kpi_cards_undefined_values() {
        let k = KpiSnapshot {
            revenue: 0.0,
            orders: 0,
            units: 0.0,
            customers: 0,
            aov: None,
            asp: None,
            upo: None,
            top10_customer_share_pct: None,
            top10_product_share_pct: None,
            latest_mom_revenue_pct: None,
            latest_mom_orders_pct: None,
        };
        let cards = kpi_cards(&k);
        assert_eq!(cards[0].display, "$0");
        assert!(cards
            .iter()
            .filter(|c| c.value.is_none())
            .all(|c| c.display == "—"));
    }

    #[test]
    fn test_kpi_cards_formats() {
        let k = KpiSnapshot {
            revenue: 1234.6,
            orders: 1200,
            units: 3000.0,
            customers: 42,
            aov: Some(1.0287),
            asp: Some(12.346),
            upo: Some(1.5),
            top10_customer_share_pct: Some(45.62),
            top10_product_share_pct: Some(100.0),
            latest_mom_revenue_pct: Some(12.34),
            latest_mom_orders_pct: Some(-4.0),
        };
        let display: Vec<String> = kpi_cards(&k).into_iter().map(|c| c.display).collect();
        assert_eq!(
            display,
            vec!["$1,235", "1,200", "3,000", "42", "$1", "$12.35", "1.50", "+12.3%", "-4.0%", "45.6%", "100.0%"]
        );
    }

    #[test]
    fn test_kpi_cards_keep_negative_totals() {
        // returns outweigh sales in the slice
        let k = KpiSnapshot {
            revenue: -5.0,
            orders: 1,
            units: -3.0,
            customers: 1,
            aov: Some(-5.0),
            asp: Some(5.0 / 3.0),
            upo: Some(-3.0),
            top10_customer_share_pct: None,
            top10_product_share_pct: None,
            latest_mom_revenue_pct: None,
            latest_mom_orders_pct: None,
        };
        let cards = kpi_cards(&k);
        let units = cards.iter().find(|c| c.id == "units").unwrap();
        assert_eq!(units.display, "-3");
        assert_eq!(units.value, Some(-3.0));
        assert_eq!(cards[0].display, "-$5");

        let many_returns = KpiSnapshot { units: -1234.0, ..k };
        let units = kpi_cards(&many_returns).remove(2);
        assert_eq!(units.display, "-1,234");
    }
}
