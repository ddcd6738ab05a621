use axum::{http::StatusCode, Json};
use contracts::dashboards::d402_sales_analytics::{
    CustomersResponse, DqIndicators, ErrorResponse, ExecutiveResponse, FilterOptions,
    ProductsResponse, SliceQuality, SliceRequest, TrendsResponse,
};

use crate::dashboards::d402_sales_analytics::service::{self, ServiceError};
use crate::shared::data::dataset::{get_dataset, SalesDataset};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

fn dataset() -> Result<&'static SalesDataset, ApiError> {
    get_dataset().map_err(|e| {
        tracing::error!("D402 Dashboard: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
    })
}

/// Run a slice computation, mapping validation failures to 400.
fn run_slice<T>(
    endpoint: &str,
    request: &SliceRequest,
    compute: impl FnOnce(&SalesDataset, &SliceRequest) -> Result<T, ServiceError>,
) -> Result<Json<T>, ApiError> {
    tracing::info!(
        "D402 Dashboard: {} for {}..{}",
        endpoint,
        request.start_month,
        request.end_month
    );

    let ds = dataset()?;
    match compute(ds, request) {
        Ok(response) => Ok(Json(response)),
        Err(ServiceError::InvalidRequest(message)) => {
            tracing::warn!("D402 Dashboard: rejected {} request: {}", endpoint, message);
            Err(api_error(StatusCode::BAD_REQUEST, message))
        }
    }
}

/// GET /api/d402/filters
pub async fn get_filters() -> Result<Json<FilterOptions>, ApiError> {
    let options = service::filter_options(dataset()?);
    tracing::info!(
        "D402 Dashboard: Returning {} months, {} segments, {} categories",
        options.months.len(),
        options.segments.len().saturating_sub(1),
        options.categories.len().saturating_sub(1)
    );
    Ok(Json(options))
}

/// GET /api/d402/data_quality/global
pub async fn get_global_dq() -> Result<Json<DqIndicators>, ApiError> {
    Ok(Json(service::global_dq(dataset()?)))
}

/// POST /api/d402/executive
pub async fn post_executive(
    Json(request): Json<SliceRequest>,
) -> Result<Json<ExecutiveResponse>, ApiError> {
    run_slice("executive", &request, service::executive)
}

/// POST /api/d402/trends
pub async fn post_trends(
    Json(request): Json<SliceRequest>,
) -> Result<Json<TrendsResponse>, ApiError> {
    run_slice("trends", &request, service::trends)
}

/// POST /api/d402/customers
pub async fn post_customers(
    Json(request): Json<SliceRequest>,
) -> Result<Json<CustomersResponse>, ApiError> {
    run_slice("customers", &request, service::customers)
}

/// POST /api/d402/products
pub async fn post_products(
    Json(request): Json<SliceRequest>,
) -> Result<Json<ProductsResponse>, ApiError> {
    run_slice("products", &request, service::products)
}

/// POST /api/d402/data_quality
pub async fn post_data_quality(
    Json(request): Json<SliceRequest>,
) -> Result<Json<SliceQuality>, ApiError> {
    run_slice("data_quality", &request, service::data_quality)
}
