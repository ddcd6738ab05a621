use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers;

/// All application routes
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // D402 SALES ANALYTICS
        // ========================================
        .route(
            "/api/d402/filters",
            get(handlers::d402_sales_analytics::get_filters),
        )
        .route(
            "/api/d402/data_quality/global",
            get(handlers::d402_sales_analytics::get_global_dq),
        )
        .route(
            "/api/d402/data_quality",
            post(handlers::d402_sales_analytics::post_data_quality),
        )
        .route(
            "/api/d402/executive",
            post(handlers::d402_sales_analytics::post_executive),
        )
        .route(
            "/api/d402/trends",
            post(handlers::d402_sales_analytics::post_trends),
        )
        .route(
            "/api/d402/customers",
            post(handlers::d402_sales_analytics::post_customers),
        )
        .route(
            "/api/d402/products",
            post(handlers::d402_sales_analytics::post_products),
        )
}
