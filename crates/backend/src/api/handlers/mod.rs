// Dashboard handlers
pub mod d402_sales_analytics;
