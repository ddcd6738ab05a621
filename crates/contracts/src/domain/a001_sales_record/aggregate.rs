use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::common::values::{
    normalize_key, number_text, parse_date, parse_number, year_month,
};

// ============================================================================
// Columns
// ============================================================================

/// Columns of the enriched sales table that have a typed slot on `SalesRecord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    OrderNumber,
    OrderDate,
    ShippingDate,
    DueDate,
    YearMonth,
    CustomerKey,
    ProductKey,
    Quantity,
    Price,
    SalesAmount,
    CustomerNumber,
    FirstName,
    LastName,
    CustomerSegment,
    Category,
    Subcategory,
    ProductName,
    CustomerDisplay,
    CustomerName,
}

impl Column {
    pub const ALL: [Column; 19] = [
        Column::OrderNumber,
        Column::OrderDate,
        Column::ShippingDate,
        Column::DueDate,
        Column::YearMonth,
        Column::CustomerKey,
        Column::ProductKey,
        Column::Quantity,
        Column::Price,
        Column::SalesAmount,
        Column::CustomerNumber,
        Column::FirstName,
        Column::LastName,
        Column::CustomerSegment,
        Column::Category,
        Column::Subcategory,
        Column::ProductName,
        Column::CustomerDisplay,
        Column::CustomerName,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Column::OrderNumber => "order_number",
            Column::OrderDate => "order_date",
            Column::ShippingDate => "shipping_date",
            Column::DueDate => "due_date",
            Column::YearMonth => "year_month",
            Column::CustomerKey => "customer_key",
            Column::ProductKey => "product_key",
            Column::Quantity => "quantity",
            Column::Price => "price",
            Column::SalesAmount => "sales_amount",
            Column::CustomerNumber => "customer_number",
            Column::FirstName => "first_name",
            Column::LastName => "last_name",
            Column::CustomerSegment => "customer_segment",
            Column::Category => "category",
            Column::Subcategory => "subcategory",
            Column::ProductName => "product_name",
            Column::CustomerDisplay => "customer_display",
            Column::CustomerName => "customer_name",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == name)
    }
}

// ============================================================================
// Schema
// ============================================================================

/// Columns present in a sales table, in source order.
///
/// Built once when the table is loaded or enriched. Computations ask the
/// schema whether an optional column exists instead of probing rows, so an
/// absent column stays distinguishable from a column full of nulls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSchema {
    columns: Vec<String>,
}

impl SalesSchema {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Self::default();
        for name in names {
            schema.insert(name);
        }
        schema
    }

    pub fn has(&self, column: Column) -> bool {
        self.has_name(column.as_str())
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Append a column name unless it is already present.
    pub fn insert(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.has_name(&name) {
            self.columns.push(name);
        }
    }

    pub fn names(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ============================================================================
// Record
// ============================================================================

/// One row of the (enriched) sales fact table.
///
/// Every field is optional: `None` is a null cell. Columns without a typed
/// slot live in `attributes`, where a missing entry means null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub order_number: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub shipping_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub year_month: Option<String>,
    pub customer_key: Option<String>,
    pub product_key: Option<String>,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
    pub sales_amount: Option<f64>,

    pub customer_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub customer_segment: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub product_name: Option<String>,
    pub customer_display: Option<String>,
    pub customer_name: Option<String>,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl SalesRecord {
    /// Assign a cleaned cell to the column named `name`.
    ///
    /// Dates and numbers that fail to parse become `None`; keys are normalized.
    pub fn set_value(&mut self, name: &str, value: Option<&str>) {
        let Some(column) = Column::from_name(name) else {
            match value {
                Some(v) => {
                    self.attributes.insert(name.to_string(), v.to_string());
                }
                None => {
                    self.attributes.remove(name);
                }
            }
            return;
        };

        let text = value.map(str::to_string);
        match column {
            Column::OrderNumber => self.order_number = value.and_then(normalize_key),
            Column::OrderDate => self.order_date = value.and_then(parse_date),
            Column::ShippingDate => self.shipping_date = value.and_then(parse_date),
            Column::DueDate => self.due_date = value.and_then(parse_date),
            Column::YearMonth => self.year_month = text,
            Column::CustomerKey => self.customer_key = value.and_then(normalize_key),
            Column::ProductKey => self.product_key = value.and_then(normalize_key),
            Column::Quantity => self.quantity = value.and_then(parse_number),
            Column::Price => self.price = value.and_then(parse_number),
            Column::SalesAmount => self.sales_amount = value.and_then(parse_number),
            Column::CustomerNumber => self.customer_number = text,
            Column::FirstName => self.first_name = text,
            Column::LastName => self.last_name = text,
            Column::CustomerSegment => self.customer_segment = text,
            Column::Category => self.category = text,
            Column::Subcategory => self.subcategory = text,
            Column::ProductName => self.product_name = text,
            Column::CustomerDisplay => self.customer_display = text,
            Column::CustomerName => self.customer_name = text,
        }
    }

    /// String form of a typed column.
    pub fn text(&self, column: Column) -> Option<String> {
        let date_text = |d: &Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string());
        match column {
            Column::OrderNumber => self.order_number.clone(),
            Column::OrderDate => date_text(&self.order_date),
            Column::ShippingDate => date_text(&self.shipping_date),
            Column::DueDate => date_text(&self.due_date),
            Column::YearMonth => self.year_month.clone(),
            Column::CustomerKey => self.customer_key.clone(),
            Column::ProductKey => self.product_key.clone(),
            Column::Quantity => self.quantity.map(number_text),
            Column::Price => self.price.map(number_text),
            Column::SalesAmount => self.sales_amount.map(number_text),
            Column::CustomerNumber => self.customer_number.clone(),
            Column::FirstName => self.first_name.clone(),
            Column::LastName => self.last_name.clone(),
            Column::CustomerSegment => self.customer_segment.clone(),
            Column::Category => self.category.clone(),
            Column::Subcategory => self.subcategory.clone(),
            Column::ProductName => self.product_name.clone(),
            Column::CustomerDisplay => self.customer_display.clone(),
            Column::CustomerName => self.customer_name.clone(),
        }
    }

    /// String form of any column, typed or not.
    pub fn value_text(&self, name: &str) -> Option<String> {
        match Column::from_name(name) {
            Some(column) => self.text(column),
            None => self.attributes.get(name).cloned(),
        }
    }

    /// Numeric value of any column; text columns are parsed.
    pub fn value_number(&self, name: &str) -> Option<f64> {
        match Column::from_name(name) {
            Some(Column::Quantity) => self.quantity,
            Some(Column::Price) => self.price,
            Some(Column::SalesAmount) => self.sales_amount,
            _ => self.value_text(name).as_deref().and_then(parse_number),
        }
    }

    pub fn is_null(&self, name: &str) -> bool {
        self.value_text(name).is_none()
    }

    /// `year_month` from `order_date` when not already present.
    pub fn derive_year_month(&mut self) {
        if self.year_month.is_none() {
            self.year_month = self.order_date.map(year_month);
        }
    }
}

// ============================================================================
// Table
// ============================================================================

/// A sales table: schema plus rows. Derived tables are always new values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesTable {
    pub schema: SalesSchema,
    pub rows: Vec<SalesRecord>,
}

impl SalesTable {
    pub fn new(schema: SalesSchema, rows: Vec<SalesRecord>) -> Self {
        Self { schema, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Same schema, subset of rows.
    pub fn with_rows(&self, rows: Vec<SalesRecord>) -> Self {
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }
}
