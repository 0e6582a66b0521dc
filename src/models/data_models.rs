use serde::{Deserialize, Serialize};

pub const PURCHASE_TIMESTAMP: &str = "order_purchase_timestamp";
pub const PRODUCT_CATEGORY: &str = "product_category_name";
pub const CUSTOMER_STATE: &str = "customer_state";
pub const GEOLOCATION_STATE: &str = "geolocation_state";

/// Columns added to the period view of the filtered orders.
pub const YEAR: &str = "year";
pub const MONTH: &str = "month";
pub const WEEK: &str = "week";

/// Name of the count column produced by grouped counts.
pub const COUNT: &str = "count";

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// The five source tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Products,
    Sellers,
    Customers,
    Geolocation,
    Orders,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::Sellers => "sellers",
            Table::Customers => "customers",
            Table::Geolocation => "geolocation",
            Table::Orders => "orders",
        }
    }
}

pub fn month_label(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_LABELS.get(idx as usize))
        .copied()
        .unwrap_or("?")
}
