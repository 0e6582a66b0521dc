use chrono::{Duration, NaiveDate};
use polars::prelude::*;

use crate::error::DashboardResult;
use crate::models::{MONTH, PURCHASE_TIMESTAMP, WEEK, YEAR};
use crate::processor::date_filter::FilteredOrders;

/// Monday-to-Sunday week label, e.g. `2017-01-02/2017-01-08`. Sorts chronologically.
pub fn week_period_label(monday: NaiveDate) -> String {
    format!("{}/{}", monday, monday + Duration::days(6))
}

/// Calendar month label, e.g. `2017-01`.
pub fn month_period_label(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// Builds a fresh frame of derived period columns, one row per filtered order:
/// `year`, `month` and `week` (the Monday starting the week, as `YYYY-MM-DD`).
/// The filtered orders themselves are left untouched.
pub fn period_view(orders: &FilteredOrders) -> DashboardResult<DataFrame> {
    let purchased = col(PURCHASE_TIMESTAMP);

    let view = orders
        .frame()
        .clone()
        .lazy()
        .select([
            purchased.clone().dt().year().cast(DataType::Int32).alias(YEAR),
            purchased.clone().dt().month().cast(DataType::UInt32).alias(MONTH),
            purchased
                .dt()
                .truncate(lit("1w"))
                .cast(DataType::Date)
                .cast(DataType::String)
                .alias(WEEK),
        ])
        .collect()?;

    Ok(view)
}
