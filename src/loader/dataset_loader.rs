use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

use crate::config::DataSection;
use crate::error::{DashboardError, DashboardResult};
use crate::models::{CUSTOMER_STATE, GEOLOCATION_STATE, PRODUCT_CATEGORY, PURCHASE_TIMESTAMP, Table};

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Read-only context holding every dataset for the lifetime of the process.
pub struct Datasets {
    pub products: DataFrame,
    pub sellers: DataFrame,
    pub customers: DataFrame,
    pub geolocation: DataFrame,
    pub orders: OrderTable,
}

/// The orders table with `order_purchase_timestamp` parsed into a Datetime column.
#[derive(Clone)]
pub struct OrderTable {
    frame: DataFrame,
    span: Option<(NaiveDateTime, NaiveDateTime)>,
}

impl Datasets {
    pub fn load(data: &DataSection) -> Result<Self> {
        let read = |table: Table, file: &str| -> Result<DataFrame> {
            let path = data.path_of(file);
            let df = read_csv(&path)
                .with_context(|| format!("Failed to load {} dataset", table.name()))?;
            info!(
                "Loaded {} dataset from {}: {} rows, {} columns",
                table.name(),
                path.display(),
                df.height(),
                df.width()
            );
            Ok(df)
        };

        let products = read(Table::Products, &data.products)?;
        let sellers = read(Table::Sellers, &data.sellers)?;
        let customers = read(Table::Customers, &data.customers)?;
        let geolocation = read(Table::Geolocation, &data.geolocation)?;
        let orders = read(Table::Orders, &data.orders)?;

        Self::from_frames(products, sellers, customers, geolocation, orders)
            .context("Datasets do not match the expected layout")
    }

    pub fn from_frames(
        products: DataFrame,
        sellers: DataFrame,
        customers: DataFrame,
        geolocation: DataFrame,
        orders: DataFrame,
    ) -> DashboardResult<Self> {
        require_column(&products, Table::Products, PRODUCT_CATEGORY)?;
        require_column(&customers, Table::Customers, CUSTOMER_STATE)?;
        require_column(&geolocation, Table::Geolocation, GEOLOCATION_STATE)?;

        Ok(Self {
            products,
            sellers,
            customers,
            geolocation,
            orders: OrderTable::from_frame(orders)?,
        })
    }
}

impl OrderTable {
    pub fn from_frame(mut frame: DataFrame) -> DashboardResult<Self> {
        require_column(&frame, Table::Orders, PURCHASE_TIMESTAMP)?;

        let raw = frame.column(PURCHASE_TIMESTAMP)?.cast(&DataType::String)?;
        let purchased_at = raw
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value
                    .and_then(parse_purchase_timestamp)
                    .ok_or_else(|| DashboardError::Timestamp {
                        row,
                        value: value.map(str::to_string),
                    })
            })
            .collect::<DashboardResult<Vec<_>>>()?;

        debug!("Parsed {} purchase timestamps", purchased_at.len());

        let parsed = DatetimeChunked::from_naive_datetime(
            PURCHASE_TIMESTAMP.into(),
            purchased_at,
            TimeUnit::Nanoseconds,
        );
        frame.with_column(parsed.into_series())?;
        let span = purchase_span(&frame)?;

        Ok(Self { frame, span })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Earliest and latest purchase dates; the default range of the date picker.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.span.map(|(min, max)| (min.date(), max.date()))
    }
}

/// Earliest and latest value of the parsed purchase timestamp column in `frame`.
pub fn purchase_span(frame: &DataFrame) -> DashboardResult<Option<(NaiveDateTime, NaiveDateTime)>> {
    let nanos = frame.column(PURCHASE_TIMESTAMP)?.cast(&DataType::Int64)?;
    let nanos = nanos.i64()?;

    Ok(match (nanos.min(), nanos.max()) {
        (Some(min), Some(max)) => from_nanos(min).zip(from_nanos(max)),
        _ => None,
    })
}

fn from_nanos(value: i64) -> Option<NaiveDateTime> {
    let secs = value.div_euclid(NANOS_PER_SECOND);
    let nanos = value.rem_euclid(NANOS_PER_SECOND) as u32;
    DateTime::from_timestamp(secs, nanos).map(|dt| dt.naive_utc())
}

pub fn read_csv(path: &Path) -> DashboardResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10_000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|source| DashboardError::Load {
            path: path.to_path_buf(),
            source,
        })
}

/// Accepts `YYYY-MM-DD HH:MM[:SS[.fff]]`, the `T`-separated forms, or a bare date at midnight.
pub fn parse_purchase_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn require_column(df: &DataFrame, table: Table, column: &'static str) -> DashboardResult<()> {
    if df.column(column).is_err() {
        return Err(DashboardError::MissingColumn {
            table: table.name(),
            column,
        });
    }
    Ok(())
}
