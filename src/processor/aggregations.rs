use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;

use crate::error::DashboardResult;
use crate::models::{
    COUNT, CUSTOMER_STATE, GEOLOCATION_STATE, LabelCount, MONTH, MonthCount, PRODUCT_CATEGORY,
    WEEK, YEAR, YearSeries,
};
use crate::processor::periods::{month_period_label, week_period_label};

/// Groups `df` by `keys` and counts rows per group into a `count` column.
/// Rows with a null in any key are dropped first.
pub fn count_by(df: &DataFrame, keys: &[&str]) -> DashboardResult<DataFrame> {
    let not_null = keys
        .iter()
        .fold(lit(true), |acc, key| acc.and(col(*key).is_not_null()));
    let group_keys: Vec<Expr> = keys.iter().map(|key| col(*key)).collect();

    let counted = df
        .clone()
        .lazy()
        .filter(not_null)
        .group_by(group_keys)
        .agg([len().alias(COUNT)])
        .collect()?;

    Ok(counted)
}

/// Counts per distinct value of `key`, largest first. Ties are ordered by label.
pub fn value_counts(df: &DataFrame, key: &str) -> DashboardResult<Vec<LabelCount>> {
    let counted = count_by(df, &[key])?;
    let mut counts = label_counts(&counted, key)?;
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    Ok(counts)
}

pub fn top_categories(products: &DataFrame, limit: usize) -> DashboardResult<Vec<LabelCount>> {
    let mut categories = value_counts(products, PRODUCT_CATEGORY)?;
    categories.truncate(limit);
    Ok(categories)
}

pub fn customer_locations(customers: &DataFrame) -> DashboardResult<Vec<LabelCount>> {
    value_counts(customers, CUSTOMER_STATE)
}

pub fn geolocation_distribution(geolocation: &DataFrame) -> DashboardResult<Vec<LabelCount>> {
    value_counts(geolocation, GEOLOCATION_STATE)
}

/// Orders per month-of-year in calendar order. Months without orders are absent.
pub fn monthly_volume(periods: &DataFrame) -> DashboardResult<Vec<MonthCount>> {
    let counted = count_by(periods, &[MONTH])?;
    let months = counted.column(MONTH)?.cast(&DataType::UInt32)?;
    let counts = counted.column(COUNT)?.cast(&DataType::UInt64)?;

    let mut volume: Vec<MonthCount> = months
        .u32()?
        .into_iter()
        .zip(counts.u64()?.into_iter())
        .filter_map(|(month, count)| Some(MonthCount { month: month?, count: count? }))
        .collect();
    volume.sort_by_key(|entry| entry.month);

    Ok(volume)
}

/// Orders per week period, oldest week first.
pub fn weekly_trend(periods: &DataFrame) -> DashboardResult<Vec<LabelCount>> {
    let mut weeks = label_counts(&count_by(periods, &[WEEK])?, WEEK)?;
    weeks.sort_by(|a, b| a.label.cmp(&b.label));

    for week in &mut weeks {
        if let Ok(monday) = NaiveDate::parse_from_str(&week.label, "%Y-%m-%d") {
            week.label = week_period_label(monday);
        }
    }

    Ok(weeks)
}

/// Orders per calendar month (`YYYY-MM`), oldest month first.
pub fn monthly_trend(periods: &DataFrame) -> DashboardResult<Vec<LabelCount>> {
    let mut months = year_month_counts(periods)?;
    months.sort_by_key(|(year, month, _)| (*year, *month));

    Ok(months
        .into_iter()
        .map(|(year, month, count)| LabelCount::new(month_period_label(year, month), count))
        .collect())
}

/// One series per year, indexed by month. Months without orders stay `None`.
pub fn yearly_trends(periods: &DataFrame) -> DashboardResult<Vec<YearSeries>> {
    let mut by_year: BTreeMap<i32, [Option<u64>; 12]> = BTreeMap::new();
    for (year, month, count) in year_month_counts(periods)? {
        let Some(idx) = month.checked_sub(1).map(|m| m as usize).filter(|idx| *idx < 12) else {
            continue;
        };
        by_year.entry(year).or_default()[idx] = Some(count);
    }

    Ok(by_year
        .into_iter()
        .map(|(year, months)| YearSeries { year, months })
        .collect())
}

fn year_month_counts(periods: &DataFrame) -> DashboardResult<Vec<(i32, u32, u64)>> {
    let counted = count_by(periods, &[YEAR, MONTH])?;
    let years = counted.column(YEAR)?.cast(&DataType::Int32)?;
    let months = counted.column(MONTH)?.cast(&DataType::UInt32)?;
    let counts = counted.column(COUNT)?.cast(&DataType::UInt64)?;

    let rows = years
        .i32()?
        .into_iter()
        .zip(months.u32()?.into_iter())
        .zip(counts.u64()?.into_iter())
        .filter_map(|((year, month), count)| Some((year?, month?, count?)))
        .collect();

    Ok(rows)
}

fn label_counts(counted: &DataFrame, key: &str) -> DashboardResult<Vec<LabelCount>> {
    let labels = counted.column(key)?.cast(&DataType::String)?;
    let counts = counted.column(COUNT)?.cast(&DataType::UInt64)?;

    let pairs = labels
        .str()?
        .into_iter()
        .zip(counts.u64()?.into_iter())
        .filter_map(|(label, count)| Some(LabelCount::new(label?, count?)))
        .collect();

    Ok(pairs)
}
