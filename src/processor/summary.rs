use crate::error::DashboardResult;
use crate::loader::Datasets;
use crate::models::{GEOLOCATION_STATE, SummaryMetrics};
use crate::processor::aggregations::count_by;
use crate::processor::date_filter::FilteredOrders;

/// Headline metrics. Only `total_orders` and the first/last order depend on the date range;
/// the geolocation state count always covers the whole geolocation table.
pub fn summarize(datasets: &Datasets, filtered: &FilteredOrders) -> DashboardResult<SummaryMetrics> {
    let geolocation_states = count_by(&datasets.geolocation, &[GEOLOCATION_STATE])?.height();

    Ok(SummaryMetrics {
        total_orders: filtered.len(),
        total_products: datasets.products.height(),
        total_sellers: datasets.sellers.height(),
        total_customers: datasets.customers.height(),
        geolocation_states,
        first_order: filtered.span().map(|(first, _)| first),
        last_order: filtered.span().map(|(_, last)| last),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EndBoundary;
    use crate::models::{CUSTOMER_STATE, PRODUCT_CATEGORY, PURCHASE_TIMESTAMP};
    use crate::processor::date_filter::{DateRange, filter_orders};
    use chrono::NaiveDate;
    use polars::prelude::*;

    fn datasets() -> Datasets {
        Datasets::from_frames(
            df!(PRODUCT_CATEGORY => [Some("perfumaria"), None, Some("artes")]).unwrap(),
            df!("seller_id" => ["s1", "s2"]).unwrap(),
            df!(CUSTOMER_STATE => ["SP", "RJ", "SP", "MG"]).unwrap(),
            df!(GEOLOCATION_STATE => [Some("SP"), Some("SP"), Some("RJ"), None, Some("AC")]).unwrap(),
            df!(PURCHASE_TIMESTAMP => [
                "2017-01-05 10:00:00",
                "2017-02-10 12:00:00",
                "2017-03-15 18:30:00",
            ])
            .unwrap(),
        )
        .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_summary_counts() {
        let datasets = datasets();
        let filtered = filter_orders(
            &datasets.orders,
            DateRange::new(date(2017, 1, 1), date(2017, 2, 28)),
            EndBoundary::Midnight,
        )
        .unwrap();

        let summary = summarize(&datasets, &filtered).unwrap();
        assert_eq!(summary.total_orders, 2);
        assert_eq!(summary.total_products, 3);
        assert_eq!(summary.total_sellers, 2);
        assert_eq!(summary.total_customers, 4);
        assert_eq!(summary.geolocation_states, 3);
        assert_eq!(
            summary.first_order,
            date(2017, 1, 5).and_hms_opt(10, 0, 0)
        );
        assert_eq!(
            summary.last_order,
            date(2017, 2, 10).and_hms_opt(12, 0, 0)
        );
    }

    #[test]
    fn test_non_order_counts_ignore_date_range() {
        let datasets = datasets();
        let ranges = [
            DateRange::new(date(2017, 1, 1), date(2017, 12, 31)),
            DateRange::new(date(2017, 3, 1), date(2017, 3, 31)),
            DateRange::new(date(2018, 1, 1), date(2017, 1, 1)),
        ];

        let summaries: Vec<SummaryMetrics> = ranges
            .iter()
            .map(|range| {
                let filtered = filter_orders(&datasets.orders, *range, EndBoundary::EndOfDay).unwrap();
                summarize(&datasets, &filtered).unwrap()
            })
            .collect();

        for summary in &summaries {
            assert_eq!(summary.total_products, 3);
            assert_eq!(summary.total_sellers, 2);
            assert_eq!(summary.total_customers, 4);
            assert_eq!(summary.geolocation_states, 3);
        }
        assert_eq!(summaries[0].total_orders, 3);
        assert_eq!(summaries[1].total_orders, 1);
        assert_eq!(summaries[2].total_orders, 0);
        assert_eq!(summaries[2].first_order, None);
    }
}
