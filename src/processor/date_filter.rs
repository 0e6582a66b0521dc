use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use tracing::{info, warn};

use crate::config::EndBoundary;
use crate::error::DashboardResult;
use crate::loader::{OrderTable, purchase_span};
use crate::models::{AppliedRange, PURCHASE_TIMESTAMP};

/// Inclusive calendar date range selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Orders whose purchase timestamp falls within a [`DateRange`].
#[derive(Debug, Clone)]
pub struct FilteredOrders {
    frame: DataFrame,
    span: Option<(NaiveDateTime, NaiveDateTime)>,
    range: DateRange,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Missing ends default to the earliest/latest purchase date.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        orders: &OrderTable,
    ) -> Option<Self> {
        let bounds = orders.date_bounds();
        let start = start.or(bounds.map(|(min, _)| min))?;
        let end = end.or(bounds.map(|(_, max)| max))?;
        Some(Self::new(start, end))
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Predicate over the purchase timestamp column. With [`EndBoundary::Midnight`]
    /// only the first instant of `end` is inside the range.
    pub fn predicate(&self, boundary: EndBoundary) -> Expr {
        let lower = col(PURCHASE_TIMESTAMP).gt_eq(lit(self.start.and_time(NaiveTime::MIN)));

        let upper = match boundary {
            EndBoundary::Midnight => {
                col(PURCHASE_TIMESTAMP).lt_eq(lit(self.end.and_time(NaiveTime::MIN)))
            }
            EndBoundary::EndOfDay => match self.end.succ_opt() {
                Some(next) => col(PURCHASE_TIMESTAMP).lt(lit(next.and_time(NaiveTime::MIN))),
                None => lit(true),
            },
        };

        lower.and(upper)
    }

    pub fn applied(&self) -> AppliedRange {
        AppliedRange {
            start: self.start,
            end: self.end,
            inverted: self.is_inverted(),
        }
    }
}

impl FilteredOrders {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Earliest and latest purchase timestamp among the filtered orders.
    pub fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.span
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }
}

pub fn filter_orders(
    orders: &OrderTable,
    range: DateRange,
    boundary: EndBoundary,
) -> DashboardResult<FilteredOrders> {
    if range.is_inverted() {
        warn!(
            "Date range is inverted ({} > {}), no orders will match",
            range.start, range.end
        );
    }

    if let Some((min, max)) = orders.date_bounds() {
        if range.start < min || range.end > max {
            warn!(
                "Date range {}..={} extends beyond the available orders {}..={}",
                range.start, range.end, min, max
            );
        }
    }

    let frame = orders
        .frame()
        .clone()
        .lazy()
        .filter(range.predicate(boundary))
        .collect()?;
    let span = purchase_span(&frame)?;

    info!(
        "Filtered orders {}..={} ({:?} boundary): {} of {} rows",
        range.start,
        range.end,
        boundary,
        frame.height(),
        orders.len()
    );

    Ok(FilteredOrders { frame, span, range })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PURCHASE_TIMESTAMP;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn orders(timestamps: &[&str]) -> OrderTable {
        let ids: Vec<String> = (0..timestamps.len()).map(|i| format!("o{}", i)).collect();
        let frame = df!(
            "order_id" => ids,
            PURCHASE_TIMESTAMP => timestamps,
        )
        .unwrap();
        OrderTable::from_frame(frame).unwrap()
    }

    #[test]
    fn test_filter_example_range() {
        let table = orders(&["2023-01-05", "2023-01-20", "2023-02-10"]);
        let filtered = filter_orders(
            &table,
            DateRange::new(date(2023, 1, 1), date(2023, 1, 31)),
            EndBoundary::Midnight,
        )
        .unwrap();

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.frame().height(), 2);
        let ids: Vec<&str> = filtered
            .frame()
            .column("order_id")
            .unwrap()
            .str()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(ids, vec!["o0", "o1"]);
        assert_eq!(
            filtered.span(),
            Some((
                date(2023, 1, 5).and_time(NaiveTime::MIN),
                date(2023, 1, 20).and_time(NaiveTime::MIN)
            ))
        );
    }

    #[test]
    fn test_midnight_boundary_excludes_rest_of_end_date() {
        let table = orders(&["2023-01-31 00:00:00", "2023-01-31 09:15:00", "2023-01-01 00:00:00"]);
        let range = DateRange::new(date(2023, 1, 1), date(2023, 1, 31));

        let midnight = filter_orders(&table, range, EndBoundary::Midnight).unwrap();
        assert_eq!(midnight.len(), 2);

        let end_of_day = filter_orders(&table, range, EndBoundary::EndOfDay).unwrap();
        assert_eq!(end_of_day.len(), 3);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let table = orders(&["2023-01-05 10:00:00", "2023-01-20 11:00:00"]);
        let range = DateRange::new(date(2023, 1, 31), date(2023, 1, 1));
        assert!(range.is_inverted());
        assert!(range.applied().inverted);

        let filtered = filter_orders(&table, range, EndBoundary::EndOfDay).unwrap();
        assert!(filtered.is_empty());
        assert_eq!(filtered.frame().height(), 0);
    }

    #[test]
    fn test_widening_range_never_shrinks_result() {
        let table = orders(&[
            "2017-01-03 08:00:00",
            "2017-01-09 12:30:00",
            "2017-02-14 00:00:00",
            "2017-03-01 23:59:59",
            "2017-05-20 13:13:13",
            "2017-05-21 00:00:00",
        ]);

        for boundary in [EndBoundary::Midnight, EndBoundary::EndOfDay] {
            let mut previous = 0;
            for end_month in 1..=6 {
                let range = DateRange::new(date(2017, 1, 1), date(2017, end_month, 21));
                let count = filter_orders(&table, range, boundary).unwrap().len();
                assert!(count >= previous);
                previous = count;
            }
            assert_eq!(previous, 6);
        }
    }

    #[test]
    fn test_resolve_defaults_to_order_bounds() {
        let table = orders(&["2017-09-04 21:15:19", "2018-10-17 17:30:18"]);

        let range = DateRange::resolve(None, None, &table).unwrap();
        assert_eq!(range, DateRange::new(date(2017, 9, 4), date(2018, 10, 17)));

        let range = DateRange::resolve(Some(date(2018, 1, 1)), None, &table).unwrap();
        assert_eq!(range.start, date(2018, 1, 1));
        assert_eq!(range.end, date(2018, 10, 17));

        let empty = orders(&[]);
        assert!(DateRange::resolve(None, None, &empty).is_none());
        assert!(DateRange::resolve(Some(date(2018, 1, 1)), Some(date(2018, 2, 1)), &empty).is_some());
    }
}
