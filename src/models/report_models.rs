use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A (label, count) pair produced by a grouped count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: u64,
}

impl LabelCount {
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: u32,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_orders: usize,
    pub total_products: usize,
    pub total_sellers: usize,
    pub total_customers: usize,
    pub geolocation_states: usize,
    pub first_order: Option<NaiveDateTime>,
    pub last_order: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    pub mean: Option<f64>,
    pub weekly: Vec<LabelCount>,
    pub anomalies: Vec<LabelCount>,
}

impl AnomalyReport {
    /// Mean weekly order count rounded to two decimals.
    pub fn rounded_mean(&self) -> Option<f64> {
        self.mean.map(|m| (m * 100.0).round() / 100.0)
    }
}

/// Monthly order counts for one year; `None` marks a month without orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearSeries {
    pub year: i32,
    pub months: [Option<u64>; 12],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppliedRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub inverted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<(String, Option<u64>)>,
}

/// Chart model handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    Bar {
        title: String,
        x_label: String,
        y_label: String,
        bars: Vec<LabelCount>,
    },
    Lines {
        title: String,
        x_label: String,
        y_label: String,
        series: Vec<LineSeries>,
    },
    Stack {
        charts: Vec<Chart>,
    },
    Annotated {
        chart: Box<Chart>,
        notes: Vec<String>,
    },
    NoData {
        message: String,
    },
}

impl Chart {
    pub fn is_empty(&self) -> bool {
        match self {
            Chart::Bar { bars, .. } => bars.is_empty(),
            Chart::Lines { series, .. } => series.iter().all(|s| s.points.is_empty()),
            Chart::Stack { charts } => charts.iter().all(Chart::is_empty),
            Chart::Annotated { chart, .. } => chart.is_empty(),
            Chart::NoData { .. } => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelReport {
    pub title: String,
    pub chart: Chart,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub range: AppliedRange,
    pub summary: SummaryMetrics,
    pub panels: Vec<PanelReport>,
}
