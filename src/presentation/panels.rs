use tracing::{debug, info};

use crate::config::ReportSection;
use crate::error::DashboardResult;
use crate::loader::Datasets;
use crate::models::{
    Chart, DashboardReport, LabelCount, LineSeries, MONTH_LABELS, MonthCount, PanelReport,
    month_label,
};
use crate::processor::{
    AnomalyThresholds, FilteredOrders, customer_locations, detect_anomalies,
    geolocation_distribution, monthly_trend, monthly_volume, period_view, summarize,
    top_categories, weekly_trend, yearly_trends,
};

pub const NO_ORDERS_MESSAGE: &str = "No orders in the selected date range";

/// Everything a panel may read. Nothing here is mutated while panels build.
pub struct PanelContext<'a> {
    pub datasets: &'a Datasets,
    pub filtered: &'a FilteredOrders,
    pub report: &'a ReportSection,
}

/// A titled dashboard section and the computation that fills it.
#[derive(Clone, Copy)]
pub struct Panel {
    pub title: &'static str,
    pub build: fn(&PanelContext) -> DashboardResult<Chart>,
}

pub const PANELS: [Panel; 8] = [
    Panel {
        title: "Top-Selling Products and Categories",
        build: top_categories_chart,
    },
    Panel {
        title: "Customer Origin",
        build: customer_locations_chart,
    },
    Panel {
        title: "Peak Order Volume",
        build: order_volume_chart,
    },
    Panel {
        title: "Order Trends",
        build: order_trends_chart,
    },
    Panel {
        title: "Order Distribution by Geography",
        build: geolocation_chart,
    },
    Panel {
        title: "Seasonal Patterns",
        build: seasonal_chart,
    },
    Panel {
        title: "Anomaly Detection",
        build: anomaly_chart,
    },
    Panel {
        title: "Year-over-Year Trends",
        build: yearly_trends_chart,
    },
];

pub fn build_report(
    datasets: &Datasets,
    filtered: &FilteredOrders,
    report: &ReportSection,
) -> DashboardResult<DashboardReport> {
    let ctx = PanelContext {
        datasets,
        filtered,
        report,
    };

    let summary = summarize(datasets, filtered)?;
    let mut panels = Vec::with_capacity(PANELS.len());

    for panel in PANELS.iter() {
        let chart = (panel.build)(&ctx)?;
        debug!("Built panel '{}' (empty: {})", panel.title, chart.is_empty());
        panels.push(PanelReport {
            title: panel.title.to_string(),
            chart,
        });
    }

    info!(
        "Built {} panels for {} filtered orders",
        panels.len(),
        summary.total_orders
    );

    Ok(DashboardReport {
        range: filtered.range().applied(),
        summary,
        panels,
    })
}

fn top_categories_chart(ctx: &PanelContext) -> DashboardResult<Chart> {
    let limit = ctx.report.top_categories;
    Ok(bar(
        &format!("Top {} Categories by Sales", limit),
        "Product Category",
        "Number of Sales",
        top_categories(&ctx.datasets.products, limit)?,
    ))
}

fn customer_locations_chart(ctx: &PanelContext) -> DashboardResult<Chart> {
    Ok(bar(
        "Top Customer States",
        "State",
        "Number of Customers",
        customer_locations(&ctx.datasets.customers)?,
    ))
}

fn order_volume_chart(ctx: &PanelContext) -> DashboardResult<Chart> {
    month_volume_chart(ctx, "Monthly Order Volume")
}

fn seasonal_chart(ctx: &PanelContext) -> DashboardResult<Chart> {
    month_volume_chart(ctx, "Seasonal Order Pattern")
}

fn month_volume_chart(ctx: &PanelContext, title: &str) -> DashboardResult<Chart> {
    if ctx.filtered.is_empty() {
        return Ok(no_orders());
    }

    let periods = period_view(ctx.filtered)?;
    let bars = monthly_volume(&periods)?
        .into_iter()
        .map(|MonthCount { month, count }| LabelCount::new(month_label(month), count))
        .collect();

    Ok(bar(title, "Month", "Number of Orders", bars))
}

fn order_trends_chart(ctx: &PanelContext) -> DashboardResult<Chart> {
    if ctx.filtered.is_empty() {
        return Ok(no_orders());
    }

    let periods = period_view(ctx.filtered)?;
    Ok(Chart::Stack {
        charts: vec![
            line("Weekly Order Trends", "Week", weekly_trend(&periods)?),
            line("Monthly Order Trends", "Month", monthly_trend(&periods)?),
        ],
    })
}

fn geolocation_chart(ctx: &PanelContext) -> DashboardResult<Chart> {
    Ok(bar(
        "Order Distribution by Geolocation",
        "State",
        "Number of Locations",
        geolocation_distribution(&ctx.datasets.geolocation)?,
    ))
}

fn anomaly_chart(ctx: &PanelContext) -> DashboardResult<Chart> {
    if ctx.filtered.is_empty() {
        return Ok(no_orders());
    }

    let periods = period_view(ctx.filtered)?;
    let anomalies = detect_anomalies(
        weekly_trend(&periods)?,
        AnomalyThresholds::from_report(ctx.report),
    );

    let mut notes = Vec::new();
    if let Some(mean) = anomaly_mean_note(anomalies.rounded_mean()) {
        notes.push(mean);
    }
    if anomalies.anomalies.is_empty() {
        notes.push("Weekly anomalies: none".to_string());
    } else {
        notes.push(format!("Weekly anomalies: {}", anomalies.anomalies.len()));
        notes.extend(
            anomalies
                .anomalies
                .iter()
                .map(|week| format!("{}: {}", week.label, week.count)),
        );
    }

    Ok(Chart::Annotated {
        chart: Box::new(line("Weekly Order Trends", "Week", anomalies.weekly)),
        notes,
    })
}

fn yearly_trends_chart(ctx: &PanelContext) -> DashboardResult<Chart> {
    if ctx.filtered.is_empty() {
        return Ok(no_orders());
    }

    let periods = period_view(ctx.filtered)?;
    let series = yearly_trends(&periods)?
        .into_iter()
        .map(|year| LineSeries {
            name: year.year.to_string(),
            points: MONTH_LABELS
                .iter()
                .zip(year.months)
                .map(|(label, count)| (label.to_string(), count))
                .collect(),
        })
        .collect();

    Ok(Chart::Lines {
        title: "Monthly Order Trends Year-over-Year".to_string(),
        x_label: "Month".to_string(),
        y_label: "Number of Orders".to_string(),
        series,
    })
}

fn anomaly_mean_note(mean: Option<f64>) -> Option<String> {
    mean.map(|mean| format!("Average orders per week: {:.2}", mean))
}

fn bar(title: &str, x_label: &str, y_label: &str, bars: Vec<LabelCount>) -> Chart {
    Chart::Bar {
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        bars,
    }
}

fn line(title: &str, x_label: &str, points: Vec<LabelCount>) -> Chart {
    Chart::Lines {
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: "Number of Orders".to_string(),
        series: vec![LineSeries {
            name: "orders".to_string(),
            points: points
                .into_iter()
                .map(|point| (point.label, Some(point.count)))
                .collect(),
        }],
    }
}

fn no_orders() -> Chart {
    Chart::NoData {
        message: NO_ORDERS_MESSAGE.to_string(),
    }
}
