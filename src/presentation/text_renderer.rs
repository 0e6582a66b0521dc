use std::fmt::{self, Write};

use crate::models::{Chart, DashboardReport, LabelCount, LineSeries, SummaryMetrics};

const BAR_WIDTH: usize = 40;
const BAR_GLYPH: char = '█';

/// Renders the dashboard for a terminal.
pub fn render_text(report: &DashboardReport) -> Result<String, fmt::Error> {
    let mut out = String::new();

    writeln!(out, "E-Commerce Dashboard")?;
    writeln!(out, "{}", "=".repeat(60))?;
    render_header(&mut out, report)?;
    render_metrics(&mut out, &report.summary)?;

    for panel in &report.panels {
        writeln!(out)?;
        writeln!(out, "## {}", panel.title)?;
        render_chart(&mut out, &panel.chart)?;
    }

    Ok(out)
}

fn render_header(out: &mut String, report: &DashboardReport) -> fmt::Result {
    let range = &report.range;
    writeln!(out, "Date range: {} to {}", range.start, range.end)?;
    if range.inverted {
        writeln!(out, "Warning: start date is after end date")?;
    }

    match (report.summary.first_order, report.summary.last_order) {
        (Some(first), Some(last)) => {
            writeln!(
                out,
                "Showing orders from {} to {}",
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d")
            )?;
        }
        _ => {
            writeln!(out, "No orders in the selected date range")?;
        }
    }
    writeln!(out)
}

fn render_metrics(out: &mut String, summary: &SummaryMetrics) -> fmt::Result {
    let tiles = [
        ("Total Orders", summary.total_orders),
        ("Total Products", summary.total_products),
        ("Total Sellers", summary.total_sellers),
        ("Total Customers", summary.total_customers),
        ("Total Geolocations", summary.geolocation_states),
    ];

    for (label, value) in tiles {
        writeln!(out, "{:<20} {:>12}", label, thousands(value as u64))?;
    }
    Ok(())
}

fn render_chart(out: &mut String, chart: &Chart) -> fmt::Result {
    match chart {
        Chart::Bar {
            title,
            x_label,
            y_label,
            bars,
        } => {
            writeln!(out, "{} ({} vs {})", title, y_label, x_label)?;
            render_bars(out, bars)?;
        }
        Chart::Lines {
            title,
            x_label,
            y_label,
            series,
        } => {
            writeln!(out, "{} ({} per {})", title, y_label, x_label)?;
            for line in series {
                render_series(out, line, series.len() > 1)?;
            }
        }
        Chart::Stack { charts } => {
            for chart in charts {
                render_chart(out, chart)?;
            }
        }
        Chart::Annotated { chart, notes } => {
            render_chart(out, chart)?;
            for note in notes {
                writeln!(out, "  {}", note)?;
            }
        }
        Chart::NoData { message } => {
            writeln!(out, "  ({})", message)?;
        }
    }
    Ok(())
}

fn render_bars(out: &mut String, bars: &[LabelCount]) -> fmt::Result {
    if bars.is_empty() {
        return writeln!(out, "  (no data)");
    }

    let max = bars.iter().map(|bar| bar.count).max().unwrap_or(0);
    let label_width = bars.iter().map(|bar| bar.label.chars().count()).max().unwrap_or(0);

    for bar in bars {
        writeln!(
            out,
            "  {:<width$} {:>10} {}",
            bar.label,
            thousands(bar.count),
            scaled_bar(bar.count, max),
            width = label_width
        )?;
    }
    Ok(())
}

fn render_series(out: &mut String, series: &LineSeries, named: bool) -> fmt::Result {
    if named {
        writeln!(out, "  [{}]", series.name)?;
    }
    if series.points.is_empty() {
        return writeln!(out, "  (no data)");
    }

    let max = series.points.iter().filter_map(|(_, v)| *v).max().unwrap_or(0);
    let label_width = series
        .points
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    for (label, value) in &series.points {
        match value {
            Some(count) => {
                writeln!(
                    out,
                    "  {:<width$} {:>10} {}",
                    label,
                    thousands(*count),
                    scaled_bar(*count, max),
                    width = label_width
                )?;
            }
            None => {
                writeln!(out, "  {:<width$} {:>10}", label, "-", width = label_width)?;
            }
        }
    }
    Ok(())
}

fn scaled_bar(value: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let len = ((value as f64 / max as f64) * BAR_WIDTH as f64).round() as usize;
    let len = if value > 0 { len.max(1) } else { 0 };
    BAR_GLYPH.to_string().repeat(len)
}

/// Formats `n` with comma thousands separators.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppliedRange, PanelReport};
    use chrono::NaiveDate;

    fn report(panels: Vec<PanelReport>, orders: usize) -> DashboardReport {
        let day = |d| NaiveDate::from_ymd_opt(2017, 1, d).unwrap();
        DashboardReport {
            range: AppliedRange {
                start: day(1),
                end: day(31),
                inverted: false,
            },
            summary: SummaryMetrics {
                total_orders: orders,
                total_products: 32_951,
                total_sellers: 3_095,
                total_customers: 99_441,
                geolocation_states: 27,
                first_order: if orders > 0 { day(2).and_hms_opt(9, 0, 0) } else { None },
                last_order: if orders > 0 { day(30).and_hms_opt(9, 0, 0) } else { None },
            },
            panels,
        }
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(99_441), "99,441");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_scaled_bar() {
        assert_eq!(scaled_bar(10, 10).chars().count(), BAR_WIDTH);
        assert_eq!(scaled_bar(5, 10).chars().count(), BAR_WIDTH / 2);
        assert_eq!(scaled_bar(1, 1_000).chars().count(), 1);
        assert_eq!(scaled_bar(0, 10), "");
        assert_eq!(scaled_bar(0, 0), "");
    }

    #[test]
    fn test_render_text_layout() {
        let panels = vec![
            PanelReport {
                title: "Customer Origin".to_string(),
                chart: Chart::Bar {
                    title: "Top Customer States".to_string(),
                    x_label: "State".to_string(),
                    y_label: "Number of Customers".to_string(),
                    bars: vec![LabelCount::new("SP", 41_746), LabelCount::new("RJ", 12_852)],
                },
            },
            PanelReport {
                title: "Year-over-Year Trends".to_string(),
                chart: Chart::Lines {
                    title: "Monthly Order Trends Year-over-Year".to_string(),
                    x_label: "Month".to_string(),
                    y_label: "Number of Orders".to_string(),
                    series: vec![
                        LineSeries {
                            name: "2017".to_string(),
                            points: vec![("Jan".to_string(), Some(800))],
                        },
                        LineSeries {
                            name: "2018".to_string(),
                            points: vec![("Jan".to_string(), None)],
                        },
                    ],
                },
            },
        ];

        let text = render_text(&report(panels, 1_500)).unwrap();
        assert!(text.contains("Showing orders from 2017-01-02 to 2017-01-30"));
        assert!(text.contains("Total Orders"));
        assert!(text.contains("1,500"));
        assert!(text.contains("99,441"));
        assert!(text.contains("## Customer Origin"));
        assert!(text.contains("41,746"));
        assert!(text.contains("[2017]"));
        assert!(text.contains("[2018]"));
        assert!(text.find("## Customer Origin") < text.find("## Year-over-Year Trends"));
    }

    #[test]
    fn test_render_no_data() {
        let panels = vec![PanelReport {
            title: "Order Trends".to_string(),
            chart: Chart::NoData {
                message: "No orders in the selected date range".to_string(),
            },
        }];

        let text = render_text(&report(panels, 0)).unwrap();
        assert!(text.contains("(No orders in the selected date range)"));
        assert!(!text.contains("Showing orders from"));
    }

    #[test]
    fn test_nested_charts_render_through_render() {
        let panels = vec![PanelReport {
            title: "Anomaly Detection".to_string(),
            chart: Chart::Annotated {
                chart: Box::new(Chart::Stack {
                    charts: vec![Chart::Bar {
                        title: "Weekly Orders".to_string(),
                        x_label: "Week".to_string(),
                        y_label: "Orders".to_string(),
                        bars: Vec::new(),
                    }],
                }),
                notes: vec!["Weekly anomalies: 0".to_string()],
            },
        }];
        let report = report(panels, 3);

        let text = crate::presentation::render(&report, crate::presentation::OutputFormat::Text)
            .unwrap();
        assert_eq!(text, render_text(&report).unwrap());
        assert!(text.contains("Weekly Orders (Orders vs Week)\n  (no data)\n  Weekly anomalies: 0"));
    }
}
