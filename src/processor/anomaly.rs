use crate::config::ReportSection;
use crate::models::{AnomalyReport, LabelCount};

/// Static-threshold rule over weekly order counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyThresholds {
    pub upper_ratio: f64,
    pub lower_ratio: f64,
}

impl AnomalyThresholds {
    pub fn from_report(report: &ReportSection) -> Self {
        Self {
            upper_ratio: report.anomaly_upper_ratio,
            lower_ratio: report.anomaly_lower_ratio,
        }
    }

    /// Strictly above `upper_ratio * mean` or strictly below `lower_ratio * mean`.
    pub fn is_anomalous(&self, count: u64, mean: f64) -> bool {
        let count = count as f64;
        count > self.upper_ratio * mean || count < self.lower_ratio * mean
    }
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self::from_report(&ReportSection::default())
    }
}

/// Flags weeks whose order count strays from the mean weekly count.
/// Only weeks that have orders take part in the mean.
pub fn detect_anomalies(weekly: Vec<LabelCount>, thresholds: AnomalyThresholds) -> AnomalyReport {
    if weekly.is_empty() {
        return AnomalyReport {
            mean: None,
            weekly,
            anomalies: Vec::new(),
        };
    }

    let mean = weekly.iter().map(|w| w.count as f64).sum::<f64>() / weekly.len() as f64;
    let anomalies = weekly
        .iter()
        .filter(|w| thresholds.is_anomalous(w.count, mean))
        .cloned()
        .collect();

    AnomalyReport {
        mean: Some(mean),
        weekly,
        anomalies,
    }
}
