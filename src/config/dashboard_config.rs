use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::DashboardError;

/// Environment variable that overrides `[data] dir`.
pub const DATA_DIR_ENV: &str = "DASHBOARD_DATA_DIR";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data: DataSection,
    pub filter: FilterSection,
    pub report: ReportSection,
}

/// Locations of the five CSV datasets, relative to `dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    pub dir: PathBuf,
    pub products: String,
    pub sellers: String,
    pub customers: String,
    pub geolocation: String,
    pub orders: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSection {
    pub end_boundary: EndBoundary,
}

/// Which instant of the end date closes the filter range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndBoundary {
    /// Only the midnight instant of the end date is included.
    #[default]
    Midnight,
    /// The whole end date is included.
    EndOfDay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub top_categories: usize,
    pub anomaly_upper_ratio: f64,
    pub anomaly_lower_ratio: f64,
}

impl DashboardConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dashboard config file: {}", path))?;

        let mut config: DashboardConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse dashboard config file: {}", path))?;

        config.apply_env_overrides();
        config.validate(path)?;

        Ok(config)
    }

    /// Falls back to defaults when `path` does not exist.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            return Self::from_file(path);
        }

        tracing::warn!("Config file not found at {}, using defaults", path);
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate(path)?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| env::var(key).ok());
    }

    /// Applies overrides read through `lookup`. Blank values are ignored.
    pub fn apply_env_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|dir| !dir.trim().is_empty()) {
            self.data.dir = PathBuf::from(dir);
        }
    }

    /// Command-line flags take precedence over both the file and the environment.
    pub fn apply_cli(&mut self, data_dir: Option<PathBuf>, end_of_day: bool) {
        if let Some(dir) = data_dir {
            self.data.dir = dir;
        }
        if end_of_day {
            self.filter.end_boundary = EndBoundary::EndOfDay;
        }
    }

    pub fn validate(&self, path: &str) -> Result<(), DashboardError> {
        let invalid = |reason: &str| DashboardError::Config {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        if self.report.top_categories == 0 {
            return Err(invalid("report.top_categories must be at least 1"));
        }

        let (lower, upper) = (self.report.anomaly_lower_ratio, self.report.anomaly_upper_ratio);
        if !lower.is_finite() || !upper.is_finite() || lower < 0.0 || upper < 0.0 {
            return Err(invalid("anomaly ratios must be finite and non-negative"));
        }
        if lower > upper {
            return Err(invalid("anomaly_lower_ratio cannot exceed anomaly_upper_ratio"));
        }

        for (name, file) in self.data.files() {
            if file.is_empty() {
                return Err(invalid(&format!("data.{} cannot be empty", name)));
            }
        }

        Ok(())
    }
}

impl DataSection {
    pub fn files(&self) -> [(&'static str, &str); 5] {
        [
            ("products", &self.products),
            ("sellers", &self.sellers),
            ("customers", &self.customers),
            ("geolocation", &self.geolocation),
            ("orders", &self.orders),
        ]
    }

    pub fn path_of(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./Data"),
            products: "products_dataset.csv".to_string(),
            sellers: "sellers_dataset.csv".to_string(),
            customers: "customers_dataset.csv".to_string(),
            geolocation: "geolocation_dataset.csv".to_string(),
            orders: "orders_dataset.csv".to_string(),
        }
    }
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            top_categories: 10,
            anomaly_upper_ratio: 1.5,
            anomaly_lower_ratio: 0.5,
        }
    }
}
