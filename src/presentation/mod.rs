pub mod panels;
pub mod text_renderer;

pub use panels::*;
pub use text_renderer::*;

use anyhow::Result;
use clap::ValueEnum;

use crate::models::DashboardReport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn render(report: &DashboardReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)?),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}
