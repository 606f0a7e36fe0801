//! Enumeration types for output selection.

use serde::{Deserialize, Serialize};

/// Output format for rendered dashboard data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable Markdown tables.
    #[default]
    Markdown,
    /// Machine-readable JSON.
    Json,
    /// Comma-separated values.
    Csv,
}
