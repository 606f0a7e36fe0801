//! Output formatters for Markdown, JSON and CSV.

mod csv;
mod json;
mod markdown;

pub use self::csv::*;
pub use self::json::*;
pub use markdown::*;

use crate::error::PipelineResult;
use crate::models::{AutocompleteMatch, OutputFormat};
use crate::session::Snapshot;

/// Render a snapshot in the requested format.
///
/// # Errors
///
/// Returns a serialization error for JSON output.
pub fn render_snapshot(snapshot: &Snapshot, format: OutputFormat) -> PipelineResult<String> {
    match format {
        OutputFormat::Markdown => Ok(format_snapshot_markdown(snapshot)),
        OutputFormat::Json => format_snapshot_json(snapshot),
        OutputFormat::Csv => Ok(format_snapshot_csv(snapshot)),
    }
}

/// Render autocomplete candidates in the requested format.
///
/// # Errors
///
/// Returns a serialization error for JSON output.
pub fn render_suggestions(matches: &[AutocompleteMatch], format: OutputFormat) -> PipelineResult<String> {
    match format {
        OutputFormat::Markdown => Ok(format_suggestions_markdown(matches)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&compact_suggestions(matches))?),
        OutputFormat::Csv => Ok(format_suggestions_csv(matches)),
    }
}

/// Percentage cell; `n/a` for an undefined ratio.
#[must_use]
pub fn format_percentage(percentage: Option<f64>) -> String {
    percentage.map_or_else(|| "n/a".to_string(), |p| format!("{p:.1}%"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(Some(33.3)), "33.3%");
        assert_eq!(format_percentage(Some(100.0)), "100.0%");
        assert_eq!(format_percentage(None), "n/a");
    }
}
