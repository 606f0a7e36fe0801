//! CSV output formatting.

use std::fmt::Write;

use crate::models::{AutocompleteMatch, CitingWork, CoauthorNetwork, GlobalSouthSeries};
use crate::session::Snapshot;

/// Format any snapshot as CSV: the table a user would download.
#[must_use]
pub fn format_snapshot_csv(snapshot: &Snapshot) -> String {
    match snapshot {
        Snapshot::Citations(view) => format_citing_csv(&view.rows),
        Snapshot::GlobalSouth(series) => format_global_south_csv(series),
        Snapshot::Coauthors(view) => format_network_csv(&view.network),
    }
}

/// Citing works table.
#[must_use]
pub fn format_citing_csv(works: &[CitingWork]) -> String {
    let mut output = String::from("title,year,doi,pmid,is_trial\n");
    for work in works {
        let _ = writeln!(
            output,
            "{},{},{},{},{}",
            csv_escape(work.title.as_deref().unwrap_or("")),
            work.year.map_or_else(String::new, |y| y.to_string()),
            csv_escape(work.doi.as_deref().unwrap_or("")),
            work.pmid.as_deref().unwrap_or(""),
            work.is_trial
        );
    }
    output
}

/// Global-South series, one row per (series, year). Undefined ratios are empty.
#[must_use]
pub fn format_global_south_csv(series: &GlobalSouthSeries) -> String {
    let mut output = String::from("series,year,global_south,total,percentage\n");
    let local = series.local.iter().flatten().map(|r| ("local", r));
    for (name, ratio) in series.global.iter().map(|r| ("global", r)).chain(local) {
        let _ = writeln!(
            output,
            "{name},{},{},{},{}",
            ratio.year,
            ratio.numerator,
            ratio.denominator,
            ratio.percentage.map_or_else(String::new, |p| format!("{p:.1}"))
        );
    }
    output
}

/// Edge list with labels.
#[must_use]
pub fn format_network_csv(network: &CoauthorNetwork) -> String {
    let mut output = String::from("source,source_label,target,target_label,kind\n");
    for edge in &network.edges {
        let _ = writeln!(
            output,
            "{},{},{},{},{}",
            edge.source,
            csv_escape(network.label(&edge.source)),
            edge.target,
            csv_escape(network.label(&edge.target)),
            edge.kind
        );
    }
    output
}

/// Autocomplete candidates.
#[must_use]
pub fn format_suggestions_csv(matches: &[AutocompleteMatch]) -> String {
    let mut output = String::from("id,name,hint,works,citations\n");
    for m in matches {
        let _ = writeln!(
            output,
            "{},{},{},{},{}",
            m.id,
            csv_escape(&m.display_name),
            csv_escape(m.hint.as_deref().unwrap_or("")),
            m.works_count.map_or_else(String::new, |c| c.to_string()),
            m.cited_by_count.map_or_else(String::new, |c| c.to_string())
        );
    }
    output
}

fn starts_with_formula(s: &str) -> bool {
    s.starts_with(['=', '+', '-', '@'])
}

/// Escape a string for CSV output.
#[must_use]
pub fn csv_escape(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        let escaped = s.replace('"', "\"\"");
        // Leading quote keeps spreadsheets from evaluating formulas
        if starts_with_formula(&escaped) {
            format!("\"'{escaped}\"")
        } else {
            format!("\"{escaped}\"")
        }
    } else if starts_with_formula(s) {
        format!("'{s}")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CoauthorEdge, EdgeKind};

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a, b"), "\"a, b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(csv_escape("-1, 2"), "\"'-1, 2\"");
    }

    #[test]
    fn test_citing_csv() {
        let works = vec![CitingWork {
            title: Some("Trial, phase 3".into()),
            year: Some(2021),
            doi: Some("https://doi.org/10.1/x".into()),
            pmid: Some("123".into()),
            is_trial: true,
        }];
        let csv = format_citing_csv(&works);
        assert_eq!(
            csv,
            "title,year,doi,pmid,is_trial\n\"Trial, phase 3\",2021,https://doi.org/10.1/x,123,true\n"
        );
    }

    #[test]
    fn test_network_csv_labels() {
        let mut network = CoauthorNetwork { root: "A1".into(), ..Default::default() };
        network.labels.insert("A1".into(), "Root".into());
        network.edges.push(CoauthorEdge::new("A1", "I9", EdgeKind::WorksAt));
        let csv = format_network_csv(&network);
        assert!(csv.ends_with("A1,Root,I9,I9,works_at\n"));
    }
}
