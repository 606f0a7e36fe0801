//! Markdown output formatting.

use std::fmt::Write;

use super::format_percentage;
use crate::models::{AutocompleteMatch, EdgeKind, GlobalSouthSeries, YearlyRatio};
use crate::pipeline::{CitationView, CoauthorView};
use crate::session::Snapshot;

/// Format any snapshot as Markdown.
#[must_use]
pub fn format_snapshot_markdown(snapshot: &Snapshot) -> String {
    match snapshot {
        Snapshot::Citations(view) => format_citations_markdown(view),
        Snapshot::GlobalSouth(series) => format_global_south_markdown(series),
        Snapshot::Coauthors(view) => format_coauthors_markdown(view),
    }
}

/// Format the clinical-trial citation view.
#[must_use]
pub fn format_citations_markdown(view: &CitationView) -> String {
    let report = &view.report;
    let mut output = format!("# Citations of {}\n\n", report.doi);

    let _ = writeln!(
        output,
        "**OpenAlex**: {} | **Citing works**: {} | **Clinical trials**: {}\n",
        report.work_id,
        report.works.len(),
        report.trial_count()
    );

    if report.works.is_empty() {
        output.push_str("No citing works found.\n");
        return output;
    }

    if let Some((from, to)) = view.year_range {
        let _ = writeln!(output, "**Years**: {from}-{to}\n");
    }

    output.push_str("## Citations per year\n\n");
    output.push_str("| Year | Trials | Other | Trial share |\n|---|---|---|---|\n");
    for ratio in &view.trial_share {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} |",
            ratio.year,
            ratio.numerator,
            ratio.denominator - ratio.numerator,
            format_percentage(ratio.percentage)
        );
    }

    let _ = write!(output, "\n## Citing works ({} shown)\n\n", view.rows.len());
    if view.rows.is_empty() {
        output.push_str("No works match the current filters.\n");
        return output;
    }

    output.push_str("| Title | Year | DOI | PMID | Trial |\n|---|---|---|---|---|\n");
    for work in &view.rows {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} |",
            escape_cell(work.title.as_deref().unwrap_or("Untitled")),
            work.year.map_or_else(String::new, |y| y.to_string()),
            work.doi.as_deref().unwrap_or(""),
            work.pmid.as_deref().unwrap_or(""),
            if work.is_trial { "yes" } else { "" }
        );
    }

    output
}

fn ratio_rows(output: &mut String, ratios: &[YearlyRatio]) {
    output.push_str("| Year | Global South | All | Share |\n|---|---|---|---|\n");
    for ratio in ratios {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} |",
            ratio.year,
            ratio.numerator,
            ratio.denominator,
            format_percentage(ratio.percentage)
        );
    }
}

/// Format the Global-South series.
#[must_use]
pub fn format_global_south_markdown(series: &GlobalSouthSeries) -> String {
    let mut output = String::from("# Global South collaboration\n\n");

    if let (Some(first), Some(last)) = (series.years.first(), series.years.last()) {
        let _ = writeln!(output, "**Years**: {first}-{last}\n");
    }

    output.push_str("## All works\n\n");
    ratio_rows(&mut output, &series.global);

    if let Some(local) = &series.local {
        let _ = write!(output, "\n## Selected institutions ({})\n\n", series.institution_ids.join(", "));
        ratio_rows(&mut output, local);
    }

    output
}

/// Format the co-author network as edge lists.
#[must_use]
pub fn format_coauthors_markdown(view: &CoauthorView) -> String {
    let network = &view.network;
    let mut output = format!("# Co-author network of {}\n\n", view.author_name);

    let _ = writeln!(
        output,
        "**Authors**: {} | **Works**: {} | **Nodes**: {} | **Edges**: {}\n",
        view.author_ids.join(", "),
        view.works_count,
        view.nodes.len(),
        network.edges.len()
    );

    if network.is_empty() {
        output.push_str("No connections found.\n");
        return output;
    }

    for kind in [EdgeKind::WorksWith, EdgeKind::WorksAt, EdgeKind::RelatedTo] {
        let edges: Vec<_> = network.edges_of(kind).collect();
        if edges.is_empty() {
            continue;
        }
        let _ = write!(output, "## {kind} ({})\n\n", edges.len());
        for edge in edges {
            let _ = writeln!(
                output,
                "- {} -> {} ({})",
                network.label(&edge.source),
                network.label(&edge.target),
                edge.target
            );
        }
        output.push('\n');
    }

    output
}

/// Format autocomplete candidates as a table.
#[must_use]
pub fn format_suggestions_markdown(matches: &[AutocompleteMatch]) -> String {
    if matches.is_empty() {
        return "No matches found.".to_string();
    }

    let mut output = format!("# Matches ({} results)\n\n", matches.len());
    output.push_str("| Name | Hint | Works | Citations | ID |\n|---|---|---|---|---|\n");
    for m in matches {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} |",
            escape_cell(&m.display_name),
            escape_cell(m.hint.as_deref().unwrap_or("")),
            m.works_count.map_or_else(String::new, |c| c.to_string()),
            m.cited_by_count.map_or_else(String::new, |c| c.to_string()),
            m.id
        );
    }
    output
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}
