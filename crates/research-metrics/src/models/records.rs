//! Normalized records produced by the pipeline and handed to the presenter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A work citing the queried publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitingWork {
    /// Title.
    pub title: Option<String>,
    /// Publication year.
    pub year: Option<i32>,
    /// DOI URL.
    pub doi: Option<String>,
    /// Bare PubMed id.
    pub pmid: Option<String>,
    /// Whether the PMID is in the clinical-trial result set.
    pub is_trial: bool,
}

/// Result of the citation dashboard query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationReport {
    /// Normalized DOI that was queried.
    pub doi: String,
    /// Bare OpenAlex id the DOI resolved to.
    pub work_id: String,
    /// Citing works with trial flags.
    pub works: Vec<CitingWork>,
}

impl CitationReport {
    /// Number of citing works flagged as trials.
    #[must_use]
    pub fn trial_count(&self) -> usize {
        self.works.iter().filter(|w| w.is_trial).count()
    }
}

/// Count of works in one (year, category) group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearCount {
    /// Year.
    pub year: i32,
    /// Category flag (clinical trial, Global South).
    pub flagged: bool,
    /// Works in the group.
    pub count: u64,
}

/// Per-year numerator/denominator with the derived percentage.
///
/// `percentage` is `None` whenever `denominator` is zero and otherwise lies in
/// `[0, 100]`, rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlyRatio {
    /// Year.
    pub year: i32,
    /// Flagged works.
    pub numerator: u64,
    /// All works considered.
    pub denominator: u64,
    /// `numerator / denominator * 100`.
    pub percentage: Option<f64>,
}

/// Global-South collaboration series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSouthSeries {
    /// Years in the lookback window, ascending.
    pub years: Vec<i32>,
    /// Institutions the local series is restricted to (bare ids).
    pub institution_ids: Vec<String>,
    /// Share of all works with a Global-South author.
    pub global: Vec<YearlyRatio>,
    /// Same share for the selected institutions.
    pub local: Option<Vec<YearlyRatio>>,
}

/// Relation between two network nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Author co-authored with author.
    WorksWith,
    /// Author affiliated with institution.
    WorksAt,
    /// Primary author linked to a co-author's institution.
    RelatedTo,
}

impl EdgeKind {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WorksWith => "works_with",
            Self::WorksAt => "works_at",
            Self::RelatedTo => "related_to",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An undirected edge in the co-author network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoauthorEdge {
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Relation.
    pub kind: EdgeKind,
}

impl CoauthorEdge {
    /// Create an edge.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        Self { source: source.into(), target: target.into(), kind }
    }
}

/// Co-author network: deduplicated edges plus node labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoauthorNetwork {
    /// Primary author node id.
    pub root: String,
    /// Edges in first-seen order.
    pub edges: Vec<CoauthorEdge>,
    /// Node id to display name.
    pub labels: BTreeMap<String, String>,
}

impl CoauthorNetwork {
    /// Edges of one kind.
    pub fn edges_of(&self, kind: EdgeKind) -> impl Iterator<Item = &CoauthorEdge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    /// Label for a node, falling back to its id.
    #[must_use]
    pub fn label<'a>(&'a self, id: &'a str) -> &'a str {
        self.labels.get(id).map(String::as_str).unwrap_or(id)
    }

    /// Check if the network has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
