//! Clinical-trial citation dashboard: who cites a DOI, and which citing works
//! are clinical trials according to PubMed.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{Dashboard, PipelineContext};
use crate::aggregate;
use crate::config::{api, fields};
use crate::error::{PipelineError, PipelineResult};
use crate::models::{CitationReport, CitationsInput, CitingWork, YearCount, YearlyRatio};
use crate::session::Snapshot;

/// PubMed filter selecting clinical-trial publication types.
pub const CLINICAL_TRIAL_FILTER: &str = "clinicaltrial[Filter]";

/// Resolve a DOI and collect every work citing it.
///
/// Trial flags are left unset; see [`get_data`].
///
/// # Errors
///
/// `NotFound` if the DOI does not resolve; client errors otherwise.
pub async fn get_citing(ctx: &PipelineContext, doi: &str) -> PipelineResult<CitationReport> {
    let work = ctx
        .client
        .find_work_by_doi(doi, fields::LOOKUP)
        .await?
        .ok_or_else(|| PipelineError::not_found(format!("work with DOI {doi}")))?;
    let work_id = work.bare_id();

    let filter = format!("cites:{work_id}");
    let works = ctx.client.fetch_all_works(&filter, api::WORKS_PER_PAGE, fields::CITING).await?;

    let works = works
        .iter()
        .map(|w| CitingWork {
            title: w.title.clone(),
            year: w.publication_year,
            doi: w.doi.clone(),
            pmid: w.pmid(),
            is_trial: false,
        })
        .collect();

    Ok(CitationReport { doi: doi.to_string(), work_id, works })
}

/// esearch term matching any of `pmids` restricted to clinical trials.
#[must_use]
pub fn clinical_trial_term(pmids: &[String]) -> String {
    let ors = pmids.iter().map(|p| format!("{p}[pmid]")).collect::<Vec<_>>().join(" OR ");
    format!("({ors}) AND ({CLINICAL_TRIAL_FILTER})")
}

/// Subset of `pmids` that PubMed classifies as clinical trials.
///
/// PMIDs are sent in batches; an empty input makes no request.
///
/// # Errors
///
/// Returns the first esearch error.
pub async fn get_clinical_trials(ctx: &PipelineContext, pmids: &[String]) -> PipelineResult<HashSet<String>> {
    let mut trials = HashSet::new();

    for batch in pmids.chunks(api::ESEARCH_BATCH) {
        let term = clinical_trial_term(batch);
        let result = ctx.client.esearch_pubmed(&term, api::ESEARCH_RETMAX).await?;
        tracing::debug!(batch = batch.len(), trials = result.idlist.len(), "esearch batch done");
        trials.extend(result.idlist);
    }

    Ok(trials)
}

/// Citing works for a DOI with clinical-trial flags set.
///
/// # Errors
///
/// Propagates lookup, pagination and esearch failures; nothing partial is returned.
pub async fn get_data(ctx: &PipelineContext, doi: &str) -> PipelineResult<CitationReport> {
    let mut report = get_citing(ctx, doi).await?;

    let mut seen = HashSet::new();
    let pmids: Vec<String> = report
        .works
        .iter()
        .filter_map(|w| w.pmid.clone())
        .filter(|p| seen.insert(p.clone()))
        .collect();

    let trials = get_clinical_trials(ctx, &pmids).await?;
    for work in &mut report.works {
        work.is_trial = work.pmid.as_ref().is_some_and(|p| trials.contains(p));
    }

    tracing::info!(
        doi,
        citing = report.works.len(),
        with_pmid = pmids.len(),
        trials = report.trial_count(),
        "Citation data collected"
    );
    Ok(report)
}

/// Chart and table data for one citation query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationView {
    /// Full result set.
    pub report: CitationReport,
    /// Table rows after the trials-only / year filters.
    pub rows: Vec<CitingWork>,
    /// Citations per (year, is_trial), unfiltered.
    pub counts: Vec<YearCount>,
    /// Share of trials per year, contiguous between first and last year.
    pub trial_share: Vec<YearlyRatio>,
    /// Slider bounds.
    pub year_range: Option<(i32, i32)>,
}

impl CitationView {
    /// Aggregate a report and apply table filters.
    #[must_use]
    pub fn build(report: CitationReport, trials_only: bool, year_from: Option<i32>, year_to: Option<i32>) -> Self {
        let rows = aggregate::filter_citing(&report.works, trials_only, year_from, year_to);
        let counts = aggregate::count_by_year(&report.works);
        let trial_share = aggregate::trial_share_by_year(&report.works);
        let year_range = aggregate::year_range(&report.works);
        Self { report, rows, counts, trial_share, year_range }
    }
}

/// "Is my research used in clinical trials?"
pub struct ClinicalTrialsDashboard;

#[async_trait::async_trait]
impl Dashboard for ClinicalTrialsDashboard {
    fn name(&self) -> &'static str {
        "clinical_trials"
    }

    fn description(&self) -> &'static str {
        "Is my research used in clinical trials?"
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "doi": {
                    "type": "string",
                    "description": "DOI of the cited publication"
                },
                "trialsOnly": {
                    "type": "boolean",
                    "default": false
                },
                "yearFrom": {"type": "integer"},
                "yearTo": {"type": "integer"}
            },
            "required": ["doi"]
        })
    }

    async fn execute(
        &self,
        ctx: &PipelineContext,
        input: serde_json::Value,
        _previous: Option<Arc<Snapshot>>,
    ) -> PipelineResult<Snapshot> {
        let params: CitationsInput = serde_json::from_value(input)?;
        let doi = params.normalized_doi()?;

        let report = get_data(ctx, &doi).await?;
        Ok(Snapshot::Citations(CitationView::build(
            report,
            params.trials_only,
            params.year_from,
            params.year_to,
        )))
    }
}
