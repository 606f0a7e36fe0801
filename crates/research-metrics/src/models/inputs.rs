//! Input models for dashboard queries.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::identifiers;

/// Input for the clinical-trial citation dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationsInput {
    /// DOI of the cited publication (bare, `doi:` or URL form).
    pub doi: String,

    /// Keep only citing works flagged as clinical trials.
    #[serde(default)]
    pub trials_only: bool,

    /// Minimum publication year (inclusive).
    #[serde(default)]
    pub year_from: Option<i32>,

    /// Maximum publication year (inclusive).
    #[serde(default)]
    pub year_to: Option<i32>,
}

impl CitationsInput {
    /// Normalize and check the DOI.
    pub fn normalized_doi(&self) -> PipelineResult<String> {
        let doi = identifiers::normalize_doi(&self.doi);
        if doi.is_empty() {
            return Err(PipelineError::validation("doi", "cannot be empty"));
        }
        if !identifiers::is_valid_doi(&doi) {
            return Err(PipelineError::validation("doi", format!("'{doi}' is not a DOI")));
        }
        if let (Some(from), Some(to)) = (self.year_from, self.year_to) {
            if from > to {
                return Err(PipelineError::validation("yearFrom", "must not exceed yearTo"));
            }
        }
        Ok(doi)
    }
}

/// Input for autocomplete suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestInput {
    /// Partial name.
    #[serde(default, alias = "q")]
    pub query: String,
}

/// Input for the Global-South collaboration dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSouthInput {
    /// Institutions for the local series; empty means global only.
    #[serde(default)]
    pub institution_ids: Vec<String>,
}

impl GlobalSouthInput {
    /// Bare, deduplicated institution ids in input order.
    pub fn normalized_ids(&self) -> PipelineResult<Vec<String>> {
        let mut ids: Vec<String> = Vec::with_capacity(self.institution_ids.len());
        for raw in &self.institution_ids {
            let id = identifiers::normalize_openalex_id(raw);
            if identifiers::entity_kind(&id) != identifiers::EntityKind::Institution {
                return Err(PipelineError::validation(
                    "institutionIds",
                    format!("'{raw}' is not an OpenAlex institution id"),
                ));
            }
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

/// Input for the co-author network dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoauthorNetworkInput {
    /// Selected author ids; the first one is the network root.
    pub author_ids: Vec<String>,

    /// Display name of the root author.
    pub author_name: String,

    /// Show only primary and secondary affiliations.
    #[serde(default)]
    pub affiliations_only: bool,
}

impl CoauthorNetworkInput {
    /// Bare, deduplicated author ids, order preserved.
    pub fn normalized_ids(&self) -> PipelineResult<Vec<String>> {
        if self.author_ids.is_empty() {
            return Err(PipelineError::validation("authorIds", "select at least one author"));
        }
        let mut ids: Vec<String> = Vec::with_capacity(self.author_ids.len());
        for raw in &self.author_ids {
            let id = identifiers::normalize_openalex_id(raw);
            if identifiers::entity_kind(&id) != identifiers::EntityKind::Author {
                return Err(PipelineError::validation(
                    "authorIds",
                    format!("'{raw}' is not an OpenAlex author id"),
                ));
            }
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}
