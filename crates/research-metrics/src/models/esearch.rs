//! PubMed E-utilities `esearch` schema (`retmode=json`).

use serde::{Deserialize, Serialize};

/// Top-level esearch envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ESearchResponse {
    /// The result block.
    pub esearchresult: ESearchResult,
}

/// esearch result block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ESearchResult {
    /// Total hits (a decimal string upstream).
    #[serde(default)]
    pub count: Option<String>,

    /// Hits returned in this response.
    #[serde(default)]
    pub retmax: Option<String>,

    /// Matching PMIDs.
    #[serde(default)]
    pub idlist: Vec<String>,

    /// Upstream error, set instead of results on a bad term.
    #[serde(default, rename = "ERROR")]
    pub error: Option<String>,
}

/// Form body posted to esearch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ESearchForm<'a> {
    /// Query term.
    pub term: &'a str,
    /// Database.
    pub db: &'a str,
    /// Maximum ids returned.
    pub retmax: u32,
    /// Response mode.
    pub retmode: &'a str,
    /// NCBI API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<&'a str>,
}
