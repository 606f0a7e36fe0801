//! OpenAlex autocomplete schema.

use serde::{Deserialize, Serialize};

/// Entity type accepted by `/autocomplete/{entity}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutocompleteEntity {
    /// Authors.
    Authors,
    /// Institutions.
    Institutions,
}

impl AutocompleteEntity {
    /// Path segment for the endpoint.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Authors => "authors",
            Self::Institutions => "institutions",
        }
    }
}

/// A candidate record from autocomplete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutocompleteMatch {
    /// OpenAlex id (URL form).
    pub id: String,

    /// Display name.
    pub display_name: String,

    /// Disambiguation hint (most cited work, location, ...).
    #[serde(default)]
    pub hint: Option<String>,

    /// Citation count.
    #[serde(default)]
    pub cited_by_count: Option<u64>,

    /// Work count.
    #[serde(default)]
    pub works_count: Option<u64>,

    /// Entity type (`author`, `institution`).
    #[serde(default)]
    pub entity_type: Option<String>,

    /// External id (ORCID, ROR).
    #[serde(default)]
    pub external_id: Option<String>,

    /// Filter key usable in `/works` filters.
    #[serde(default)]
    pub filter_key: Option<String>,
}

/// `/autocomplete/{entity}` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutocompleteResponse {
    /// Candidates, best match first.
    pub results: Vec<AutocompleteMatch>,
}
