//! OpenAlex work schema.
//!
//! Only `id` is required on a work; everything else the dashboards read is
//! optional upstream and defaults here. Page envelopes require both `results`
//! and `meta`, so a truncated or foreign payload fails with a typed parse error.

use serde::{Deserialize, Serialize};

use crate::identifiers;

/// A scholarly publication record from OpenAlex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Work {
    /// OpenAlex id (URL form as returned by the API).
    pub id: String,

    /// DOI URL.
    #[serde(default)]
    pub doi: Option<String>,

    /// Title.
    #[serde(default)]
    pub title: Option<String>,

    /// Publication year.
    #[serde(default)]
    pub publication_year: Option<i32>,

    /// External identifiers.
    #[serde(default)]
    pub ids: WorkIds,

    /// Author/institution pairs.
    #[serde(default)]
    pub authorships: Vec<Authorship>,
}

impl Work {
    /// Bare OpenAlex id (`W...`).
    #[must_use]
    pub fn bare_id(&self) -> String {
        identifiers::normalize_openalex_id(&self.id)
    }

    /// Bare PubMed id, if the work has one.
    #[must_use]
    pub fn pmid(&self) -> Option<String> {
        self.ids.pmid.as_deref().map(identifiers::normalize_pmid)
    }

    /// Author ids present on this work.
    pub fn author_ids(&self) -> impl Iterator<Item = &str> {
        self.authorships.iter().filter_map(|a| a.author.id.as_deref())
    }
}

/// External identifiers attached to a work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkIds {
    /// OpenAlex URL.
    #[serde(default)]
    pub openalex: Option<String>,

    /// DOI URL.
    #[serde(default)]
    pub doi: Option<String>,

    /// PubMed URL.
    #[serde(default)]
    pub pmid: Option<String>,

    /// PubMed Central URL.
    #[serde(default)]
    pub pmcid: Option<String>,
}

/// One author on a work with the institutions listed for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Authorship {
    /// Author position (`first`, `middle`, `last`).
    #[serde(default)]
    pub author_position: Option<String>,

    /// The author.
    #[serde(default)]
    pub author: DehydratedAuthor,

    /// Affiliations on this work.
    #[serde(default)]
    pub institutions: Vec<DehydratedInstitution>,
}

/// Minimal author record embedded in authorships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DehydratedAuthor {
    /// OpenAlex author id.
    #[serde(default)]
    pub id: Option<String>,

    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,

    /// ORCID URL.
    #[serde(default)]
    pub orcid: Option<String>,
}

/// Minimal institution record embedded in authorships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DehydratedInstitution {
    /// OpenAlex institution id.
    #[serde(default)]
    pub id: Option<String>,

    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,

    /// ROR URL.
    #[serde(default)]
    pub ror: Option<String>,

    /// ISO country code.
    #[serde(default)]
    pub country_code: Option<String>,

    /// Institution type (`education`, `healthcare`, ...).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Page metadata for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    /// Total matching records.
    #[serde(default)]
    pub count: Option<u64>,

    /// Cursor for the next page; `None` once exhausted.
    #[serde(default)]
    pub next_cursor: Option<String>,

    /// Page size used.
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// One page of `/works` results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorksPage {
    /// Paging metadata.
    pub meta: ListMeta,

    /// Works on this page.
    pub results: Vec<Work>,
}

impl WorksPage {
    /// Cursor for the following page, treating an empty string as exhausted.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        self.meta.next_cursor.as_deref().filter(|c| !c.is_empty())
    }
}

/// One bucket of a `group_by` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupByBucket {
    /// Group key (for `publication_year`, the year as a string).
    pub key: String,

    /// Display form of the key.
    #[serde(default)]
    pub key_display_name: Option<String>,

    /// Works in the group.
    pub count: u64,
}

/// `/works?group_by=...` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupByPage {
    /// Paging metadata.
    #[serde(default)]
    pub meta: ListMeta,

    /// Buckets (unordered).
    pub group_by: Vec<GroupByBucket>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_requires_id() {
        let err = serde_json::from_value::<Work>(serde_json::json!({"title": "x"}));
        assert!(err.is_err());
    }

    #[test]
    fn test_work_pmid_is_bare() {
        let work: Work = serde_json::from_value(serde_json::json!({
            "id": "https://openalex.org/W1",
            "ids": {"pmid": "https://pubmed.ncbi.nlm.nih.gov/12345"}
        }))
        .unwrap();
        assert_eq!(work.pmid().as_deref(), Some("12345"));
        assert_eq!(work.bare_id(), "W1");
    }

    #[test]
    fn test_page_requires_meta_and_results() {
        assert!(serde_json::from_value::<WorksPage>(serde_json::json!({"results": []})).is_err());
        assert!(serde_json::from_value::<WorksPage>(serde_json::json!({"meta": {}})).is_err());
    }

    #[test]
    fn test_empty_cursor_means_exhausted() {
        let page: WorksPage =
            serde_json::from_value(serde_json::json!({"meta": {"next_cursor": ""}, "results": []}))
                .unwrap();
        assert_eq!(page.next_cursor(), None);
    }
}
