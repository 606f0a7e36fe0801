//! Identifier normalization.
//!
//! OpenAlex returns identifiers as URLs (`https://openalex.org/W123`,
//! `https://pubmed.ncbi.nlm.nih.gov/456`, `https://doi.org/10.1/x`). Lookups
//! across APIs use the bare form.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// OpenAlex entity URL prefix.
pub const OPENALEX_PREFIX: &str = "https://openalex.org/";

/// PubMed article URL prefix.
pub const PUBMED_PREFIX: &str = "https://pubmed.ncbi.nlm.nih.gov/";

/// DOI resolver URL prefix.
pub const DOI_PREFIX: &str = "https://doi.org/";

/// ORCID URL prefix.
pub const ORCID_PREFIX: &str = "https://orcid.org/";

const KNOWN_PREFIXES: &[&str] = &[
    OPENALEX_PREFIX,
    PUBMED_PREFIX,
    DOI_PREFIX,
    ORCID_PREFIX,
    "http://openalex.org/",
    "http://pubmed.ncbi.nlm.nih.gov/",
    "http://dx.doi.org/",
    "https://dx.doi.org/",
    "http://doi.org/",
];

static DOI_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^10\.\d{4,9}/\S+$").expect("valid DOI regex"));

/// Strip any known URL prefix, returning the bare identifier.
///
/// Unknown inputs are returned trimmed but otherwise unchanged.
#[must_use]
pub fn strip_known_prefix(id: &str) -> &str {
    let id = id.trim();
    KNOWN_PREFIXES
        .iter()
        .find_map(|prefix| id.strip_prefix(prefix))
        .map(|rest| rest.trim_end_matches('/'))
        .unwrap_or(id)
}

/// Bare PubMed identifier.
#[must_use]
pub fn normalize_pmid(pmid: &str) -> String {
    strip_known_prefix(pmid).to_string()
}

/// Bare OpenAlex identifier (`W...`, `A...`, `I...`).
#[must_use]
pub fn normalize_openalex_id(id: &str) -> String {
    strip_known_prefix(id).to_string()
}

/// Bare, lowercased DOI. Also strips a leading `doi:` scheme.
#[must_use]
pub fn normalize_doi(doi: &str) -> String {
    let bare = strip_known_prefix(doi);
    let bare = bare
        .strip_prefix("doi:")
        .or_else(|| bare.strip_prefix("DOI:"))
        .unwrap_or(bare)
        .trim();
    bare.to_lowercase()
}

/// Check whether a normalized DOI has the `10.<registrant>/<suffix>` shape.
#[must_use]
pub fn is_valid_doi(doi: &str) -> bool {
    DOI_PATTERN.is_match(doi)
}

/// Kind of OpenAlex entity, taken from the id's leading letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// `W...`
    Work,
    /// `A...`
    Author,
    /// `I...`
    Institution,
    /// Anything else.
    Other,
}

/// Classify an OpenAlex id (bare or URL form).
#[must_use]
pub fn entity_kind(id: &str) -> EntityKind {
    match strip_known_prefix(id).chars().next() {
        Some('W' | 'w') => EntityKind::Work,
        Some('A' | 'a') => EntityKind::Author,
        Some('I' | 'i') => EntityKind::Institution,
        _ => EntityKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pubmed_url_normalizes() {
        assert_eq!(normalize_pmid("https://pubmed.ncbi.nlm.nih.gov/12345"), "12345");
        assert_eq!(normalize_pmid("https://pubmed.ncbi.nlm.nih.gov/12345/"), "12345");
        assert_eq!(normalize_pmid("12345"), "12345");
    }

    #[test]
    fn test_openalex_url_normalizes() {
        assert_eq!(normalize_openalex_id("https://openalex.org/W2741809807"), "W2741809807");
        assert_eq!(normalize_openalex_id(" I69737025 "), "I69737025");
    }

    #[test]
    fn test_doi_normalizes() {
        assert_eq!(normalize_doi("https://doi.org/10.1136/ANNRHEUMDIS-2019-216655"), "10.1136/annrheumdis-2019-216655");
        assert_eq!(normalize_doi("doi:10.3389/fnsys.2013.00031"), "10.3389/fnsys.2013.00031");
        assert!(is_valid_doi(&normalize_doi("10.3389/fnsys.2013.00031")));
        assert!(!is_valid_doi("fnsys.2013"));
        assert!(!is_valid_doi(""));
    }

    #[test]
    fn test_entity_kind() {
        assert_eq!(entity_kind("https://openalex.org/I865915315"), EntityKind::Institution);
        assert_eq!(entity_kind("A5028049278"), EntityKind::Author);
        assert_eq!(entity_kind("W1"), EntityKind::Work);
        assert_eq!(entity_kind("12345"), EntityKind::Other);
    }
}
