//! JSON output formatting.

use serde_json::{Value, json};

use crate::error::PipelineResult;
use crate::models::AutocompleteMatch;
use crate::session::Snapshot;

/// Pretty-printed snapshot JSON, tagged with its dashboard.
///
/// # Errors
///
/// Returns a serialization error.
pub fn format_snapshot_json(snapshot: &Snapshot) -> PipelineResult<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Compact candidate representation: id, name and whatever extras are present.
#[must_use]
pub fn compact_suggestion(candidate: &AutocompleteMatch) -> Value {
    let mut obj = json!({
        "id": candidate.id,
        "name": candidate.display_name,
    });

    if let Some(hint) = &candidate.hint {
        obj["hint"] = json!(hint);
    }
    if let Some(works) = candidate.works_count {
        obj["works"] = json!(works);
    }
    if let Some(citations) = candidate.cited_by_count {
        obj["citations"] = json!(citations);
    }
    if let Some(external) = &candidate.external_id {
        obj["externalId"] = json!(external);
    }

    obj
}

/// Compact candidate list.
#[must_use]
pub fn compact_suggestions(candidates: &[AutocompleteMatch]) -> Value {
    Value::Array(candidates.iter().map(compact_suggestion).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_suggestion_skips_missing() {
        let candidate = AutocompleteMatch {
            id: "https://openalex.org/I1".into(),
            display_name: "Vrije Universiteit Amsterdam".into(),
            hint: Some("Amsterdam, Netherlands".into()),
            cited_by_count: None,
            works_count: Some(10),
            entity_type: None,
            external_id: None,
            filter_key: None,
        };
        let value = compact_suggestion(&candidate);
        assert_eq!(value["name"], "Vrije Universiteit Amsterdam");
        assert_eq!(value["works"], 10);
        assert!(value.get("citations").is_none());
        assert!(value.get("externalId").is_none());
    }
}
