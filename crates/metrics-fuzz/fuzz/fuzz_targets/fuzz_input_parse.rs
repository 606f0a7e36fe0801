#![no_main]

use libfuzzer_sys::fuzz_target;
use research_metrics::identifiers;
use research_metrics::models::{CitationsInput, CoauthorNetworkInput, GlobalSouthInput};

fuzz_target!(|data: &[u8]| {
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Ok(input) = serde_json::from_value::<CitationsInput>(json.clone()) {
            let _ = input.normalized_doi();
        }
        if let Ok(input) = serde_json::from_value::<GlobalSouthInput>(json.clone()) {
            let _ = input.normalized_ids();
        }
        if let Ok(input) = serde_json::from_value::<CoauthorNetworkInput>(json) {
            let _ = input.normalized_ids();
        }
    }
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = identifiers::is_valid_doi(&identifiers::normalize_doi(s));
        let _ = identifiers::entity_kind(&identifiers::normalize_openalex_id(s));
    }
});
