#![no_main]

use libfuzzer_sys::fuzz_target;
use research_metrics::models::WorksPage;
use research_metrics::network;

fuzz_target!(|data: &[u8]| {
    // Any page that parses must also build a network without panicking
    if let Ok(page) = serde_json::from_slice::<WorksPage>(data) {
        let ids: Vec<String> = page.results.iter().take(2).flat_map(|w| w.author_ids()).map(str::to_string).collect();
        let net = network::build_coauthor_network(&page.results, &ids, "Root");
        let _ = network::extract_affiliations(&net);
        let _ = network::nodes(&net);
        let _ = page.next_cursor();
    }
});
