#![no_main]

use libfuzzer_sys::fuzz_target;
use research_metrics::models::{ESearchResponse, GroupByPage};

fuzz_target!(|data: &[u8]| {
    // Should never panic, only return Ok or Err
    let _ = serde_json::from_slice::<ESearchResponse>(data);
    let _ = serde_json::from_slice::<GroupByPage>(data);
});
