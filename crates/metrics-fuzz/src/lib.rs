//! Fuzzing library for research-metrics.
//!
//! Targets feed arbitrary bytes to the OpenAlex and E-utilities payload
//! parsers and to dashboard input validation.
//!
//! # Usage
//!
//! ```bash
//! cd crates/metrics-fuzz
//! cargo +nightly fuzz run fuzz_works_page -- -max_total_time=60
//! ```

pub use research_metrics::{identifiers, models, network};
