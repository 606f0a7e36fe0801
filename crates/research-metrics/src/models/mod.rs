//! Data models for OpenAlex and PubMed payloads and pipeline records.
//!
//! Upstream schemas use `#[serde(default)]` for optional fields and keep the
//! APIs' snake_case naming; required fields fail deserialization when absent.

mod autocomplete;
mod enums;
mod esearch;
mod inputs;
mod records;
mod work;

pub use autocomplete::{AutocompleteEntity, AutocompleteMatch, AutocompleteResponse};
pub use enums::OutputFormat;
pub use esearch::{ESearchForm, ESearchResponse, ESearchResult};
pub use inputs::*;
pub use records::{
    CitationReport, CitingWork, CoauthorEdge, CoauthorNetwork, EdgeKind, GlobalSouthSeries,
    YearCount, YearlyRatio,
};
pub use work::{
    Authorship, DehydratedAuthor, DehydratedInstitution, GroupByBucket, GroupByPage, ListMeta,
    Work, WorkIds, WorksPage,
};
