//! Dashboard pipelines.
//!
//! Each dashboard:
//! 1. Parses and validates its input
//! 2. Fetches from OpenAlex / PubMed through the shared client
//! 3. Aggregates into an immutable [`Snapshot`] for the presenter

mod citations;
mod coauthors;
mod global_south;
mod suggest;

pub use citations::*;
pub use coauthors::*;
pub use global_south::*;
pub use suggest::*;

use std::sync::Arc;

use crate::client::ScholarlyClient;
use crate::config::{Config, api};
use crate::error::PipelineResult;
use crate::session::Snapshot;

/// Shared state for pipeline execution.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    /// API client.
    pub client: Arc<ScholarlyClient>,

    /// Years looked back in ratio series.
    pub lookback_years: i32,
}

impl PipelineContext {
    /// Create a context with the default lookback window.
    #[must_use]
    pub fn new(client: Arc<ScholarlyClient>) -> Self {
        Self { client, lookback_years: api::LOOKBACK_YEARS }
    }

    /// Build client and context from a configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let lookback_years = config.lookback_years;
        let client = ScholarlyClient::new(config)?;
        Ok(Self { client: Arc::new(client), lookback_years })
    }
}

/// A dashboard query producing a session snapshot.
#[async_trait::async_trait]
pub trait Dashboard: Send + Sync {
    /// Dashboard name (e.g., "clinical_trials").
    fn name(&self) -> &'static str;

    /// Title shown above the dashboard.
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> serde_json::Value;

    /// Run the query. `previous` is the session's current snapshot, if any.
    async fn execute(
        &self,
        ctx: &PipelineContext,
        input: serde_json::Value,
        previous: Option<Arc<Snapshot>>,
    ) -> PipelineResult<Snapshot>;
}

/// Register all dashboards.
#[must_use]
pub fn register_all_dashboards() -> Vec<Box<dyn Dashboard>> {
    vec![
        Box::new(citations::ClinicalTrialsDashboard),
        Box::new(global_south::GlobalSouthDashboard),
        Box::new(coauthors::CoauthorNetworkDashboard),
    ]
}

/// Find a dashboard by name.
#[must_use]
pub fn find_dashboard<'a>(dashboards: &'a [Box<dyn Dashboard>], name: &str) -> Option<&'a dyn Dashboard> {
    dashboards.iter().find(|d| d.name() == name).map(|d| d.as_ref())
}
