//! Co-author network dashboard.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use super::{Dashboard, PipelineContext};
use crate::config::{api, fields};
use crate::error::PipelineResult;
use crate::models::{CoauthorNetwork, CoauthorNetworkInput, Work};
use crate::network::{self, NetworkNode};
use crate::session::Snapshot;

/// All works by any of the given (bare) author ids, authorships only.
///
/// # Errors
///
/// Propagates client errors.
pub async fn fetch_works(ctx: &PipelineContext, author_ids: &[String]) -> PipelineResult<Vec<Work>> {
    let filter = format!("author.id:{}", author_ids.join("|"));
    let works = ctx
        .client
        .fetch_all_works(&filter, api::AUTHOR_WORKS_PER_PAGE, fields::AUTHORSHIPS)
        .await?;
    tracing::info!(authors = author_ids.len(), works = works.len(), "Fetched author works");
    Ok(works)
}

/// Network view held in the session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoauthorView {
    /// Selected author ids (bare).
    pub author_ids: Vec<String>,
    /// Root author name.
    pub author_name: String,
    /// Whether the network was reduced to affiliations.
    pub affiliations_only: bool,
    /// Number of works the network was built from.
    pub works_count: usize,
    /// Edges and labels.
    pub network: CoauthorNetwork,
    /// Nodes with kinds.
    pub nodes: Vec<NetworkNode>,
    /// Works kept for reuse when the same authors are selected again.
    #[serde(skip)]
    pub works: Arc<Vec<Work>>,
}

impl CoauthorView {
    /// Check whether this view was built for the same author selection.
    #[must_use]
    pub fn same_selection(&self, author_ids: &[String]) -> bool {
        let current: HashSet<&str> = self.author_ids.iter().map(String::as_str).collect();
        let requested: HashSet<&str> = author_ids.iter().map(String::as_str).collect();
        current == requested
    }
}

/// Build the view from works.
#[must_use]
pub fn coauthor_view(
    works: Arc<Vec<Work>>,
    author_ids: Vec<String>,
    author_name: &str,
    affiliations_only: bool,
) -> CoauthorView {
    let mut graph = network::build_coauthor_network(&works, &author_ids, author_name);
    if affiliations_only {
        graph = network::extract_affiliations(&graph);
    }
    let nodes = network::nodes(&graph);

    CoauthorView {
        author_ids,
        author_name: author_name.to_string(),
        affiliations_only,
        works_count: works.len(),
        network: graph,
        nodes,
        works,
    }
}

/// "What is my coauthor network?"
pub struct CoauthorNetworkDashboard;

#[async_trait::async_trait]
impl Dashboard for CoauthorNetworkDashboard {
    fn name(&self) -> &'static str {
        "coauthor_network"
    }

    fn description(&self) -> &'static str {
        "What is my coauthor network?"
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "authorIds": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "OpenAlex author ids; the first is the network root"
                },
                "authorName": {
                    "type": "string",
                    "description": "Display name of the root author"
                },
                "affiliationsOnly": {
                    "type": "boolean",
                    "default": false
                }
            },
            "required": ["authorIds", "authorName"]
        })
    }

    async fn execute(
        &self,
        ctx: &PipelineContext,
        input: serde_json::Value,
        previous: Option<Arc<Snapshot>>,
    ) -> PipelineResult<Snapshot> {
        let params: CoauthorNetworkInput = serde_json::from_value(input)?;
        let author_ids = params.normalized_ids()?;

        // A reused selection keeps its stored order so the root stays put.
        let (works, author_ids) = match previous.as_deref() {
            Some(Snapshot::Coauthors(view)) if view.same_selection(&author_ids) => {
                tracing::debug!("Reusing works from session snapshot");
                (Arc::clone(&view.works), view.author_ids.clone())
            }
            _ => (Arc::new(fetch_works(ctx, &author_ids).await?), author_ids),
        };

        Ok(Snapshot::Coauthors(coauthor_view(
            works,
            author_ids,
            &params.author_name,
            params.affiliations_only,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_selection_ignores_order() {
        let view = coauthor_view(Arc::new(Vec::new()), vec!["A1".into(), "A2".into()], "Root", false);
        assert!(view.same_selection(&["A2".to_string(), "A1".to_string()]));
        assert!(!view.same_selection(&["A1".to_string()]));
    }

    #[test]
    fn test_empty_works_empty_network() {
        let view = coauthor_view(Arc::new(Vec::new()), vec!["A1".into()], "Root", true);
        assert!(view.network.is_empty());
        assert_eq!(view.works_count, 0);
        // Root node is still listed.
        assert_eq!(view.nodes.len(), 1);
    }
}
