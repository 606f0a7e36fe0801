//! Co-author network construction.
//!
//! Node ids are bare OpenAlex ids. The graph is rebuilt from scratch for every
//! query; edges are unique by `(source, target, kind)` and kept in first-seen order.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::identifiers::{self, EntityKind};
use crate::models::{CoauthorEdge, CoauthorNetwork, EdgeKind, Work};

/// Insertion-ordered edge set.
#[derive(Debug, Default)]
struct EdgeSet {
    edges: Vec<CoauthorEdge>,
    seen: HashSet<CoauthorEdge>,
}

impl EdgeSet {
    fn push(&mut self, edge: CoauthorEdge) {
        if self.seen.insert(edge.clone()) {
            self.edges.push(edge);
        }
    }

    fn into_edges(self) -> Vec<CoauthorEdge> {
        self.edges
    }
}

fn non_blank(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.trim().is_empty())
}

/// Build the co-author network around the first of `author_ids`.
///
/// Every id in `author_ids` is treated as the same person (merged author
/// profiles). For each authorship on each work:
/// - another author with a display name gets a `works_with` edge from the root;
/// - the author's institutions (id and name both present) get `works_at` edges,
///   attached to the root when the authorship belongs to one of `author_ids`.
///
/// Co-authors without a display name are left out entirely.
#[must_use]
pub fn build_coauthor_network(works: &[Work], author_ids: &[String], author_name: &str) -> CoauthorNetwork {
    let primary: HashSet<String> =
        author_ids.iter().map(|id| identifiers::normalize_openalex_id(id)).collect();
    let Some(root) = author_ids.first().map(|id| identifiers::normalize_openalex_id(id)) else {
        return CoauthorNetwork::default();
    };

    let mut edges = EdgeSet::default();
    let mut labels = BTreeMap::new();
    labels.insert(root.clone(), author_name.to_string());

    for work in works {
        for authorship in &work.authorships {
            let Some(raw_id) = authorship.author.id.as_deref() else {
                continue;
            };
            let author_id = identifiers::normalize_openalex_id(raw_id);

            let (node, name) = if primary.contains(&author_id) {
                (root.clone(), non_blank(Some(author_name)))
            } else {
                let name = non_blank(authorship.author.display_name.as_deref());
                if let Some(name) = name {
                    edges.push(CoauthorEdge::new(&root, &author_id, EdgeKind::WorksWith));
                    labels.entry(author_id.clone()).or_insert_with(|| name.to_string());
                }
                (author_id, name)
            };

            if name.is_none() {
                continue;
            }

            for institution in &authorship.institutions {
                let (Some(raw_iid), Some(iname)) =
                    (institution.id.as_deref(), non_blank(institution.display_name.as_deref()))
                else {
                    continue;
                };
                let iid = identifiers::normalize_openalex_id(raw_iid);
                edges.push(CoauthorEdge::new(&node, &iid, EdgeKind::WorksAt));
                labels.entry(iid).or_insert_with(|| iname.to_string());
            }
        }
    }

    CoauthorNetwork { root, edges: edges.into_edges(), labels }
}

/// Reduce a network to the root's affiliations.
///
/// Primary affiliations are the root's own `works_at` edges. Co-author
/// affiliations become `related_to` edges from the root, except for
/// institutions already present as primary affiliations.
#[must_use]
pub fn extract_affiliations(network: &CoauthorNetwork) -> CoauthorNetwork {
    let root = network.root.as_str();

    let primary_targets: HashSet<&str> = network
        .edges_of(EdgeKind::WorksAt)
        .filter(|e| e.source == root)
        .map(|e| e.target.as_str())
        .collect();

    let mut edges = EdgeSet::default();
    for edge in network.edges_of(EdgeKind::WorksAt).filter(|e| e.source == root) {
        edges.push(edge.clone());
    }
    for edge in network.edges_of(EdgeKind::WorksAt).filter(|e| e.source != root) {
        if !primary_targets.contains(edge.target.as_str()) {
            edges.push(CoauthorEdge::new(root, &edge.target, EdgeKind::RelatedTo));
        }
    }
    let edges = edges.into_edges();

    let labels = network
        .labels
        .iter()
        .filter(|(id, _)| id.as_str() == root || edges.iter().any(|e| &e.target == *id))
        .map(|(id, label)| (id.clone(), label.clone()))
        .collect();

    CoauthorNetwork { root: network.root.clone(), edges, labels }
}

/// A node with its label and entity kind, for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkNode {
    /// Bare OpenAlex id.
    pub id: String,
    /// Display name (falls back to the id).
    pub label: String,
    /// Author or institution.
    pub kind: EntityKind,
}

/// All nodes touched by the network, root first, then in edge order.
#[must_use]
pub fn nodes(network: &CoauthorNetwork) -> Vec<NetworkNode> {
    if network.root.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut nodes = Vec::new();
    let ids = std::iter::once(network.root.as_str())
        .chain(network.edges.iter().flat_map(|e| [e.source.as_str(), e.target.as_str()]));

    for id in ids {
        if seen.insert(id) {
            nodes.push(NetworkNode {
                id: id.to_string(),
                label: network.label(id).to_string(),
                kind: identifiers::entity_kind(id),
            });
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Authorship, DehydratedAuthor, DehydratedInstitution};

    fn authorship(id: &str, name: Option<&str>, institutions: &[(&str, &str)]) -> Authorship {
        Authorship {
            author_position: None,
            author: DehydratedAuthor {
                id: Some(format!("https://openalex.org/{id}")),
                display_name: name.map(str::to_string),
                orcid: None,
            },
            institutions: institutions
                .iter()
                .map(|(iid, iname)| DehydratedInstitution {
                    id: Some(format!("https://openalex.org/{iid}")),
                    display_name: Some((*iname).to_string()),
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn work(authorships: Vec<Authorship>) -> Work {
        Work { id: "https://openalex.org/W1".into(), authorships, ..Default::default() }
    }

    #[test]
    fn test_builds_works_with_and_works_at() {
        let works = vec![work(vec![
            authorship("A1", Some("Root"), &[("I1", "Home U")]),
            authorship("A2", Some("Colleague"), &[("I2", "Other U")]),
        ])];
        let net = build_coauthor_network(&works, &["A1".to_string()], "Root Author");

        assert_eq!(net.root, "A1");
        assert_eq!(
            net.edges,
            vec![
                CoauthorEdge::new("A1", "I1", EdgeKind::WorksAt),
                CoauthorEdge::new("A1", "A2", EdgeKind::WorksWith),
                CoauthorEdge::new("A2", "I2", EdgeKind::WorksAt),
            ]
        );
        assert_eq!(net.label("A1"), "Root Author");
        assert_eq!(net.label("I2"), "Other U");
    }

    #[test]
    fn test_deduplicates_repeat_collaborations() {
        let w = work(vec![
            authorship("A1", Some("Root"), &[("I1", "Home U")]),
            authorship("A2", Some("Colleague"), &[]),
        ]);
        let net = build_coauthor_network(&[w.clone(), w], &["A1".to_string()], "Root");
        assert_eq!(net.edges.len(), 2);
    }

    #[test]
    fn test_nameless_coauthor_excluded() {
        let works = vec![work(vec![authorship("A3", None, &[("I3", "Hidden U")])])];
        let net = build_coauthor_network(&works, &["A1".to_string()], "Root");
        assert!(net.is_empty());
    }

    #[test]
    fn test_merged_profiles_attach_to_root() {
        let works = vec![work(vec![authorship("A9", Some("Alias"), &[("I1", "Home U")])])];
        let ids = vec!["https://openalex.org/A1".to_string(), "A9".to_string()];
        let net = build_coauthor_network(&works, &ids, "Root");
        assert_eq!(net.edges, vec![CoauthorEdge::new("A1", "I1", EdgeKind::WorksAt)]);
    }

    #[test]
    fn test_affiliations_primary_over_secondary() {
        let works = vec![work(vec![
            authorship("A1", Some("Root"), &[("I1", "Home U")]),
            authorship("A2", Some("Colleague"), &[("I1", "Home U"), ("I2", "Other U")]),
        ])];
        let net = build_coauthor_network(&works, &["A1".to_string()], "Root");
        let affiliations = extract_affiliations(&net);

        assert_eq!(
            affiliations.edges,
            vec![
                CoauthorEdge::new("A1", "I1", EdgeKind::WorksAt),
                CoauthorEdge::new("A1", "I2", EdgeKind::RelatedTo),
            ]
        );
        assert!(!affiliations.labels.contains_key("A2"));
    }

    #[test]
    fn test_nodes_classify_kind() {
        let works = vec![work(vec![
            authorship("A1", Some("Root"), &[("I1", "Home U")]),
            authorship("A2", Some("Colleague"), &[]),
        ])];
        let net = build_coauthor_network(&works, &["A1".to_string()], "Root");
        let nodes = nodes(&net);
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].kind, EntityKind::Author);
        assert_eq!(nodes[1].kind, EntityKind::Institution);
    }

    #[test]
    fn test_empty_selection_gives_empty_network() {
        let net = build_coauthor_network(&[], &[], "Nobody");
        assert!(net.is_empty());
        assert!(nodes(&net).is_empty());
    }
}
