//! Property-based tests for identifiers, ratios and network construction.

use proptest::prelude::*;
use research_metrics::aggregate;
use research_metrics::identifiers;
use research_metrics::models::{Authorship, DehydratedAuthor, DehydratedInstitution, EdgeKind, Work};
use research_metrics::network;

/// Generate a work whose authorships draw from a small id pool so repeats are common.
fn arb_work() -> impl Strategy<Value = Work> {
    proptest::collection::vec(
        (
            0u8..6,                                         // author number
            proptest::option::of("[A-Za-z ]{0,8}"),         // display name
            proptest::collection::vec(0u8..4, 0..3),        // institution numbers
        ),
        0..6,
    )
    .prop_map(|authors| Work {
        id: "https://openalex.org/W1".to_string(),
        authorships: authors
            .into_iter()
            .map(|(a, name, insts)| Authorship {
                author_position: None,
                author: DehydratedAuthor {
                    id: Some(format!("https://openalex.org/A{a}")),
                    display_name: name,
                    orcid: None,
                },
                institutions: insts
                    .into_iter()
                    .map(|i| DehydratedInstitution {
                        id: Some(format!("https://openalex.org/I{i}")),
                        display_name: Some(format!("Institution {i}")),
                        ..Default::default()
                    })
                    .collect(),
            })
            .collect(),
        ..Default::default()
    })
}

proptest! {
    /// Normalizing an id twice changes nothing.
    #[test]
    fn openalex_id_normalization_idempotent(id in "[AIW][0-9]{1,10}") {
        let url = format!("https://openalex.org/{id}");
        let once = identifiers::normalize_openalex_id(&url);
        prop_assert_eq!(&once, &id);
        prop_assert_eq!(identifiers::normalize_openalex_id(&once), once);
    }

    /// PMIDs lose their PubMed prefix.
    #[test]
    fn pmid_prefix_stripped(pmid in "[0-9]{1,9}") {
        let url = format!("https://pubmed.ncbi.nlm.nih.gov/{pmid}");
        prop_assert_eq!(identifiers::normalize_pmid(&url), pmid);
    }

    /// Percentages are defined iff the denominator is positive and stay in [0, 100].
    #[test]
    fn percentage_bounds(numerator in 0u64..1_000_000, denominator in 0u64..1_000_000) {
        match aggregate::percentage(numerator, denominator) {
            None => prop_assert_eq!(denominator, 0),
            Some(p) => {
                prop_assert!(denominator > 0);
                prop_assert!((0.0..=100.0).contains(&p));
            }
        }
    }

    /// Lookback windows are contiguous and end at the current year.
    #[test]
    fn lookback_window_contiguous(current in 1950i32..2100, lookback in 1i32..50) {
        let years = aggregate::lookback_window(current, lookback);
        prop_assert_eq!(years.len() as i32, lookback + 2);
        prop_assert_eq!(years.last().copied(), Some(current));
        prop_assert!(years.windows(2).all(|w| w[1] == w[0] + 1));
    }

    /// Edges are unique and never point from the root to itself.
    #[test]
    fn network_edges_unique(works in proptest::collection::vec(arb_work(), 0..5)) {
        let ids = vec!["A0".to_string(), "A1".to_string()];
        let net = network::build_coauthor_network(&works, &ids, "Root");

        let mut seen = std::collections::HashSet::new();
        for edge in &net.edges {
            prop_assert!(seen.insert(edge.clone()), "duplicate edge {:?}", edge);
        }
        // Primary ids merge into the root, so A1 never appears as a node
        prop_assert!(net.edges.iter().all(|e| e.source != "A1" && e.target != "A1"));
        prop_assert!(net.edges_of(EdgeKind::WorksWith).all(|e| e.source == "A0" && e.target != "A0"));
    }

    /// Affiliation view: primary affiliations win over related ones.
    #[test]
    fn affiliations_primary_precedence(works in proptest::collection::vec(arb_work(), 0..5)) {
        let ids = vec!["A0".to_string()];
        let net = network::extract_affiliations(&network::build_coauthor_network(&works, &ids, "Root"));

        let primary: std::collections::HashSet<_> =
            net.edges_of(EdgeKind::WorksAt).map(|e| e.target.clone()).collect();
        prop_assert!(net.edges.iter().all(|e| e.source == "A0"));
        prop_assert!(net.edges_of(EdgeKind::WorksWith).next().is_none());
        prop_assert!(net.edges_of(EdgeKind::RelatedTo).all(|e| !primary.contains(&e.target)));
    }
}
