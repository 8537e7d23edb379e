//! Property tests for reduction and linearization.
//!
//! Reachability is cross-checked against petgraph on the exported `DiGraph`.

use petgraph::algo::{has_path_connecting, is_cyclic_directed};
use petgraph::graph::NodeIndex;
use proptest::prelude::*;
use seqorder::{build_graph, Graph, TieBreak};
use std::collections::BTreeSet;

const VOCAB: usize = 8;

/// Rows drawn as subsequences of one hidden total order, so always acyclic.
fn acyclic_rows() -> impl Strategy<Value = Vec<Vec<u8>>> {
    let hidden = Just((0..VOCAB as u8).collect::<Vec<u8>>()).prop_shuffle();
    let masks = prop::collection::vec(prop::collection::vec(any::<bool>(), VOCAB), 1..7);
    (hidden, masks).prop_map(|(hidden, masks)| {
        masks
            .into_iter()
            .map(|mask| {
                hidden
                    .iter()
                    .zip(mask)
                    .filter(|(_, keep)| *keep)
                    .map(|(t, _)| *t)
                    .collect()
            })
            .collect()
    })
}

/// Arbitrary rows over a tiny vocabulary; cycles are likely.
fn any_rows() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(0u8..5, 0..5), 0..6)
}

fn edge_set(g: &Graph<u8>) -> BTreeSet<(u8, u8)> {
    g.edges().into_iter().map(|(a, b)| (*a, *b)).collect()
}

fn closure(g: &Graph<u8>) -> BTreeSet<(u8, u8)> {
    let d = g.to_digraph();
    let mut pairs = BTreeSet::new();
    for a in d.node_indices() {
        for b in d.node_indices() {
            if a != b && has_path_connecting(&d, a, b, None) {
                pairs.insert((d[a], d[b]));
            }
        }
    }
    pairs
}

proptest! {
    #[test]
    fn linearization_respects_every_row(rows in acyclic_rows()) {
        let g = build_graph(rows.clone());
        for tie_break in [TieBreak::Appearance, TieBreak::Lexicographic] {
            let order = g.linearize_with(tie_break).unwrap();
            let mut sorted = order.clone();
            sorted.sort_unstable();
            let tokens: BTreeSet<u8> = rows.iter().flatten().copied().collect();
            prop_assert_eq!(sorted, tokens.into_iter().collect::<Vec<_>>());

            let pos = |t: u8| order.iter().position(|&x| x == t).unwrap();
            for row in &rows {
                for w in row.windows(2) {
                    prop_assert!(pos(w[0]) < pos(w[1]), "{:?} before {:?} in {:?}", w[0], w[1], order);
                }
            }
        }
    }

    #[test]
    fn reduction_preserves_reachability(rows in acyclic_rows()) {
        let g = build_graph(rows);
        let r = g.reduced().unwrap();
        prop_assert_eq!(closure(&g), closure(&r));
    }

    #[test]
    fn reduced_edges_have_no_alternative_path(rows in acyclic_rows()) {
        let r = build_graph(rows).reduced().unwrap();
        let d = r.to_digraph();
        for e in d.edge_indices() {
            let (a, b) = d.edge_endpoints(e).unwrap();
            let mut without = d.clone();
            without.remove_edge(e);
            prop_assert!(!has_path_connecting(&without, a, b, None));
        }
    }

    #[test]
    fn reduction_ignores_row_order(rows in acyclic_rows()) {
        let forward = build_graph(rows.clone()).reduced().unwrap();
        let backward = build_graph(rows.into_iter().rev()).reduced().unwrap();
        prop_assert_eq!(edge_set(&forward), edge_set(&backward));
    }

    #[test]
    fn reduction_is_idempotent(rows in acyclic_rows()) {
        let once = build_graph(rows).reduced().unwrap();
        let mut twice = once.clone();
        prop_assert_eq!(twice.reduce().unwrap(), 0);
        prop_assert_eq!(edge_set(&once), edge_set(&twice));
    }

    #[test]
    fn cycles_fail_both_passes(rows in any_rows()) {
        let g = build_graph(rows);
        let cyclic = is_cyclic_directed(&g.to_digraph());
        let lin = g.linearize();
        let red = g.reduced();
        prop_assert_eq!(lin.is_err(), cyclic);
        prop_assert_eq!(red.is_err(), cyclic);
        if let Err(e) = lin {
            prop_assert!(e.is_cycle());
            prop_assert!(!e.stuck().is_empty());
        }
        if let Ok(r) = red {
            prop_assert_eq!(closure(&g), closure(&r));
        }
    }

    #[test]
    fn incomparable_pairs_match_closure(rows in acyclic_rows()) {
        let mut g = build_graph(rows);
        let reach = closure(&g);
        let d = g.to_digraph();
        let pairs = g.incomparable_pairs().unwrap();
        for i in 0..d.node_count() {
            for j in (i + 1)..d.node_count() {
                let (a, b) = (d[NodeIndex::new(i)], d[NodeIndex::new(j)]);
                let unrelated = !reach.contains(&(a, b)) && !reach.contains(&(b, a));
                prop_assert_eq!(pairs.contains(&(a, b)), unrelated);
            }
        }
    }
}
