use std::collections::HashMap;

use ethers::types::Address;
use log::warn;
use petgraph::algo::find_negative_cycle;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use super::TokenGraph;

/// A candidate cycle with its total log-domain weight.
#[derive(Clone, Debug)]
pub struct RankedCycle {
    pub tokens: Vec<Address>,
    pub total_weight: f64,
}

/// A ranked cycle resolved to one pool per hop.
#[derive(Clone, Debug)]
pub struct CycleRoute {
    pub tokens: Vec<Address>,
    pub pools: Vec<Address>,
    pub total_weight: f64,
}

/// One breadth-first expansion round: extend every path by one unvisited
/// neighbor, and close it whenever a neighbor is the path's start.
/// Returns `(extended_paths, completed_cycles)`.
pub fn expand_frontier(
    graph: &TokenGraph,
    paths: &[Vec<Address>],
) -> (Vec<Vec<Address>>, Vec<Vec<Address>>) {
    let mut extended = Vec::new();
    let mut completed = Vec::new();

    for path in paths {
        let Some(&last) = path.last() else {
            continue;
        };
        let start = path[0];
        for neighbor in graph.neighbors(last) {
            if neighbor == start {
                let mut cycle = path.clone();
                cycle.push(neighbor);
                completed.push(cycle);
            } else if !path.contains(&neighbor) {
                let mut longer = path.clone();
                longer.push(neighbor);
                extended.push(longer);
            }
        }
    }

    (extended, completed)
}

/// Bounded cycle discovery seeded with a starting edge in both directions.
///
/// Runs `max_hops - 2` expansion rounds, collecting closed cycles from every
/// round, so no returned cycle exceeds `max_hops - 1` hops. Two-hop round
/// trips through a single pair are produced too; ranking weeds them out
/// since a fee-paying round trip always carries positive weight.
pub fn find_bounded_cycles(
    graph: &TokenGraph,
    starting_edge: (Address, Address),
    max_hops: usize,
) -> Vec<Vec<Address>> {
    let (from, to) = starting_edge;
    let mut paths = vec![vec![from, to], vec![to, from]];
    let mut cycles = Vec::new();

    let rounds = max_hops.saturating_sub(2);
    for _ in 0..rounds {
        let (extended, completed) = expand_frontier(graph, &paths);
        cycles.extend(completed);
        if extended.is_empty() {
            break;
        }
        paths = extended;
    }
    cycles
}

/// Keep only cycles whose total weight is negative (return factor above 1),
/// sorted best first, at most `top_k`.
pub fn rank_cycles(
    graph: &TokenGraph,
    cycles: Vec<Vec<Address>>,
    top_k: usize,
) -> Vec<RankedCycle> {
    let mut ranked: Vec<RankedCycle> = cycles
        .into_iter()
        .filter_map(|tokens| {
            let total_weight = graph.path_weight(&tokens).ok()?;
            if total_weight.is_finite() && total_weight < 0.0 {
                Some(RankedCycle {
                    tokens,
                    total_weight,
                })
            } else {
                None
            }
        })
        .collect();
    ranked.sort_by(|a, b| a.total_weight.total_cmp(&b.total_weight));
    ranked.truncate(top_k);
    ranked
}

/// Resolve ranked cycles to pool paths, best pool per hop.
pub fn cycle_pool_paths(graph: &TokenGraph, cycles: &[RankedCycle]) -> Vec<CycleRoute> {
    cycles
        .iter()
        .filter_map(|cycle| match graph.edges_for_cycle(&cycle.tokens) {
            Ok(edges) => Some(CycleRoute {
                tokens: cycle.tokens.clone(),
                pools: edges.into_iter().map(|e| e.pool).collect(),
                total_weight: cycle.total_weight,
            }),
            Err(e) => {
                warn!("dropping unresolvable cycle: {e}");
                None
            }
        })
        .collect()
}

/// End-to-end discovery: bounded cycles from a starting edge, optionally
/// restricted to cycles anchored at a configured base token, ranked and
/// resolved to pools.
pub fn discover_routes(
    graph: &TokenGraph,
    starting_edge: (Address, Address),
    max_hops: usize,
    base_tokens: &[Address],
    top_k: usize,
) -> Vec<CycleRoute> {
    let mut cycles = find_bounded_cycles(graph, starting_edge, max_hops);
    if !base_tokens.is_empty() {
        cycles.retain(|c| c.first().is_some_and(|t| base_tokens.contains(t)));
    }
    let ranked = rank_cycles(graph, cycles, top_k);
    cycle_pool_paths(graph, &ranked)
}

/// Bellman-Ford negative-cycle probe over a simplified graph where parallel
/// edges collapse to their minimum weight, each shifted by
/// `-ln(1 - adjust_percentage / 100)`. A positive percentage demands that
/// much extra edge-level margin before a cycle registers as negative.
pub fn negative_cycle_with_bias(
    graph: &TokenGraph,
    source: Address,
    adjust_percentage: f64,
) -> Option<Vec<Address>> {
    let extra = -(1.0 - adjust_percentage / 100.0).ln();
    if !extra.is_finite() {
        return None;
    }

    let inner = graph.inner();
    let mut adjusted: DiGraph<Address, f64> = DiGraph::new();
    for node in inner.node_indices() {
        // node indices carry over because insertion order is preserved
        adjusted.add_node(*inner.node_weight(node)?);
    }

    let mut min_weights: HashMap<(NodeIndex, NodeIndex), f64> = HashMap::new();
    for edge in inner.edge_references() {
        let key = (edge.source(), edge.target());
        let w = edge.weight().weight;
        min_weights
            .entry(key)
            .and_modify(|m| *m = m.min(w))
            .or_insert(w);
    }
    for ((a, b), w) in min_weights {
        adjusted.add_edge(a, b, w + extra);
    }

    let source_node = graph.node(source)?;
    let cycle = find_negative_cycle(&adjusted, source_node)?;
    Some(
        cycle
            .into_iter()
            .filter_map(|n| adjusted.node_weight(n).copied())
            .collect(),
    )
}
