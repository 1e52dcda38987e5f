pub mod cycles;

use std::collections::HashMap;

use ethers::types::Address;
use log::warn;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::engine::pricing::spot_price;
use crate::error::EngineError;
use crate::models::Pool;

/// One directed edge of the token graph: a pool traversed in a fixed
/// direction.
#[derive(Clone, Debug)]
pub struct PoolEdge {
    pub pool: Address,
    /// Fee-adjusted exchange ratio: output units per input unit at spot.
    pub ratio: f64,
    /// -ln(ratio); a cycle with negative total weight multiplies to > 1.
    pub weight: f64,
}

/// An edge of a resolved cycle: the hop endpoints plus the pool serving it.
#[derive(Clone, Debug, PartialEq)]
pub struct CycleEdge {
    pub from: Address,
    pub to: Address,
    pub pool: Address,
}

/// Directed multigraph over tokens. Parallel edges are real: several pools
/// can serve the same pair at different prices.
pub struct TokenGraph {
    graph: DiGraph<Address, PoolEdge>,
    token_to_node: HashMap<Address, NodeIndex>,
}

impl Default for TokenGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            token_to_node: HashMap::new(),
        }
    }

    /// Build the graph from pool snapshots, one edge per pool per direction.
    /// Pools without a finite positive price are skipped.
    pub fn from_pools(pools: &[Pool]) -> Self {
        let mut g = Self::new();
        for pool in pools {
            let quote = match spot_price(pool, Some(pool.meta.token0.address), true, None) {
                Ok(Some(q)) => q,
                Ok(None) => {
                    warn!("skipping degenerate pool {:?}", pool.meta.address);
                    continue;
                }
                Err(e) => {
                    warn!("skipping pool {:?}: {e}", pool.meta.address);
                    continue;
                }
            };
            // quote.price is fee-adjusted token1-per-token0; the reverse
            // direction pays the fee on the inverse ratio
            let fee_factor = 1.0 - pool.meta.fee_ppm as f64 / 1_000_000.0;
            let forward = quote.price;
            let reverse = if quote.price > 0.0 {
                (1.0 / (quote.price / fee_factor)) * fee_factor
            } else {
                0.0
            };
            if !(forward.is_finite() && forward > 0.0 && reverse.is_finite() && reverse > 0.0) {
                warn!("skipping unpriceable pool {:?}", pool.meta.address);
                continue;
            }
            let t0 = pool.meta.token0.address;
            let t1 = pool.meta.token1.address;
            g.add_edge(
                t0,
                t1,
                PoolEdge {
                    pool: pool.meta.address,
                    ratio: forward,
                    weight: -forward.ln(),
                },
            );
            g.add_edge(
                t1,
                t0,
                PoolEdge {
                    pool: pool.meta.address,
                    ratio: reverse,
                    weight: -reverse.ln(),
                },
            );
        }
        g
    }

    pub fn add_edge(&mut self, from: Address, to: Address, edge: PoolEdge) {
        let a = self.node_for(from);
        let b = self.node_for(to);
        self.graph.add_edge(a, b, edge);
    }

    fn node_for(&mut self, token: Address) -> NodeIndex {
        if let Some(&idx) = self.token_to_node.get(&token) {
            return idx;
        }
        let idx = self.graph.add_node(token);
        self.token_to_node.insert(token, idx);
        idx
    }

    pub fn node(&self, token: Address) -> Option<NodeIndex> {
        self.token_to_node.get(&token).copied()
    }

    pub fn token(&self, node: NodeIndex) -> Option<Address> {
        self.graph.node_weight(node).copied()
    }

    pub fn inner(&self) -> &DiGraph<Address, PoolEdge> {
        &self.graph
    }

    /// Distinct out-neighbors of a token, insertion order.
    pub fn neighbors(&self, token: Address) -> Vec<Address> {
        let Some(node) = self.node(token) else {
            return Vec::new();
        };
        let mut seen = Vec::new();
        for edge in self.graph.edges(node) {
            if let Some(&t) = self.graph.node_weight(edge.target()) {
                if !seen.contains(&t) {
                    seen.push(t);
                }
            }
        }
        seen
    }

    /// All parallel edges serving `from -> to`.
    pub fn edges_between(&self, from: Address, to: Address) -> Vec<&PoolEdge> {
        let (Some(a), Some(b)) = (self.node(from), self.node(to)) else {
            return Vec::new();
        };
        self.graph
            .edges(a)
            .filter(|e| e.target() == b)
            .map(|e| e.weight())
            .collect()
    }

    /// Lowest-weight (best-priced) edge serving `from -> to`.
    pub fn best_edge(&self, from: Address, to: Address) -> Option<&PoolEdge> {
        self.edges_between(from, to)
            .into_iter()
            .min_by(|a, b| a.weight.total_cmp(&b.weight))
    }

    /// Resolve a token sequence to concrete hops using the best edge of each
    /// pair.
    pub fn edges_for_cycle(&self, token_path: &[Address]) -> Result<Vec<CycleEdge>, EngineError> {
        if token_path.len() < 2 {
            return Err(EngineError::EmptyRoute);
        }
        let mut edges = Vec::with_capacity(token_path.len() - 1);
        for hop in token_path.windows(2) {
            let edge = self
                .best_edge(hop[0], hop[1])
                .ok_or(EngineError::MissingEdge(hop[0], hop[1]))?;
            edges.push(CycleEdge {
                from: hop[0],
                to: hop[1],
                pool: edge.pool,
            });
        }
        Ok(edges)
    }

    /// Product of per-hop exchange ratios along a token path. Above 1.0 the
    /// path returns more than it consumes at spot.
    pub fn cycle_return_factor(&self, token_path: &[Address]) -> Result<f64, EngineError> {
        if token_path.len() < 2 {
            return Err(EngineError::EmptyRoute);
        }
        let mut factor = 1.0;
        for hop in token_path.windows(2) {
            let edge = self
                .best_edge(hop[0], hop[1])
                .ok_or(EngineError::MissingEdge(hop[0], hop[1]))?;
            factor *= edge.ratio;
        }
        Ok(factor)
    }

    /// Total log-domain weight of a token path, best edge per hop.
    pub fn path_weight(&self, token_path: &[Address]) -> Result<f64, EngineError> {
        if token_path.len() < 2 {
            return Err(EngineError::EmptyRoute);
        }
        let mut total = 0.0;
        for hop in token_path.windows(2) {
            let edge = self
                .best_edge(hop[0], hop[1])
                .ok_or(EngineError::MissingEdge(hop[0], hop[1]))?;
            total += edge.weight;
        }
        Ok(total)
    }
}
