use anyhow::{bail, Context, Result};
use ethers::types::Address;
use futures::future;
use log::{debug, info};
use num_bigint::BigInt;
use num_traits::Zero;

use crate::bootstrap::EngineSettings;
use crate::engine::multi_hop::swap_multi_hop;
use crate::engine::optimizer::{
    optimize_multi_hop, optimize_pool_pair, realized_profit_multi_hop, PairOpportunity,
    RouteOpportunity,
};
use crate::engine::pricing::{spot_price, SpotQuote};
use crate::engine::swap::{swap, SwapMode, SwapOutcome};
use crate::graph::cycles::{discover_routes, negative_cycle_with_bias, CycleRoute};
use crate::graph::TokenGraph;
use crate::models::{parse_address, parse_bigint, Pool, PoolSnapshot};

/// A candidate route together with its optimized borrow.
#[derive(Clone, Debug)]
pub struct EvaluatedRoute {
    pub tokens: Vec<Address>,
    pub pools: Vec<Address>,
    pub opportunity: RouteOpportunity,
}

pub fn quote_swap(
    snapshot: &PoolSnapshot,
    amount: &str,
    exact_input: bool,
    token: &str,
) -> Result<SwapOutcome> {
    let pool = snapshot.to_pool().context("invalid pool snapshot")?;
    let amount = parse_bigint(amount)?;
    let token = parse_address(token)?;
    let mode = if exact_input {
        SwapMode::ExactInput
    } else {
        SwapMode::ExactOutput
    };
    Ok(swap(&pool, &amount, mode, token)?)
}

pub fn quote_spot_price(
    snapshot: &PoolSnapshot,
    base_token: Option<&str>,
    fee_adjusted: bool,
    settings: &EngineSettings,
) -> Result<Option<SpotQuote>> {
    let pool = snapshot.to_pool().context("invalid pool snapshot")?;
    let base = base_token.map(parse_address).transpose()?;
    Ok(spot_price(&pool, base, fee_adjusted, settings.pivot_token)?)
}

pub fn optimize_pair(
    borrow_token: &str,
    pool1: &PoolSnapshot,
    pool2: &PoolSnapshot,
) -> Result<PairOpportunity> {
    let borrow = parse_address(borrow_token)?;
    let p1 = pool1.to_pool().context("invalid first pool snapshot")?;
    let p2 = pool2.to_pool().context("invalid second pool snapshot")?;
    Ok(optimize_pool_pair(borrow, &p1, &p2)?)
}

pub fn optimize_route(borrow_token: &str, snapshots: &[PoolSnapshot]) -> Result<RouteOpportunity> {
    let borrow = parse_address(borrow_token)?;
    let pools = to_pools(snapshots)?;
    Ok(optimize_multi_hop(borrow, &pools)?)
}

pub fn route_profit(
    borrow_amount: &str,
    borrow_token: &str,
    snapshots: &[PoolSnapshot],
) -> Result<BigInt> {
    let amount = parse_bigint(borrow_amount)?;
    let borrow = parse_address(borrow_token)?;
    let pools = to_pools(snapshots)?;
    Ok(realized_profit_multi_hop(&amount, borrow, &pools)?)
}

pub fn simulate_route(
    amount: &str,
    start_token: &str,
    exact_input: bool,
    snapshots: &[PoolSnapshot],
) -> Result<SwapOutcome> {
    let amount = parse_bigint(amount)?;
    let token = parse_address(start_token)?;
    let pools = to_pools(snapshots)?;
    let mode = if exact_input {
        SwapMode::ExactInput
    } else {
        SwapMode::ExactOutput
    };
    Ok(swap_multi_hop(&amount, token, mode, &pools)?)
}

/// Discover profitable cycles seeded with one token pair over a pool set.
pub fn discover_cycles(
    snapshots: &[PoolSnapshot],
    token_from: &str,
    token_to: &str,
    max_hops: Option<usize>,
    top_k: Option<usize>,
    settings: &EngineSettings,
) -> Result<Vec<CycleRoute>> {
    let pools = to_pools(snapshots)?;
    let from = parse_address(token_from)?;
    let to = parse_address(token_to)?;
    let graph = TokenGraph::from_pools(&pools);
    let routes = discover_routes(
        &graph,
        (from, to),
        max_hops.unwrap_or(settings.max_cycle_hops),
        &settings.base_tokens,
        top_k.unwrap_or(settings.cycle_top_k),
    );
    info!(
        "cycle discovery over {} pools found {} candidates",
        pools.len(),
        routes.len()
    );
    Ok(routes)
}

/// Quick Bellman-Ford probe for any negative cycle reachable from `source`,
/// demanding the configured per-edge margin before a cycle counts.
pub fn probe_negative_cycle(
    snapshots: &[PoolSnapshot],
    source: &str,
    settings: &EngineSettings,
) -> Result<Option<Vec<Address>>> {
    let pools = to_pools(snapshots)?;
    let source = parse_address(source)?;
    let graph = TokenGraph::from_pools(&pools);
    Ok(negative_cycle_with_bias(
        &graph,
        source,
        settings.weight_adjust_percent,
    ))
}

/// Optimize every candidate route concurrently and return them sorted by
/// profit, best first. Each route borrows its own anchor token, the first
/// token of its cycle. Routes that fail to evaluate are dropped.
pub async fn evaluate_routes(candidates: Vec<(CycleRoute, Vec<Pool>)>) -> Vec<EvaluatedRoute> {
    let tasks = candidates.into_iter().map(|(route, pools)| {
        tokio::task::spawn_blocking(move || {
            let borrow_token = *route.tokens.first()?;
            let opportunity = optimize_multi_hop(borrow_token, &pools).ok()?;
            Some(EvaluatedRoute {
                tokens: route.tokens,
                pools: route.pools,
                opportunity,
            })
        })
    });

    let mut evaluated: Vec<EvaluatedRoute> = future::join_all(tasks)
        .await
        .into_iter()
        .filter_map(|joined| joined.ok().flatten())
        .collect();
    evaluated.sort_by(|a, b| b.opportunity.profit.cmp(&a.opportunity.profit));
    debug!("evaluated {} routes", evaluated.len());
    evaluated
}

/// Discover cycles seeded with a token pair and optimize each one,
/// concurrently, returning profitable routes best first.
pub async fn scan_for_arbitrage(
    snapshots: &[PoolSnapshot],
    token_from: &str,
    token_to: &str,
    settings: &EngineSettings,
) -> Result<Vec<EvaluatedRoute>> {
    let routes = discover_cycles(snapshots, token_from, token_to, None, None, settings)?;
    let pools = to_pools(snapshots)?;

    let mut candidates = Vec::new();
    for route in routes {
        match resolve_route_pools(&route, &pools) {
            Some(route_pools) => candidates.push((route, route_pools)),
            None => bail!("cycle references a pool missing from the snapshot set"),
        }
    }

    let mut evaluated = evaluate_routes(candidates).await;
    evaluated.retain(|r| r.opportunity.profit > BigInt::zero());
    Ok(evaluated)
}

/// Order a cycle's pools the way the optimizer wants them: the last edge's
/// pool holds the borrow token against its base and becomes the repayment
/// leg; the remaining pools chain the borrow forward into that base.
fn resolve_route_pools(route: &CycleRoute, pools: &[Pool]) -> Option<Vec<Pool>> {
    let find = |addr: &Address| pools.iter().find(|p| p.meta.address == *addr).cloned();
    let (last, rest) = route.pools.split_last()?;
    let mut ordered = Vec::with_capacity(route.pools.len());
    ordered.push(find(last)?);
    for addr in rest {
        ordered.push(find(addr)?);
    }
    Some(ordered)
}

fn to_pools(snapshots: &[PoolSnapshot]) -> Result<Vec<Pool>> {
    snapshots
        .iter()
        .enumerate()
        .map(|(i, s)| {
            s.to_pool()
                .with_context(|| format!("invalid pool snapshot at index {i}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::optimizer::RouteOpportunity;
    use crate::models::{PoolKind, PoolMeta, Token};

    fn addr(x: u8) -> Address {
        Address::from([x; 20])
    }

    fn hex(x: u8) -> String {
        format!("{:?}", addr(x))
    }

    fn v2_snapshot(id: u8, t0: u8, t1: u8, reserve0: u64, reserve1: u64) -> PoolSnapshot {
        PoolSnapshot {
            pool_type: "constantProduct".into(),
            pool_address: hex(id),
            token0_address: hex(t0),
            token1_address: hex(t1),
            token0_decimal: 18,
            token1_decimal: 18,
            fee: 3_000,
            token0_balance: None,
            token1_balance: None,
            reserve0: Some(reserve0.to_string()),
            reserve1: Some(reserve1.to_string()),
            sqrt_price_x96: None,
            current_tick: None,
            tick_spacing: None,
            liquidity: None,
            tick_map_range: None,
            tick_map: None,
        }
    }

    fn settings() -> EngineSettings {
        EngineSettings {
            base_tokens: Vec::new(),
            pivot_token: None,
            max_cycle_hops: 4,
            cycle_top_k: 10,
            weight_adjust_percent: 0.0,
        }
    }

    fn v2_pool(id: u8, t0: u8, t1: u8, reserve0: u64, reserve1: u64) -> Pool {
        Pool {
            meta: PoolMeta {
                address: addr(id),
                token0: Token {
                    address: addr(t0),
                    decimals: 18,
                },
                token1: Token {
                    address: addr(t1),
                    decimals: 18,
                },
                fee_ppm: 3_000,
                balance0: None,
                balance1: None,
            },
            kind: PoolKind::ConstantProduct {
                reserve0: BigInt::from(reserve0),
                reserve1: BigInt::from(reserve1),
            },
        }
    }

    #[test]
    fn quote_swap_parses_and_delegates() {
        let snap = v2_snapshot(0xa1, 1, 2, 1_000_000, 2_000_000);
        let out = quote_swap(&snap, "1000", true, &hex(1)).unwrap();
        assert_eq!(out.amount, BigInt::from(1_991));
    }

    #[test]
    fn quote_swap_rejects_garbage_amount() {
        let snap = v2_snapshot(0xa1, 1, 2, 1_000_000, 2_000_000);
        assert!(quote_swap(&snap, "not-a-number", true, &hex(1)).is_err());
    }

    #[test]
    fn discovery_finds_the_triangle() {
        let snaps = vec![
            v2_snapshot(0xa1, 1, 2, 1_000_000, 1_000_000),
            v2_snapshot(0xa2, 2, 3, 1_000_000, 1_000_000),
            v2_snapshot(0xa3, 3, 1, 1_000_000, 1_040_000),
        ];
        let routes = discover_cycles(&snaps, &hex(1), &hex(2), None, None, &settings()).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].tokens.len(), 4);
    }

    #[test]
    fn concurrent_evaluation_ranks_by_profit() {
        let good = (
            CycleRoute {
                tokens: vec![addr(1), addr(2), addr(3), addr(1)],
                pools: vec![addr(0xb0), addr(0xb1), addr(0xb2)],
                total_weight: -0.03,
            },
            vec![
                v2_pool(0xb0, 1, 2, 10_000_000, 10_000_000),
                v2_pool(0xb1, 1, 3, 10_000_000, 10_200_000),
                v2_pool(0xb2, 3, 2, 10_000_000, 10_200_000),
            ],
        );
        let flat = (
            CycleRoute {
                tokens: vec![addr(1), addr(2), addr(3), addr(1)],
                pools: vec![addr(0xc0), addr(0xc1), addr(0xc2)],
                total_weight: 0.01,
            },
            vec![
                v2_pool(0xc0, 1, 2, 10_000_000, 10_000_000),
                v2_pool(0xc1, 1, 3, 10_000_000, 10_000_000),
                v2_pool(0xc2, 3, 2, 10_000_000, 10_000_000),
            ],
        );

        let evaluated =
            tokio_test::block_on(evaluate_routes(vec![flat.clone(), good.clone()]));
        assert_eq!(evaluated.len(), 2);
        assert!(evaluated[0].opportunity.profit >= evaluated[1].opportunity.profit);
        assert_eq!(evaluated[0].pools[0], addr(0xb0));
    }

    #[test]
    fn scan_returns_only_profitable_routes() {
        let snaps = vec![
            v2_snapshot(0xa1, 1, 2, 10_000_000, 10_000_000),
            v2_snapshot(0xa2, 2, 3, 10_000_000, 10_000_000),
            v2_snapshot(0xa3, 3, 1, 10_000_000, 10_400_000),
        ];
        let evaluated =
            tokio_test::block_on(scan_for_arbitrage(&snaps, &hex(1), &hex(2), &settings()))
                .unwrap();
        assert!(!evaluated.is_empty());
        for route in &evaluated {
            assert!(route.opportunity.profit > BigInt::zero());
            assert!(route.opportunity.optimal_borrow > BigInt::zero());
        }
    }

    #[test]
    fn scan_borrows_each_routes_anchor_token() {
        let snaps = vec![
            v2_snapshot(0xa1, 1, 2, 10_000_000, 10_000_000),
            v2_snapshot(0xa2, 2, 3, 10_000_000, 10_000_000),
            v2_snapshot(0xa3, 3, 1, 10_000_000, 10_400_000),
        ];
        // seeded from (3, 2), the profitable cycle closes at token 2, not at
        // the seed's first token
        let evaluated =
            tokio_test::block_on(scan_for_arbitrage(&snaps, &hex(3), &hex(2), &settings()))
                .unwrap();
        assert!(!evaluated.is_empty());
        for route in &evaluated {
            assert_eq!(Some(&route.opportunity.token_borrow), route.tokens.first());
            assert!(route.opportunity.profit > BigInt::zero());
        }
    }

    #[test]
    fn negative_cycle_probe_respects_configured_margin() {
        let snaps = vec![
            v2_snapshot(0xa1, 1, 2, 10_000_000, 10_000_000),
            v2_snapshot(0xa2, 2, 3, 10_000_000, 10_000_000),
            v2_snapshot(0xa3, 3, 1, 10_000_000, 10_400_000),
        ];
        let found = probe_negative_cycle(&snaps, &hex(1), &settings()).unwrap();
        assert!(found.is_some());

        let mut strict = settings();
        strict.weight_adjust_percent = 5.0;
        let hidden = probe_negative_cycle(&snaps, &hex(1), &strict).unwrap();
        assert!(hidden.is_none());
    }

    #[test]
    fn route_opportunity_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<RouteOpportunity>();
    }
}
