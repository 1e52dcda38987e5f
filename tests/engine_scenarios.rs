// tests/engine_scenarios.rs
// =========================
// End-to-end scenarios through the snapshot-driven service layer: exact
// swap arithmetic, pair optimization on a mispriced pair, and bounded
// cycle discovery over a small token graph.

use num_bigint::BigInt;
use num_traits::Zero;

use poolscope::bootstrap::EngineSettings;
use poolscope::engine::service::{
    discover_cycles, optimize_pair, quote_swap, scan_for_arbitrage, simulate_route,
};
use poolscope::models::PoolSnapshot;

// ====== Test Helpers ======

fn addr_hex(x: u8) -> String {
    format!("{:?}", ethers::types::Address::from([x; 20]))
}

fn v2_snapshot(id: u8, t0: u8, t1: u8, reserve0: u64, reserve1: u64) -> PoolSnapshot {
    let json = format!(
        r#"{{
            "poolType": "constantProduct",
            "poolAddress": "{}",
            "token0Address": "{}",
            "token1Address": "{}",
            "token0Decimal": 18,
            "token1Decimal": 18,
            "fee": 3000,
            "reserve0": "{}",
            "reserve1": "{}"
        }}"#,
        addr_hex(id),
        addr_hex(t0),
        addr_hex(t1),
        reserve0,
        reserve1
    );
    serde_json::from_str(&json).expect("valid snapshot JSON")
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

// ====== Exact swap arithmetic ======

#[test]
fn constant_product_swap_matches_reference_value() {
    // out = floor(2_000_000 * 1000 * 0.997) / floor(1_000_000 + 1000 * 0.997) - 1
    //     = 1_994_000_000 / 1_000_997 - 1 = 1992 - 1 = 1991
    let snap = v2_snapshot(0xa1, 1, 2, 1_000_000, 2_000_000);
    let out = quote_swap(&snap, "1000", true, &addr_hex(1)).unwrap();
    assert_eq!(out.amount, BigInt::from(1_991));
}

#[test]
fn concentrated_swap_within_one_segment() {
    // pool parked at tick 0 (sqrt price 2^96) with one position spanning
    // [-600, 600]; a small exact-input trade stays inside the segment
    let json = format!(
        r#"{{
            "poolType": "concentratedLiquidity",
            "poolAddress": "{}",
            "token0Address": "{}",
            "token1Address": "{}",
            "token0Decimal": 18,
            "token1Decimal": 18,
            "fee": 3000,
            "sqrtPriceX96": "79228162514264337593543950336",
            "currentTick": 0,
            "tickSpacing": 60,
            "liquidity": "2000000000000",
            "tickMapRange": [-887272, 887272],
            "tickMap": [[-600, "2000000000000"], [600, "-2000000000000"]]
        }}"#,
        addr_hex(0xb1),
        addr_hex(1),
        addr_hex(2)
    );
    let snap: PoolSnapshot = serde_json::from_str(&json).unwrap();

    let out = quote_swap(&snap, "1000000", true, &addr_hex(1)).unwrap();
    // near-par price less the 0.3% fee and a small price impact
    assert!(out.amount > BigInt::from(990_000));
    assert!(out.amount < BigInt::from(997_000));
    assert_eq!(out.ticks_crossed, 0);
    // token0 in pushes the price down
    let start_price: BigInt = "79228162514264337593543950336".parse().unwrap();
    assert!(out.sqrt_price_x96 < start_price);
}

// ====== Pair optimization ======

#[test]
fn mispriced_pair_yields_positive_optimal_borrow() {
    // same pair priced at 1.00 and 1.02 with ample liquidity
    let flat = v2_snapshot(0xa1, 1, 2, 10_000_000, 10_000_000);
    let rich = v2_snapshot(0xa2, 1, 2, 10_000_000, 10_200_000);

    let opp = optimize_pair(&addr_hex(1), &flat, &rich).unwrap();
    assert!(opp.optimal_borrow > BigInt::zero());
    assert!(opp.profit > BigInt::zero());
    // borrow where token1 is cheap, sell where it is expensive
    assert_eq!(format!("{:?}", opp.pool_cheap), addr_hex(0xa1));
    assert_eq!(format!("{:?}", opp.pool_expensive), addr_hex(0xa2));
}

#[test]
fn balanced_pair_is_not_an_opportunity() {
    let a = v2_snapshot(0xa1, 1, 2, 10_000_000, 10_000_000);
    let b = v2_snapshot(0xa2, 1, 2, 10_000_000, 10_000_000);
    let opp = optimize_pair(&addr_hex(1), &a, &b).unwrap();
    assert!(opp.profit <= BigInt::zero());
}

// ====== Cycle discovery ======

#[test]
fn triangle_with_dangling_edge_yields_exactly_the_triangle() {
    let snaps = vec![
        v2_snapshot(0xa1, 1, 2, 1_000_000, 1_000_000),
        v2_snapshot(0xa2, 2, 3, 1_000_000, 1_000_000),
        v2_snapshot(0xa3, 3, 1, 1_000_000, 1_040_000),
        v2_snapshot(0xa4, 3, 4, 1_000_000, 1_000_000),
    ];

    let routes =
        discover_cycles(&snaps, &addr_hex(1), &addr_hex(2), None, None, &settings()).unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].tokens.len(), 4);
    assert_eq!(routes[0].tokens.first(), routes[0].tokens.last());
    // the dangling token never appears in a cycle
    let dangling: ethers::types::Address = addr_hex(4).parse().unwrap();
    assert!(!routes[0].tokens.contains(&dangling));
}

// ====== Multi-hop simulation ======

#[test]
fn route_simulation_chains_pools_in_order() {
    let snaps = vec![
        v2_snapshot(0xa1, 1, 2, 1_000_000, 2_000_000),
        v2_snapshot(0xa2, 2, 3, 4_000_000, 4_000_000),
    ];
    let out = simulate_route("1000", &addr_hex(1), true, &snaps).unwrap();
    // hop one yields 1991 token2, hop two trades that near par less fees
    assert!(out.amount > BigInt::from(1_900));
    assert!(out.amount < BigInt::from(1_991));
}

// ====== Full scan ======

#[test]
fn scan_finds_and_sizes_the_triangle_arbitrage() {
    let snaps = vec![
        v2_snapshot(0xa1, 1, 2, 10_000_000, 10_000_000),
        v2_snapshot(0xa2, 2, 3, 10_000_000, 10_000_000),
        v2_snapshot(0xa3, 3, 1, 10_000_000, 10_400_000),
    ];

    let evaluated = tokio_test::block_on(scan_for_arbitrage(
        &snaps,
        &addr_hex(1),
        &addr_hex(2),
        &settings(),
    ))
    .unwrap();

    assert!(!evaluated.is_empty());
    for route in &evaluated {
        assert!(route.opportunity.profit > BigInt::zero());
        assert!(route.opportunity.optimal_borrow > BigInt::zero());
    }
}
