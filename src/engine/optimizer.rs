// Borrow-amount optimizer for a pair of pools or a multi-hop route.
//
// Shape of the trade: borrow X of the borrow token from the cheap pool
// (repaid in the base token, exact-output pricing), sell the borrowed X on
// the expensive side (exact-input pricing), pocket the difference. Profit is
// evaluated on the integer swap engine and maximized with a bounded
// golden-section search; the surface is a step function, so the argmax is
// approximate by nature.

use ethers::types::Address;
use log::debug;
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive, Zero};

use crate::engine::multi_hop::swap_multi_hop;
use crate::engine::pricing::spot_price;
use crate::engine::swap::{swap, SwapMode, SwapOutcome};
use crate::error::EngineError;
use crate::math::scalar::maximize_with_seeds;
use crate::models::Pool;

const SEARCH_TOL: f64 = 1e-3;
const SEARCH_MAX_ITER: usize = 64;

/// Result of a two-pool optimization.
#[derive(Clone, Debug)]
pub struct PairOpportunity {
    pub token_borrow: Address,
    pub token_base: Address,
    pub pool_cheap: Address,
    pub pool_expensive: Address,
    pub optimal_borrow: BigInt,
    pub profit: BigInt,
    /// Base-token amount owed to the cheap pool at the optimum.
    pub repay_amount: BigInt,
    /// Base-token proceeds from the expensive pool at the optimum.
    pub swap_out_amount: BigInt,
    /// Resulting sqrt prices of each leg (zero for constant-product pools).
    pub cheap_sqrt_price_x96: BigInt,
    pub expensive_sqrt_price_x96: BigInt,
}

/// Result of a multi-hop route optimization. The first pool of the route is
/// the repayment leg; the rest chain the borrowed token back to the base.
#[derive(Clone, Debug)]
pub struct RouteOpportunity {
    pub token_borrow: Address,
    pub token_base: Address,
    pub optimal_borrow: BigInt,
    pub profit: BigInt,
    pub repay_amount: BigInt,
    pub swap_out_amount: BigInt,
    pub repay_sqrt_price_x96: BigInt,
    pub proceeds_sqrt_price_x96: BigInt,
}

/// Profit of borrowing `borrow` from `pool_cheap` and selling it on
/// `pool_expensive`, in base-token units. Zero repayment means the cheap
/// pool cannot source the borrow, which zeroes the whole trade.
pub fn realized_profit(
    borrow: &BigInt,
    borrow_token: Address,
    pool_cheap: &Pool,
    pool_expensive: &Pool,
) -> Result<BigInt, EngineError> {
    let (repay, proceeds) = pair_legs(borrow, borrow_token, pool_cheap, pool_expensive)?;
    if repay.amount.is_zero() {
        return Ok(BigInt::zero());
    }
    Ok(proceeds.amount - repay.amount)
}

fn pair_legs(
    borrow: &BigInt,
    borrow_token: Address,
    pool_cheap: &Pool,
    pool_expensive: &Pool,
) -> Result<(SwapOutcome, SwapOutcome), EngineError> {
    let repay = swap(pool_cheap, borrow, SwapMode::ExactOutput, borrow_token)?;
    let proceeds = swap(pool_expensive, borrow, SwapMode::ExactInput, borrow_token)?;
    Ok((repay, proceeds))
}

/// Find the borrow amount maximizing profit between two pools sharing the
/// borrow token and its counterpart.
pub fn optimize_pool_pair(
    borrow_token: Address,
    pool1: &Pool,
    pool2: &Pool,
) -> Result<PairOpportunity, EngineError> {
    for pool in [pool1, pool2] {
        if !pool.contains(borrow_token) {
            return Err(EngineError::TokenNotInPool {
                token: borrow_token,
                pool: pool.meta.address,
            });
        }
    }
    let base = pool1
        .counterpart(borrow_token)
        .ok_or(EngineError::TokenNotInPool {
            token: borrow_token,
            pool: pool1.meta.address,
        })?;

    let zeroed = |cheap: &Pool, expensive: &Pool| PairOpportunity {
        token_borrow: borrow_token,
        token_base: base,
        pool_cheap: cheap.meta.address,
        pool_expensive: expensive.meta.address,
        optimal_borrow: BigInt::zero(),
        profit: BigInt::zero(),
        repay_amount: BigInt::zero(),
        swap_out_amount: BigInt::zero(),
        cheap_sqrt_price_x96: BigInt::zero(),
        expensive_sqrt_price_x96: BigInt::zero(),
    };

    // prices of the borrow token in base units; the lower one is where we
    // source the borrow
    let p1 = spot_price(pool1, Some(base), false, None)?;
    let p2 = spot_price(pool2, Some(base), false, None)?;
    let (p1, p2) = match (p1, p2) {
        (Some(a), Some(b)) => (a, b),
        _ => return Ok(zeroed(pool1, pool2)),
    };
    let (pool_cheap, pool_expensive, reference_price) = if p1.price < p2.price {
        (pool2, pool1, p1.price)
    } else {
        (pool1, pool2, p2.price)
    };

    let limit1 = max_borrowable(pool1, borrow_token, reference_price);
    let limit2 = max_borrowable(pool2, borrow_token, reference_price);
    let borrow_limit = limit1.min(limit2);
    if borrow_limit < 1.0 {
        return Ok(zeroed(pool_cheap, pool_expensive));
    }

    let profit_at = |x: f64| {
        let Some(borrow) = BigInt::from_f64(x.floor()) else {
            return f64::NEG_INFINITY;
        };
        realized_profit(&borrow, borrow_token, pool_cheap, pool_expensive)
            .ok()
            .and_then(|p| p.to_f64())
            .unwrap_or(f64::NEG_INFINITY)
    };
    let (x, _) = maximize_with_seeds(
        profit_at,
        1.0,
        0.8 * borrow_limit + 2.0,
        &[0.01 * borrow_limit, 0.05 * borrow_limit],
        SEARCH_TOL,
        SEARCH_MAX_ITER,
    );

    let optimal_borrow = BigInt::from_f64(x.floor().min(borrow_limit))
        .unwrap_or_else(BigInt::zero)
        .max(BigInt::zero());
    let (repay, proceeds) = pair_legs(&optimal_borrow, borrow_token, pool_cheap, pool_expensive)?;
    let profit = if repay.amount.is_zero() {
        BigInt::zero()
    } else {
        &proceeds.amount - &repay.amount
    };
    debug!(
        "pair optimum: borrow {} of {:?}, profit {} ({:?} -> {:?})",
        optimal_borrow, borrow_token, profit, pool_cheap.meta.address, pool_expensive.meta.address
    );

    Ok(PairOpportunity {
        token_borrow: borrow_token,
        token_base: base,
        pool_cheap: pool_cheap.meta.address,
        pool_expensive: pool_expensive.meta.address,
        optimal_borrow,
        profit,
        repay_amount: repay.amount,
        swap_out_amount: proceeds.amount,
        cheap_sqrt_price_x96: repay.sqrt_price_x96,
        expensive_sqrt_price_x96: proceeds.sqrt_price_x96,
    })
}

/// Profit of borrowing from the first pool of `pools` and selling through
/// the remaining hops.
pub fn realized_profit_multi_hop(
    borrow: &BigInt,
    borrow_token: Address,
    pools: &[Pool],
) -> Result<BigInt, EngineError> {
    let (repay, proceeds) = route_legs(borrow, borrow_token, pools)?;
    if repay.amount.is_zero() {
        return Ok(BigInt::zero());
    }
    Ok(proceeds.amount - repay.amount)
}

fn route_legs(
    borrow: &BigInt,
    borrow_token: Address,
    pools: &[Pool],
) -> Result<(SwapOutcome, SwapOutcome), EngineError> {
    if pools.len() < 2 {
        return Err(EngineError::RouteTooShort);
    }
    let repay = swap(&pools[0], borrow, SwapMode::ExactOutput, borrow_token)?;
    let proceeds = swap_multi_hop(borrow, borrow_token, SwapMode::ExactInput, &pools[1..])?;
    Ok((repay, proceeds))
}

/// Optimize the borrow amount for a multi-hop route. The borrow limit comes
/// from the first pool only; a zero repayment at the optimum marks the whole
/// route infeasible and forces the borrow to zero.
pub fn optimize_multi_hop(
    borrow_token: Address,
    pools: &[Pool],
) -> Result<RouteOpportunity, EngineError> {
    if pools.len() < 2 {
        return Err(EngineError::RouteTooShort);
    }
    let first = &pools[0];
    if !first.contains(borrow_token) {
        return Err(EngineError::TokenNotInPool {
            token: borrow_token,
            pool: first.meta.address,
        });
    }
    let base = first
        .counterpart(borrow_token)
        .ok_or(EngineError::TokenNotInPool {
            token: borrow_token,
            pool: first.meta.address,
        })?;

    let borrow_limit = first
        .balance_of(borrow_token)
        .and_then(|b| b.to_f64())
        .unwrap_or(0.0);
    if borrow_limit < 1.0 {
        return Ok(RouteOpportunity {
            token_borrow: borrow_token,
            token_base: base,
            optimal_borrow: BigInt::zero(),
            profit: BigInt::zero(),
            repay_amount: BigInt::zero(),
            swap_out_amount: BigInt::zero(),
            repay_sqrt_price_x96: BigInt::zero(),
            proceeds_sqrt_price_x96: BigInt::zero(),
        });
    }

    let profit_at = |x: f64| {
        let Some(borrow) = BigInt::from_f64(x.floor()) else {
            return f64::NEG_INFINITY;
        };
        realized_profit_multi_hop(&borrow, borrow_token, pools)
            .ok()
            .and_then(|p| p.to_f64())
            .unwrap_or(f64::NEG_INFINITY)
    };
    let (x, _) = maximize_with_seeds(
        profit_at,
        1.0,
        0.8 * borrow_limit,
        &[0.01 * borrow_limit, 0.05 * borrow_limit],
        SEARCH_TOL,
        SEARCH_MAX_ITER,
    );

    let mut optimal_borrow = BigInt::from_f64(x.floor().min(borrow_limit))
        .unwrap_or_else(BigInt::zero)
        .max(BigInt::zero());
    let (repay, proceeds) = route_legs(&optimal_borrow, borrow_token, pools)?;
    let profit;
    if repay.amount.is_zero() {
        optimal_borrow = BigInt::zero();
        profit = BigInt::zero();
    } else {
        profit = &proceeds.amount - &repay.amount;
    }
    debug!(
        "route optimum: borrow {} of {:?} over {} pools, profit {}",
        optimal_borrow,
        borrow_token,
        pools.len(),
        profit
    );

    Ok(RouteOpportunity {
        token_borrow: borrow_token,
        token_base: base,
        optimal_borrow,
        profit,
        repay_amount: repay.amount,
        swap_out_amount: proceeds.amount,
        repay_sqrt_price_x96: repay.sqrt_price_x96,
        proceeds_sqrt_price_x96: proceeds.sqrt_price_x96,
    })
}

/// How much of the borrow token a pool can realistically lend: its raw
/// borrow-token balance, capped by the base-token balance converted at the
/// reference spot price.
fn max_borrowable(pool: &Pool, borrow_token: Address, reference_price: f64) -> f64 {
    let Some(base_token) = pool.counterpart(borrow_token) else {
        return 0.0;
    };
    let borrow_balance = pool
        .balance_of(borrow_token)
        .and_then(|b| b.to_f64())
        .unwrap_or(0.0);
    let base_balance = pool
        .balance_of(base_token)
        .and_then(|b| b.to_f64())
        .unwrap_or(0.0);
    if reference_price <= 0.0 {
        return 0.0;
    }

    let (borrow_dec, base_dec) = match (pool.token_for(borrow_token), pool.token_for(base_token)) {
        (Some(b), Some(q)) => (b.decimals as i32, q.decimals as i32),
        _ => return 0.0,
    };
    // base balance expressed in borrow-token units; the reference price is
    // quoted as borrow per base
    let base_equivalent = base_balance * reference_price * 10f64.powi(borrow_dec - base_dec);
    borrow_balance.min(base_equivalent)
}
