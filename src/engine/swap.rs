use std::collections::BTreeMap;

use ethers::types::Address;
use num_bigint::BigInt;
use num_traits::Zero;

use crate::error::EngineError;
use crate::math::constant_product;
use crate::math::swap_step::compute_swap_step;
use crate::math::tick_math::{get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio};
use crate::models::{Pool, PoolKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SwapMode {
    /// `swap_token` is the token being paid in; the result is the output.
    ExactInput,
    /// `swap_token` is the token being taken out; the result is the input
    /// required, or zero when the pool cannot supply the output.
    ExactOutput,
}

#[derive(Clone, Debug)]
pub struct SwapOutcome {
    pub amount: BigInt,
    /// Resulting Q64.96 sqrt price; zero for constant-product pools.
    pub sqrt_price_x96: BigInt,
    pub ticks_crossed: usize,
}

struct SwapState {
    amount_remaining: BigInt,
    amount_calculated: BigInt,
    sqrt_price_x96: BigInt,
    tick: i32,
    liquidity: BigInt,
}

/// Simulate one swap against a pool snapshot.
pub fn swap(
    pool: &Pool,
    amount_specified: &BigInt,
    mode: SwapMode,
    swap_token: Address,
) -> Result<SwapOutcome, EngineError> {
    if !pool.contains(swap_token) {
        return Err(EngineError::TokenNotInPool {
            token: swap_token,
            pool: pool.meta.address,
        });
    }
    let is_token0 = swap_token == pool.meta.token0.address;

    match &pool.kind {
        PoolKind::ConstantProduct { reserve0, reserve1 } => {
            let amount = match mode {
                SwapMode::ExactInput => {
                    let (r_in, r_out) = if is_token0 {
                        (reserve0, reserve1)
                    } else {
                        (reserve1, reserve0)
                    };
                    constant_product::amount_out(r_in, r_out, amount_specified, pool.meta.fee_ppm)
                }
                SwapMode::ExactOutput => {
                    let (r_in, r_out) = if is_token0 {
                        (reserve1, reserve0)
                    } else {
                        (reserve0, reserve1)
                    };
                    constant_product::amount_in_for_out(
                        r_in,
                        r_out,
                        amount_specified,
                        pool.meta.fee_ppm,
                    )
                }
            };
            Ok(SwapOutcome {
                amount,
                sqrt_price_x96: BigInt::zero(),
                ticks_crossed: 0,
            })
        }
        PoolKind::ConcentratedLiquidity {
            sqrt_price_x96,
            tick,
            liquidity,
            tick_range,
            ticks,
            ..
        } => Ok(swap_concentrated(
            sqrt_price_x96,
            *tick,
            liquidity,
            *tick_range,
            ticks,
            pool.meta.fee_ppm,
            amount_specified,
            mode,
            is_token0,
        )),
    }
}

/// Tick-crossing loop over regions of constant liquidity.
///
/// Terminates after at most |tick map| + 2 iterations: every round either
/// crosses an initialized tick (strictly monotone price), lands on a synthetic
/// zero-net boundary tick, or exhausts the requested amount.
#[allow(clippy::too_many_arguments)]
fn swap_concentrated(
    sqrt_price_x96: &BigInt,
    tick: i32,
    liquidity: &BigInt,
    tick_range: (i32, i32),
    ticks: &BTreeMap<i32, BigInt>,
    fee_ppm: u32,
    amount_specified: &BigInt,
    mode: SwapMode,
    swap_token_is_token0: bool,
) -> SwapOutcome {
    // exact-input with token0 in pushes the price down; exact-output flips
    // the direction for the same token
    let to_left = match mode {
        SwapMode::ExactInput => swap_token_is_token0,
        SwapMode::ExactOutput => !swap_token_is_token0,
    };

    let mut state = SwapState {
        amount_remaining: amount_specified.clone(),
        amount_calculated: BigInt::zero(),
        sqrt_price_x96: sqrt_price_x96.clone(),
        tick,
        liquidity: liquidity.clone(),
    };
    let mut ticks_crossed = 0usize;

    while state.amount_remaining > BigInt::zero() {
        let (next_tick, liquidity_net) =
            match next_initialized_tick(ticks, state.tick, to_left, tick_range) {
                Some(entry) => entry,
                None => {
                    // tick map exhausted: exact input keeps what it gathered,
                    // exact output is infeasible
                    let amount = match mode {
                        SwapMode::ExactInput => state.amount_calculated,
                        SwapMode::ExactOutput => BigInt::zero(),
                    };
                    return SwapOutcome {
                        amount,
                        sqrt_price_x96: get_sqrt_ratio_at_tick(state.tick),
                        ticks_crossed,
                    };
                }
            };

        let sqrt_price_next = get_sqrt_ratio_at_tick(next_tick);
        let signed_remaining = match mode {
            SwapMode::ExactInput => state.amount_remaining.clone(),
            SwapMode::ExactOutput => -state.amount_remaining.clone(),
        };
        let step = compute_swap_step(
            &state.sqrt_price_x96,
            &sqrt_price_next,
            &state.liquidity,
            &signed_remaining,
            fee_ppm,
        );
        let gross_in = &step.amount_in + &step.fee_amount;

        match mode {
            SwapMode::ExactInput => {
                state.amount_remaining -= &gross_in;
                state.amount_calculated += &step.amount_out;
            }
            SwapMode::ExactOutput => {
                state.amount_remaining -= &step.amount_out;
                state.amount_calculated += &gross_in;
            }
        }

        if step.sqrt_price_next_x96 == sqrt_price_next {
            // boundary reached: cross and keep going
            ticks_crossed += 1;
            if to_left {
                state.liquidity -= &liquidity_net;
            } else {
                state.liquidity += &liquidity_net;
            }
            assert!(
                state.liquidity >= BigInt::zero(),
                "negative in-range liquidity after crossing tick {next_tick}"
            );
            state.tick = next_tick;
            state.sqrt_price_x96 = sqrt_price_next;
        } else {
            // stopped inside the segment
            state.sqrt_price_x96 = step.sqrt_price_next_x96;
            state.tick = get_tick_at_sqrt_ratio(&state.sqrt_price_x96);
        }
    }

    SwapOutcome {
        amount: state.amount_calculated,
        sqrt_price_x96: state.sqrt_price_x96,
        ticks_crossed,
    }
}

/// Next initialized tick strictly beyond the current one, bounded by the
/// snapshot's tick window. Outside the window there is nothing left; past the
/// outermost initialized tick the window edge acts as a zero-net tick.
fn next_initialized_tick(
    ticks: &BTreeMap<i32, BigInt>,
    current: i32,
    to_left: bool,
    range: (i32, i32),
) -> Option<(i32, BigInt)> {
    let (lo, hi) = range;
    if current <= lo || current >= hi {
        return None;
    }
    if to_left {
        match ticks.range(..current).next_back() {
            Some((&t, net)) => Some((t, net.clone())),
            None => Some((lo, BigInt::zero())),
        }
    } else {
        match ticks.range(current + 1..).next() {
            Some((&t, net)) => Some((t, net.clone())),
            None => Some((hi, BigInt::zero())),
        }
    }
}
