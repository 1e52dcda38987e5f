use ethers::types::Address;
use num_bigint::BigInt;

use crate::engine::swap::{swap, SwapMode, SwapOutcome};
use crate::error::EngineError;
use crate::models::Pool;

/// Chain a swap across several pools.
///
/// Exact input walks the pools in order, feeding each hop's output into the
/// next. Exact output walks them in reverse: the last pool is solved for the
/// requested output first, and the reported amount is what the first pool
/// must be paid. The returned outcome (price, ticks crossed) is that of the
/// final hop processed.
pub fn swap_multi_hop(
    amount: &BigInt,
    start_token: Address,
    mode: SwapMode,
    pools: &[Pool],
) -> Result<SwapOutcome, EngineError> {
    if pools.is_empty() {
        return Err(EngineError::EmptyRoute);
    }

    let hops: Vec<&Pool> = match mode {
        SwapMode::ExactInput => pools.iter().collect(),
        SwapMode::ExactOutput => pools.iter().rev().collect(),
    };

    let mut amount = amount.clone();
    let mut token = start_token;
    let mut last: Option<SwapOutcome> = None;

    for pool in hops {
        let outcome = swap(pool, &amount, mode, token)?;
        token = pool
            .counterpart(token)
            .ok_or(EngineError::TokenNotInPool {
                token,
                pool: pool.meta.address,
            })?;
        amount = outcome.amount.clone();
        last = Some(outcome);
    }

    last.ok_or(EngineError::EmptyRoute)
}
