use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use super::full_math::{mul_div, mul_div_rounding_up};
use super::sqrt_price_math::{
    amount0_delta, amount1_delta, next_sqrt_price_from_input, next_sqrt_price_from_output,
};

pub const FEE_DENOMINATOR_PPM: u32 = 1_000_000;

/// One segment of a concentrated-liquidity swap: amounts moved and the price
/// reached inside a region of constant liquidity.
#[derive(Clone, Debug)]
pub struct SwapStep {
    pub sqrt_price_next_x96: BigInt,
    pub amount_in: BigInt,
    pub amount_out: BigInt,
    pub fee_amount: BigInt,
}

/// Single-segment swap formula.
///
/// `amount_remaining >= 0` means exact input (gross, fee included);
/// `amount_remaining < 0` means exact output of |amount_remaining|. The
/// direction is implied by the target: target below current price is a
/// token0-for-token1 move.
pub fn compute_swap_step(
    sqrt_price_current_x96: &BigInt,
    sqrt_price_target_x96: &BigInt,
    liquidity: &BigInt,
    amount_remaining: &BigInt,
    fee_ppm: u32,
) -> SwapStep {
    let zero_for_one = sqrt_price_target_x96 < sqrt_price_current_x96;
    let exact_in = !amount_remaining.is_negative();

    let fee = BigInt::from(fee_ppm);
    let denom = BigInt::from(FEE_DENOMINATOR_PPM);
    let fee_complement = &denom - &fee;

    let sqrt_price_next_x96;
    let mut amount_in = BigInt::zero();
    let mut amount_out = BigInt::zero();

    if exact_in {
        let amount_remaining_less_fee = mul_div(amount_remaining, &fee_complement, &denom);
        amount_in = if zero_for_one {
            amount0_delta(sqrt_price_target_x96, sqrt_price_current_x96, liquidity, true)
        } else {
            amount1_delta(sqrt_price_current_x96, sqrt_price_target_x96, liquidity, true)
        };
        sqrt_price_next_x96 = if amount_remaining_less_fee >= amount_in {
            sqrt_price_target_x96.clone()
        } else {
            next_sqrt_price_from_input(
                sqrt_price_current_x96,
                liquidity,
                &amount_remaining_less_fee,
                zero_for_one,
            )
        };
    } else {
        let amount_out_requested = -amount_remaining;
        amount_out = if zero_for_one {
            amount1_delta(sqrt_price_target_x96, sqrt_price_current_x96, liquidity, false)
        } else {
            amount0_delta(sqrt_price_current_x96, sqrt_price_target_x96, liquidity, false)
        };
        sqrt_price_next_x96 = if amount_out_requested >= amount_out {
            sqrt_price_target_x96.clone()
        } else {
            next_sqrt_price_from_output(
                sqrt_price_current_x96,
                liquidity,
                &amount_out_requested,
                zero_for_one,
            )
        };
    }

    let max = *sqrt_price_target_x96 == sqrt_price_next_x96;

    if zero_for_one {
        if !(max && exact_in) {
            amount_in = amount0_delta(&sqrt_price_next_x96, sqrt_price_current_x96, liquidity, true);
        }
        if !(max && !exact_in) {
            amount_out =
                amount1_delta(&sqrt_price_next_x96, sqrt_price_current_x96, liquidity, false);
        }
    } else {
        if !(max && exact_in) {
            amount_in = amount1_delta(sqrt_price_current_x96, &sqrt_price_next_x96, liquidity, true);
        }
        if !(max && !exact_in) {
            amount_out =
                amount0_delta(sqrt_price_current_x96, &sqrt_price_next_x96, liquidity, false);
        }
    }

    if !exact_in {
        let requested = -amount_remaining;
        if amount_out > requested {
            amount_out = requested;
        }
    }

    let fee_amount = if exact_in && sqrt_price_next_x96 != *sqrt_price_target_x96 {
        // the remainder of the input is swallowed as fee on a partial move
        amount_remaining - &amount_in
    } else {
        mul_div_rounding_up(&amount_in, &fee, &fee_complement)
    };

    SwapStep {
        sqrt_price_next_x96,
        amount_in,
        amount_out,
        fee_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_math::get_sqrt_ratio_at_tick;

    fn liq() -> BigInt {
        BigInt::from(10u8).pow(21)
    }

    #[test]
    fn exact_input_partial_move_consumes_whole_remaining() {
        let current = get_sqrt_ratio_at_tick(0);
        let target = get_sqrt_ratio_at_tick(-60);
        let remaining = BigInt::from(1_000u32);

        let step = compute_swap_step(&current, &target, &liq(), &remaining, 3_000);
        assert!(step.sqrt_price_next_x96 > target);
        assert!(step.sqrt_price_next_x96 < current);
        // partial move: input plus fee accounts for the full remaining amount
        assert_eq!(&step.amount_in + &step.fee_amount, remaining);
        assert!(step.amount_out > BigInt::zero());
    }

    #[test]
    fn exact_input_reaches_target_with_surplus() {
        let current = get_sqrt_ratio_at_tick(0);
        let target = get_sqrt_ratio_at_tick(-1);
        let remaining = BigInt::from(10u8).pow(24);

        let step = compute_swap_step(&current, &target, &liq(), &remaining, 3_000);
        assert_eq!(step.sqrt_price_next_x96, target);
        assert!(&step.amount_in + &step.fee_amount < remaining);
    }

    #[test]
    fn exact_output_delivers_requested_amount() {
        let current = get_sqrt_ratio_at_tick(0);
        let target = get_sqrt_ratio_at_tick(-600);
        let requested = BigInt::from(1_000_000u64);

        let step = compute_swap_step(&current, &target, &liq(), &(-&requested), 3_000);
        assert_eq!(step.amount_out, requested);
        assert!(step.amount_in > BigInt::zero());
        assert!(step.fee_amount > BigInt::zero());
        assert!(step.sqrt_price_next_x96 > target);
    }

    #[test]
    fn exact_output_capped_at_segment_capacity() {
        let current = get_sqrt_ratio_at_tick(0);
        let target = get_sqrt_ratio_at_tick(-60);
        // far more than the segment can give
        let requested = BigInt::from(10u8).pow(30);

        let step = compute_swap_step(&current, &target, &liq(), &(-&requested), 3_000);
        assert_eq!(step.sqrt_price_next_x96, target);
        assert!(step.amount_out < requested);
    }

    #[test]
    fn one_for_zero_moves_price_up() {
        let current = get_sqrt_ratio_at_tick(0);
        let target = get_sqrt_ratio_at_tick(60);
        let remaining = BigInt::from(1_000u32);

        let step = compute_swap_step(&current, &target, &liq(), &remaining, 3_000);
        assert!(step.sqrt_price_next_x96 > current);
        assert!(step.amount_out > BigInt::zero());
    }
}
