use num_bigint::BigInt;
use num_traits::{One, Zero};

use super::full_math::{div_rounding_up, mul_div, mul_div_rounding_up};

pub fn q96() -> BigInt {
    BigInt::one() << 96
}

/// Token0 owed between two sqrt prices at constant liquidity.
///
/// Uniswap-exact rounding: two-step ceil when rounding up, two-step floor
/// otherwise.
pub fn amount0_delta(
    sqrt_ratio_a_x96: &BigInt,
    sqrt_ratio_b_x96: &BigInt,
    liquidity: &BigInt,
    round_up: bool,
) -> BigInt {
    if liquidity.is_zero() {
        return BigInt::zero();
    }
    let (sa, sb) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if sa.is_zero() || sa == sb {
        return BigInt::zero();
    }

    let numerator1 = liquidity << 96;
    let numerator2 = sb - sa;

    if round_up {
        let t = mul_div_rounding_up(&numerator1, &numerator2, sb);
        div_rounding_up(&t, sa)
    } else {
        mul_div(&numerator1, &numerator2, sb) / sa
    }
}

/// Token1 owed between two sqrt prices at constant liquidity.
pub fn amount1_delta(
    sqrt_ratio_a_x96: &BigInt,
    sqrt_ratio_b_x96: &BigInt,
    liquidity: &BigInt,
    round_up: bool,
) -> BigInt {
    if liquidity.is_zero() {
        return BigInt::zero();
    }
    let (sa, sb) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if sa == sb {
        return BigInt::zero();
    }

    let delta = sb - sa;
    if round_up {
        mul_div_rounding_up(liquidity, &delta, &q96())
    } else {
        mul_div(liquidity, &delta, &q96())
    }
}

/// Price after spending `amount_in` (net of fee) of one token.
/// `price_down` is true when the input token is token0.
pub fn next_sqrt_price_from_input(
    sqrt_price_x96: &BigInt,
    liquidity: &BigInt,
    amount_in: &BigInt,
    price_down: bool,
) -> BigInt {
    if amount_in.is_zero() || liquidity.is_zero() {
        return sqrt_price_x96.clone();
    }
    if price_down {
        // sqrtQ = ceil( (L<<96) * sqrtP / ((L<<96) + amountIn * sqrtP) )
        let numerator1 = liquidity << 96;
        let denominator = &numerator1 + amount_in * sqrt_price_x96;
        mul_div_rounding_up(&numerator1, sqrt_price_x96, &denominator)
    } else {
        // sqrtQ = sqrtP + floor( amountIn * Q96 / L )
        sqrt_price_x96 + mul_div(amount_in, &q96(), liquidity)
    }
}

/// Price after withdrawing `amount_out` of one token.
/// `price_down` is true when the output token is token1.
///
/// Panics when the pool segment cannot supply the output; callers bound the
/// requested output by the segment capacity before asking for a price.
pub fn next_sqrt_price_from_output(
    sqrt_price_x96: &BigInt,
    liquidity: &BigInt,
    amount_out: &BigInt,
    price_down: bool,
) -> BigInt {
    if amount_out.is_zero() || liquidity.is_zero() {
        return sqrt_price_x96.clone();
    }
    if price_down {
        // token1 out: sqrtQ = sqrtP - ceil( amountOut * Q96 / L )
        let quotient = mul_div_rounding_up(amount_out, &q96(), liquidity);
        assert!(
            *sqrt_price_x96 > quotient,
            "output exceeds segment token1 capacity"
        );
        sqrt_price_x96 - quotient
    } else {
        // token0 out: sqrtQ = ceil( (L<<96) * sqrtP / ((L<<96) - amountOut * sqrtP) )
        let numerator1 = liquidity << 96;
        let product = amount_out * sqrt_price_x96;
        assert!(
            numerator1 > product,
            "output exceeds segment token0 capacity"
        );
        let denominator = &numerator1 - product;
        mul_div_rounding_up(&numerator1, sqrt_price_x96, &denominator)
    }
}

fn sorted<'a>(a: &'a BigInt, b: &'a BigInt) -> (&'a BigInt, &'a BigInt) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
