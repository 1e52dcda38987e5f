use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};

/// Largest value representable in an EVM uint256.
pub fn max_uint256() -> BigInt {
    (BigInt::one() << 256u32) - BigInt::one()
}

/// floor(a * b / denominator), computed on the full-width product.
///
/// Panics on a zero denominator; callers are expected to guard reserves and
/// liquidity before dividing by them.
pub fn mul_div(a: &BigInt, b: &BigInt, denominator: &BigInt) -> BigInt {
    assert!(!denominator.is_zero(), "mul_div: division by zero");
    (a * b).div_floor(denominator)
}

/// ceil(a * b / denominator). Panics if the rounded-up result would not fit
/// in a uint256, mirroring the on-chain revert.
pub fn mul_div_rounding_up(a: &BigInt, b: &BigInt, denominator: &BigInt) -> BigInt {
    assert!(!denominator.is_zero(), "mul_div_rounding_up: division by zero");
    let (quotient, remainder) = (a * b).div_mod_floor(denominator);
    if remainder.is_zero() {
        quotient
    } else {
        assert!(
            quotient < max_uint256(),
            "mul_div_rounding_up: result overflows uint256"
        );
        quotient + BigInt::one()
    }
}

/// ceil(a / b) for non-negative operands.
pub fn div_rounding_up(a: &BigInt, b: &BigInt) -> BigInt {
    assert!(!b.is_zero(), "div_rounding_up: division by zero");
    let (quotient, remainder) = a.div_mod_floor(b);
    if remainder.is_zero() {
        quotient
    } else {
        quotient + BigInt::one()
    }
}
