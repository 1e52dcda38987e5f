use num_bigint::BigInt;
use num_traits::One;

pub const MIN_TICK: i32 = -887_272;
pub const MAX_TICK: i32 = 887_272;

// Canonical TickMath magic numbers, Q128.128. Index i is the multiplier for
// bit i+1 of |tick|; bit 0 replaces the 2^128 seed instead.
const BIT0_RATIO_HEX: &str = "fffcb933bd6fad37aa2d162d1a594001";
const STEP_RATIOS_HEX: [&str; 19] = [
    "fff97272373d413259a46990580e213a",
    "fff2e50f5f656932ef12357cf3c7fdcc",
    "ffe5caca7e10e4e61c3624eaa0941cd0",
    "ffcb9843d60f6159c9db58835c926644",
    "ff973b41fa98c081472e6896dfb254c0",
    "ff2ea16466c96a3843ec78b326b52861",
    "fe5dee046a99a2a811c461f1969c3053",
    "fcbe86c7900a88aedcffc83b479aa3a4",
    "f987a7253ac413176f2b074cf7815e54",
    "f3392b0822b70005940c7a398e4b70f3",
    "e7159475a2c29b7443b29c7fa6e889d9",
    "d097f3bdfd2022b8845ad8f792aa5825",
    "a9f746462d870fdf8a65dc1f90e061e5",
    "70d869a156d2a1b890bb3df62baf32f7",
    "31be135f97d08fd981231505542fcfa6",
    "09aa508b5b7a84e1c677de54f3e99bc9",
    "05d6af8dedb81196699c329225ee604",
    "2216e584f5fa1ea926041bedfe98",
    "48a170391f7dc42444e8fa2",
];

/// Exact TickMath.getSqrtRatioAtTick (Q64.96 integer).
pub fn get_sqrt_ratio_at_tick(tick: i32) -> BigInt {
    assert!((MIN_TICK..=MAX_TICK).contains(&tick), "tick out of range");
    let abs_tick = tick.unsigned_abs();

    // ratio is Q128.128 until the final shift
    let mut ratio = if abs_tick & 0x1 != 0 {
        parse_ratio(BIT0_RATIO_HEX)
    } else {
        BigInt::one() << 128
    };

    for (i, hex) in STEP_RATIOS_HEX.iter().enumerate() {
        if abs_tick & (1u32 << (i + 1)) != 0 {
            ratio = (&ratio * parse_ratio(hex)) >> 128;
        }
    }

    if tick > 0 {
        let max = (BigInt::one() << 256) - 1;
        ratio = max / ratio;
    }
    // round-up shift by 32 (Q128.128 -> Q64.96)
    (&ratio + ((BigInt::one() << 32) - 1)) >> 32
}

fn parse_ratio(hex: &str) -> BigInt {
    BigInt::parse_bytes(hex.as_bytes(), 16).expect("tick math constant")
}

/// Binary search inverse of get_sqrt_ratio_at_tick (exact on-grid).
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: &BigInt) -> i32 {
    let mut lo = MIN_TICK;
    let mut hi = MAX_TICK;
    while lo < hi {
        let mid = lo + ((hi - lo + 1) / 2);
        if get_sqrt_ratio_at_tick(mid) <= *sqrt_price_x96 {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}
