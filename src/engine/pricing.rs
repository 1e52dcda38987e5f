use ethers::types::Address;
use num_traits::ToPrimitive;

use crate::error::EngineError;
use crate::math::swap_step::FEE_DENOMINATOR_PPM;
use crate::models::{Pool, PoolKind};

/// Instantaneous pool price relative to a base token.
#[derive(Clone, Copy, Debug)]
pub struct SpotQuote {
    /// Human price: units of the other token per unit of the base token,
    /// decimal-adjusted.
    pub price: f64,
    /// Raw reserve/price ratio before decimal adjustment, fee-adjusted when
    /// the quote is.
    pub ratio: f64,
}

/// Spot price of `pool` quoted against `base`.
///
/// When `base` is absent the configured pivot token is used if the pool
/// holds it, otherwise token0. A pool with an empty side (zero reserve, zero
/// sqrt price) has no meaningful price and yields `None` rather than an
/// error, so scanning a large pool set keeps going.
pub fn spot_price(
    pool: &Pool,
    base: Option<Address>,
    fee_adjusted: bool,
    pivot: Option<Address>,
) -> Result<Option<SpotQuote>, EngineError> {
    let base = match base {
        Some(token) => {
            if !pool.contains(token) {
                return Err(EngineError::TokenNotInPool {
                    token,
                    pool: pool.meta.address,
                });
            }
            token
        }
        None => match pivot {
            Some(p) if pool.contains(p) => p,
            _ => pool.meta.token0.address,
        },
    };
    let base_is_token0 = base == pool.meta.token0.address;

    let mut ratio = match &pool.kind {
        PoolKind::ConstantProduct { reserve0, reserve1 } => {
            let r0 = reserve0.to_f64().unwrap_or(0.0);
            let r1 = reserve1.to_f64().unwrap_or(0.0);
            if r0 <= 0.0 || r1 <= 0.0 {
                return Ok(None);
            }
            if base_is_token0 {
                r1 / r0
            } else {
                r0 / r1
            }
        }
        PoolKind::ConcentratedLiquidity { sqrt_price_x96, .. } => {
            let sqrt_p = sqrt_price_x96.to_f64().unwrap_or(0.0) / 2f64.powi(96);
            if sqrt_p <= 0.0 {
                return Ok(None);
            }
            let token1_per_token0 = sqrt_p * sqrt_p;
            if base_is_token0 {
                token1_per_token0
            } else {
                1.0 / token1_per_token0
            }
        }
    };

    let (d_base, d_other) = if base_is_token0 {
        (pool.meta.token0.decimals, pool.meta.token1.decimals)
    } else {
        (pool.meta.token1.decimals, pool.meta.token0.decimals)
    };
    if fee_adjusted {
        ratio *= 1.0 - pool.meta.fee_ppm as f64 / FEE_DENOMINATOR_PPM as f64;
    }
    let price = ratio * 10f64.powi(d_base as i32 - d_other as i32);

    if !price.is_finite() {
        return Ok(None);
    }
    Ok(Some(SpotQuote { price, ratio }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_math::{get_sqrt_ratio_at_tick, MAX_TICK, MIN_TICK};
    use crate::models::{PoolMeta, Token};
    use num_bigint::BigInt;
    use std::collections::BTreeMap;

    fn addr(x: u8) -> Address {
        Address::from([x; 20])
    }

    fn meta(d0: u8, d1: u8, fee_ppm: u32) -> PoolMeta {
        PoolMeta {
            address: addr(0xaa),
            token0: Token {
                address: addr(1),
                decimals: d0,
            },
            token1: Token {
                address: addr(2),
                decimals: d1,
            },
            fee_ppm,
            balance0: None,
            balance1: None,
        }
    }

    fn v2_pool(d0: u8, d1: u8, r0: u64, r1: u64) -> Pool {
        Pool {
            meta: meta(d0, d1, 3_000),
            kind: PoolKind::ConstantProduct {
                reserve0: BigInt::from(r0),
                reserve1: BigInt::from(r1),
            },
        }
    }

    #[test]
    fn constant_product_price_with_decimal_adjustment() {
        // 18-dec token0 vs 6-dec token1, raw ratio 2.0
        let pool = v2_pool(18, 6, 1_000_000, 2_000_000);
        let q = spot_price(&pool, Some(addr(1)), false, None)
            .unwrap()
            .unwrap();
        assert!((q.ratio - 2.0).abs() < 1e-12);
        assert!((q.price - 2.0e12).abs() / 2.0e12 < 1e-9);
    }

    #[test]
    fn base_flips_the_ratio() {
        let pool = v2_pool(18, 18, 1_000_000, 2_000_000);
        let from0 = spot_price(&pool, Some(addr(1)), false, None)
            .unwrap()
            .unwrap();
        let from1 = spot_price(&pool, Some(addr(2)), false, None)
            .unwrap()
            .unwrap();
        assert!((from0.price * from1.price - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fee_adjustment_scales_price_down() {
        let pool = v2_pool(18, 18, 1_000_000, 2_000_000);
        let raw = spot_price(&pool, Some(addr(1)), false, None)
            .unwrap()
            .unwrap();
        let adj = spot_price(&pool, Some(addr(1)), true, None)
            .unwrap()
            .unwrap();
        assert!((adj.price - raw.price * 0.997).abs() < 1e-9);
        assert!((adj.ratio - raw.ratio * 0.997).abs() < 1e-9);
    }

    #[test]
    fn zero_reserve_is_degenerate_not_an_error() {
        let pool = v2_pool(18, 18, 0, 2_000_000);
        assert!(spot_price(&pool, Some(addr(1)), false, None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn foreign_base_token_is_an_error() {
        let pool = v2_pool(18, 18, 1_000_000, 2_000_000);
        assert!(matches!(
            spot_price(&pool, Some(addr(9)), false, None),
            Err(EngineError::TokenNotInPool { .. })
        ));
    }

    #[test]
    fn pivot_is_used_when_present_else_token0() {
        let pool = v2_pool(18, 18, 1_000_000, 2_000_000);
        let pivoted = spot_price(&pool, None, false, Some(addr(2)))
            .unwrap()
            .unwrap();
        assert!((pivoted.ratio - 0.5).abs() < 1e-12);
        let defaulted = spot_price(&pool, None, false, Some(addr(9)))
            .unwrap()
            .unwrap();
        assert!((defaulted.ratio - 2.0).abs() < 1e-12);
    }

    #[test]
    fn concentrated_price_comes_from_sqrt_price() {
        let pool = Pool {
            meta: meta(18, 18, 500),
            kind: PoolKind::ConcentratedLiquidity {
                sqrt_price_x96: get_sqrt_ratio_at_tick(0),
                tick: 0,
                tick_spacing: 10,
                liquidity: BigInt::from(1u8),
                tick_range: (MIN_TICK, MAX_TICK),
                ticks: BTreeMap::new(),
            },
        };
        let q = spot_price(&pool, Some(addr(1)), false, None)
            .unwrap()
            .unwrap();
        assert!((q.price - 1.0).abs() < 1e-9);
    }
}
