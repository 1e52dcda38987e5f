use std::collections::BTreeMap;
use std::str::FromStr;

use ethers::types::Address;
use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::math::tick_math::{MAX_TICK, MIN_TICK};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub address: Address,
    pub decimals: u8,
}

#[derive(Debug, Clone)]
pub struct PoolMeta {
    pub address: Address,
    pub token0: Token,
    pub token1: Token,
    pub fee_ppm: u32,
    /// Raw ERC-20 balances held by the pool contract. For constant-product
    /// pools these default to the reserves when the snapshot omits them.
    pub balance0: Option<BigInt>,
    pub balance1: Option<BigInt>,
}

#[derive(Debug, Clone)]
pub enum PoolKind {
    ConstantProduct {
        reserve0: BigInt,
        reserve1: BigInt,
    },
    ConcentratedLiquidity {
        sqrt_price_x96: BigInt,
        tick: i32,
        tick_spacing: i32,
        liquidity: BigInt,
        /// Valid tick window of the snapshot's tick map.
        tick_range: (i32, i32),
        /// Initialized ticks: tick index -> signed liquidityNet.
        ticks: BTreeMap<i32, BigInt>,
    },
}

#[derive(Debug, Clone)]
pub struct Pool {
    pub meta: PoolMeta,
    pub kind: PoolKind,
}

impl Pool {
    pub fn contains(&self, token: Address) -> bool {
        self.meta.token0.address == token || self.meta.token1.address == token
    }

    pub fn counterpart(&self, token: Address) -> Option<Address> {
        if token == self.meta.token0.address {
            Some(self.meta.token1.address)
        } else if token == self.meta.token1.address {
            Some(self.meta.token0.address)
        } else {
            None
        }
    }

    pub fn token_for(&self, address: Address) -> Option<Token> {
        if address == self.meta.token0.address {
            Some(self.meta.token0)
        } else if address == self.meta.token1.address {
            Some(self.meta.token1)
        } else {
            None
        }
    }

    /// Raw balance of one of the pool's tokens, falling back to the reserve
    /// for constant-product pools.
    pub fn balance_of(&self, token: Address) -> Option<BigInt> {
        let is_token0 = if token == self.meta.token0.address {
            true
        } else if token == self.meta.token1.address {
            false
        } else {
            return None;
        };

        let explicit = if is_token0 {
            self.meta.balance0.clone()
        } else {
            self.meta.balance1.clone()
        };
        if explicit.is_some() {
            return explicit;
        }
        match &self.kind {
            PoolKind::ConstantProduct { reserve0, reserve1 } => Some(if is_token0 {
                reserve0.clone()
            } else {
                reserve1.clone()
            }),
            PoolKind::ConcentratedLiquidity { .. } => None,
        }
    }

    pub fn is_concentrated(&self) -> bool {
        matches!(self.kind, PoolKind::ConcentratedLiquidity { .. })
    }
}

/// Wire format for pool state, shared by every route.
///
/// Big integers travel as decimal strings; addresses as 0x-prefixed hex.
/// `poolType` accepts both the generic names and the venue names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSnapshot {
    pub pool_type: String,
    pub pool_address: String,
    pub token0_address: String,
    pub token1_address: String,
    pub token0_decimal: u8,
    pub token1_decimal: u8,
    /// Fee in parts per million (3000 = 0.3%).
    pub fee: u32,
    #[serde(default, alias = "token0balance")]
    pub token0_balance: Option<String>,
    #[serde(default, alias = "token1balance")]
    pub token1_balance: Option<String>,
    #[serde(default)]
    pub reserve0: Option<String>,
    #[serde(default)]
    pub reserve1: Option<String>,
    #[serde(default)]
    pub sqrt_price_x96: Option<String>,
    #[serde(default)]
    pub current_tick: Option<i32>,
    #[serde(default)]
    pub tick_spacing: Option<i32>,
    #[serde(default)]
    pub liquidity: Option<String>,
    #[serde(default)]
    pub tick_map_range: Option<[i32; 2]>,
    /// Initialized ticks as (tick, liquidityNet) pairs, any order.
    #[serde(default)]
    pub tick_map: Option<Vec<(i32, String)>>,
}

impl PoolSnapshot {
    pub fn to_pool(&self) -> Result<Pool, EngineError> {
        let meta = PoolMeta {
            address: parse_address(&self.pool_address)?,
            token0: Token {
                address: parse_address(&self.token0_address)?,
                decimals: self.token0_decimal,
            },
            token1: Token {
                address: parse_address(&self.token1_address)?,
                decimals: self.token1_decimal,
            },
            fee_ppm: self.fee,
            balance0: self.token0_balance.as_deref().map(parse_bigint).transpose()?,
            balance1: self.token1_balance.as_deref().map(parse_bigint).transpose()?,
        };
        if meta.token0.address == meta.token1.address {
            return Err(EngineError::InvalidSnapshot(
                "token0 and token1 are the same address".into(),
            ));
        }
        if self.fee >= 1_000_000 {
            return Err(EngineError::InvalidSnapshot(format!(
                "fee {} ppm is not below 100%",
                self.fee
            )));
        }

        let kind = match self.pool_type.as_str() {
            "constantProduct" | "uniswapV2" => PoolKind::ConstantProduct {
                reserve0: parse_bigint(self.require(&self.reserve0, "reserve0")?)?,
                reserve1: parse_bigint(self.require(&self.reserve1, "reserve1")?)?,
            },
            "concentratedLiquidity" | "uniswapV3" => {
                let range = self.tick_map_range.ok_or_else(|| {
                    EngineError::InvalidSnapshot("missing field tickMapRange".into())
                })?;
                if range[0] < MIN_TICK || range[1] > MAX_TICK || range[0] >= range[1] {
                    return Err(EngineError::InvalidSnapshot(format!(
                        "tickMapRange [{}, {}] is not a valid window",
                        range[0], range[1]
                    )));
                }
                let mut ticks = BTreeMap::new();
                if let Some(entries) = &self.tick_map {
                    for (tick, net) in entries {
                        ticks.insert(*tick, parse_bigint(net)?);
                    }
                }
                let liquidity = parse_bigint(self.require(&self.liquidity, "liquidity")?)?;
                if liquidity < BigInt::zero() {
                    return Err(EngineError::InvalidSnapshot(
                        "negative in-range liquidity".into(),
                    ));
                }
                PoolKind::ConcentratedLiquidity {
                    sqrt_price_x96: parse_bigint(
                        self.require(&self.sqrt_price_x96, "sqrtPriceX96")?,
                    )?,
                    tick: self.current_tick.ok_or_else(|| {
                        EngineError::InvalidSnapshot("missing field currentTick".into())
                    })?,
                    tick_spacing: self.tick_spacing.unwrap_or(1),
                    liquidity,
                    tick_range: (range[0], range[1]),
                    ticks,
                }
            }
            other => {
                return Err(EngineError::InvalidSnapshot(format!(
                    "unknown poolType {other:?}"
                )))
            }
        };

        Ok(Pool { meta, kind })
    }

    fn require<'a>(
        &self,
        field: &'a Option<String>,
        name: &str,
    ) -> Result<&'a str, EngineError> {
        field.as_deref().ok_or_else(|| {
            EngineError::InvalidSnapshot(format!(
                "poolType {:?} requires field {name}",
                self.pool_type
            ))
        })
    }
}

pub fn parse_address(s: &str) -> Result<Address, EngineError> {
    Address::from_str(s.trim())
        .map_err(|e| EngineError::InvalidSnapshot(format!("bad address {s:?}: {e}")))
}

pub fn parse_bigint(s: &str) -> Result<BigInt, EngineError> {
    BigInt::from_str(s.trim())
        .map_err(|e| EngineError::InvalidSnapshot(format!("bad integer {s:?}: {e}")))
}
