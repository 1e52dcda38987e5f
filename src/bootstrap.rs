use std::str::FromStr;

use ethers::types::Address;

use crate::config::Config;

/// Parsed runtime settings the engine consumes.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub base_tokens: Vec<Address>,
    pub pivot_token: Option<Address>,
    pub max_cycle_hops: usize,
    pub cycle_top_k: usize,
    pub weight_adjust_percent: f64,
}

pub struct AppState {
    pub settings: EngineSettings,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let base_tokens = config
            .base_tokens
            .iter()
            .map(|addr| Address::from_str(addr))
            .collect::<Result<Vec<_>, _>>()?;
        let pivot_token = config
            .pivot_token
            .as_ref()
            .map(|addr| Address::from_str(addr))
            .transpose()?;

        Ok(AppState {
            settings: EngineSettings {
                base_tokens,
                pivot_token,
                max_cycle_hops: config.max_cycle_hops,
                cycle_top_k: config.cycle_top_k,
                weight_adjust_percent: config.weight_adjust_percent,
            },
        })
    }
}
