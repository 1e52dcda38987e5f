use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,

    /// Comma-separated token addresses cycles must be anchored at.
    /// Empty means no anchor restriction.
    pub base_tokens: Vec<String>,
    /// Preferred quote token for spot prices when no base is requested.
    pub pivot_token: Option<String>,

    // Cycle discovery bounds
    pub max_cycle_hops: usize,
    pub cycle_top_k: usize,
    /// Extra per-edge margin (percent) demanded by the negative-cycle probe.
    pub weight_adjust_percent: f64,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),

            base_tokens: env::var("BASE_TOKENS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            pivot_token: env::var("PIVOT_TOKEN").ok(),

            max_cycle_hops: env::var("MAX_CYCLE_HOPS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
            cycle_top_k: env::var("CYCLE_TOP_K")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            weight_adjust_percent: env::var("WEIGHT_ADJUST_PERCENT")
                .unwrap_or_else(|_| "0.0".to_string())
                .parse()
                .unwrap_or(0.0),
        })
    }
}
