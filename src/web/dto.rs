use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::engine::optimizer::{PairOpportunity, RouteOpportunity};
use crate::engine::pricing::SpotQuote;
use crate::engine::service::EvaluatedRoute;
use crate::engine::swap::SwapOutcome;
use crate::graph::cycles::CycleRoute;
use crate::models::PoolSnapshot;

fn full_hex(addr: &Address) -> String {
    format!("{:?}", addr)
}

#[derive(Deserialize)]
pub struct SwapRequest {
    pub pool: PoolSnapshot,
    /// Decimal string, raw token units.
    pub amount: String,
    pub token: String,
    pub exact_input: bool,
}

#[derive(Serialize)]
pub struct SwapResponse {
    pub timestamp_utc: String,
    pub amount: String,
    pub sqrt_price_x96: String,
    pub ticks_crossed: usize,
}

impl SwapResponse {
    pub fn from_outcome(outcome: &SwapOutcome) -> Self {
        SwapResponse {
            timestamp_utc: chrono::Utc::now().to_rfc3339(),
            amount: outcome.amount.to_string(),
            sqrt_price_x96: outcome.sqrt_price_x96.to_string(),
            ticks_crossed: outcome.ticks_crossed,
        }
    }
}

#[derive(Deserialize)]
pub struct SpotPriceRequest {
    pub pool: PoolSnapshot,
    pub base_token: Option<String>,
    #[serde(default = "default_true")]
    pub fee_adjusted: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Serialize)]
pub struct SpotPriceResponse {
    pub timestamp_utc: String,
    /// Absent when the pool has an empty side and no meaningful price.
    pub price: Option<f64>,
    pub ratio: Option<f64>,
}

impl SpotPriceResponse {
    pub fn from_quote(quote: Option<SpotQuote>) -> Self {
        SpotPriceResponse {
            timestamp_utc: chrono::Utc::now().to_rfc3339(),
            price: quote.map(|q| q.price),
            ratio: quote.map(|q| q.ratio),
        }
    }
}

#[derive(Deserialize)]
pub struct PairOptimizeRequest {
    pub borrow_token: String,
    pub pool1: PoolSnapshot,
    pub pool2: PoolSnapshot,
}

#[derive(Serialize)]
pub struct PairOptimizeResponse {
    pub timestamp_utc: String,
    pub token_borrow: String,
    pub token_base: String,
    pub pool_cheap: String,
    pub pool_expensive: String,
    pub optimal_borrow: String,
    pub profit: String,
    pub repay_amount: String,
    pub swap_out_amount: String,
    pub cheap_sqrt_price_x96: String,
    pub expensive_sqrt_price_x96: String,
}

impl PairOptimizeResponse {
    pub fn from_opportunity(opp: &PairOpportunity) -> Self {
        PairOptimizeResponse {
            timestamp_utc: chrono::Utc::now().to_rfc3339(),
            token_borrow: full_hex(&opp.token_borrow),
            token_base: full_hex(&opp.token_base),
            pool_cheap: full_hex(&opp.pool_cheap),
            pool_expensive: full_hex(&opp.pool_expensive),
            optimal_borrow: opp.optimal_borrow.to_string(),
            profit: opp.profit.to_string(),
            repay_amount: opp.repay_amount.to_string(),
            swap_out_amount: opp.swap_out_amount.to_string(),
            cheap_sqrt_price_x96: opp.cheap_sqrt_price_x96.to_string(),
            expensive_sqrt_price_x96: opp.expensive_sqrt_price_x96.to_string(),
        }
    }
}

#[derive(Deserialize)]
pub struct RouteOptimizeRequest {
    pub borrow_token: String,
    /// First pool is the repayment leg, the rest chain the borrow forward.
    pub pools: Vec<PoolSnapshot>,
}

#[derive(Serialize)]
pub struct RouteOptimizeResponse {
    pub timestamp_utc: String,
    pub token_borrow: String,
    pub token_base: String,
    pub optimal_borrow: String,
    pub profit: String,
    pub repay_amount: String,
    pub swap_out_amount: String,
    pub repay_sqrt_price_x96: String,
    pub proceeds_sqrt_price_x96: String,
}

impl RouteOptimizeResponse {
    pub fn from_opportunity(opp: &RouteOpportunity) -> Self {
        RouteOptimizeResponse {
            timestamp_utc: chrono::Utc::now().to_rfc3339(),
            token_borrow: full_hex(&opp.token_borrow),
            token_base: full_hex(&opp.token_base),
            optimal_borrow: opp.optimal_borrow.to_string(),
            profit: opp.profit.to_string(),
            repay_amount: opp.repay_amount.to_string(),
            swap_out_amount: opp.swap_out_amount.to_string(),
            repay_sqrt_price_x96: opp.repay_sqrt_price_x96.to_string(),
            proceeds_sqrt_price_x96: opp.proceeds_sqrt_price_x96.to_string(),
        }
    }
}

#[derive(Deserialize)]
pub struct RouteProfitRequest {
    pub borrow_amount: String,
    pub borrow_token: String,
    pub pools: Vec<PoolSnapshot>,
}

#[derive(Serialize)]
pub struct RouteProfitResponse {
    pub timestamp_utc: String,
    pub profit: String,
}

#[derive(Deserialize)]
pub struct SimulateRouteRequest {
    pub amount: String,
    pub token: String,
    pub exact_input: bool,
    pub pools: Vec<PoolSnapshot>,
}

#[derive(Deserialize)]
pub struct CycleDiscoveryRequest {
    pub pools: Vec<PoolSnapshot>,
    pub token_from: String,
    pub token_to: String,
    pub max_hops: Option<usize>,
    pub top_k: Option<usize>,
}

#[derive(Serialize)]
pub struct CycleRouteDto {
    pub tokens: Vec<String>,
    pub pools: Vec<String>,
    pub total_weight: f64,
}

impl CycleRouteDto {
    pub fn from_route(route: &CycleRoute) -> Self {
        CycleRouteDto {
            tokens: route.tokens.iter().map(full_hex).collect(),
            pools: route.pools.iter().map(full_hex).collect(),
            total_weight: route.total_weight,
        }
    }
}

#[derive(Serialize)]
pub struct CycleDiscoveryResponse {
    pub timestamp_utc: String,
    pub routes: Vec<CycleRouteDto>,
}

#[derive(Serialize)]
pub struct EvaluatedRouteDto {
    pub tokens: Vec<String>,
    pub pools: Vec<String>,
    pub optimal_borrow: String,
    pub profit: String,
}

impl EvaluatedRouteDto {
    pub fn from_evaluated(route: &EvaluatedRoute) -> Self {
        EvaluatedRouteDto {
            tokens: route.tokens.iter().map(full_hex).collect(),
            pools: route.pools.iter().map(full_hex).collect(),
            optimal_borrow: route.opportunity.optimal_borrow.to_string(),
            profit: route.opportunity.profit.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct ScanResponse {
    pub timestamp_utc: String,
    pub routes: Vec<EvaluatedRouteDto>,
}

#[derive(Deserialize)]
pub struct NegativeCycleRequest {
    pub pools: Vec<PoolSnapshot>,
    pub source: String,
}

#[derive(Serialize)]
pub struct NegativeCycleResponse {
    pub timestamp_utc: String,
    /// Token sequence of a detected negative cycle, absent when none exists.
    pub cycle: Option<Vec<String>>,
}

impl NegativeCycleResponse {
    pub fn from_cycle(cycle: Option<Vec<Address>>) -> Self {
        NegativeCycleResponse {
            timestamp_utc: chrono::Utc::now().to_rfc3339(),
            cycle: cycle.map(|tokens| tokens.iter().map(full_hex).collect()),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub timestamp_utc: String,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl ToString) -> Self {
        ErrorResponse {
            timestamp_utc: chrono::Utc::now().to_rfc3339(),
            error: error.to_string(),
        }
    }
}
