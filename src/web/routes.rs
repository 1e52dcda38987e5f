use std::sync::Arc;

use rocket::response::status::BadRequest;
use rocket::serde::json::Json;
use rocket::{get, post, State};

use crate::bootstrap::AppState;
use crate::engine::service;
use crate::web::dto::{
    CycleDiscoveryRequest, CycleDiscoveryResponse, CycleRouteDto, ErrorResponse,
    EvaluatedRouteDto, NegativeCycleRequest, NegativeCycleResponse, PairOptimizeRequest,
    PairOptimizeResponse, RouteOptimizeRequest, RouteOptimizeResponse, RouteProfitRequest,
    RouteProfitResponse, ScanResponse, SimulateRouteRequest, SpotPriceRequest, SpotPriceResponse,
    SwapRequest, SwapResponse,
};

type ApiResult<T> = Result<Json<T>, BadRequest<Json<ErrorResponse>>>;

fn bad_request<T>(e: impl ToString) -> ApiResult<T> {
    log::error!("request failed: {}", e.to_string());
    Err(BadRequest(Json(ErrorResponse::new(e))))
}

#[post("/api/v1/swap", data = "<request>")]
pub fn simulate_swap(request: Json<SwapRequest>) -> ApiResult<SwapResponse> {
    match service::quote_swap(
        &request.pool,
        &request.amount,
        request.exact_input,
        &request.token,
    ) {
        Ok(outcome) => Ok(Json(SwapResponse::from_outcome(&outcome))),
        Err(e) => bad_request(e),
    }
}

#[post("/api/v1/spot-price", data = "<request>")]
pub fn spot_price(
    request: Json<SpotPriceRequest>,
    app_state: &State<Arc<AppState>>,
) -> ApiResult<SpotPriceResponse> {
    match service::quote_spot_price(
        &request.pool,
        request.base_token.as_deref(),
        request.fee_adjusted,
        &app_state.settings,
    ) {
        Ok(quote) => Ok(Json(SpotPriceResponse::from_quote(quote))),
        Err(e) => bad_request(e),
    }
}

#[post("/api/v1/optimize-pair", data = "<request>")]
pub fn optimize_pair(request: Json<PairOptimizeRequest>) -> ApiResult<PairOptimizeResponse> {
    match service::optimize_pair(&request.borrow_token, &request.pool1, &request.pool2) {
        Ok(opp) => Ok(Json(PairOptimizeResponse::from_opportunity(&opp))),
        Err(e) => bad_request(e),
    }
}

#[post("/api/v1/optimize-route", data = "<request>")]
pub fn optimize_route(request: Json<RouteOptimizeRequest>) -> ApiResult<RouteOptimizeResponse> {
    match service::optimize_route(&request.borrow_token, &request.pools) {
        Ok(opp) => Ok(Json(RouteOptimizeResponse::from_opportunity(&opp))),
        Err(e) => bad_request(e),
    }
}

#[post("/api/v1/route-profit", data = "<request>")]
pub fn route_profit(request: Json<RouteProfitRequest>) -> ApiResult<RouteProfitResponse> {
    match service::route_profit(
        &request.borrow_amount,
        &request.borrow_token,
        &request.pools,
    ) {
        Ok(profit) => Ok(Json(RouteProfitResponse {
            timestamp_utc: chrono::Utc::now().to_rfc3339(),
            profit: profit.to_string(),
        })),
        Err(e) => bad_request(e),
    }
}

#[post("/api/v1/simulate-route", data = "<request>")]
pub fn simulate_route(request: Json<SimulateRouteRequest>) -> ApiResult<SwapResponse> {
    match service::simulate_route(
        &request.amount,
        &request.token,
        request.exact_input,
        &request.pools,
    ) {
        Ok(outcome) => Ok(Json(SwapResponse::from_outcome(&outcome))),
        Err(e) => bad_request(e),
    }
}

#[post("/api/v1/discover-cycles", data = "<request>")]
pub fn discover_cycles(
    request: Json<CycleDiscoveryRequest>,
    app_state: &State<Arc<AppState>>,
) -> ApiResult<CycleDiscoveryResponse> {
    match service::discover_cycles(
        &request.pools,
        &request.token_from,
        &request.token_to,
        request.max_hops,
        request.top_k,
        &app_state.settings,
    ) {
        Ok(routes) => Ok(Json(CycleDiscoveryResponse {
            timestamp_utc: chrono::Utc::now().to_rfc3339(),
            routes: routes.iter().map(CycleRouteDto::from_route).collect(),
        })),
        Err(e) => bad_request(e),
    }
}

#[post("/api/v1/scan", data = "<request>")]
pub async fn scan_for_arbitrage(
    request: Json<CycleDiscoveryRequest>,
    app_state: &State<Arc<AppState>>,
) -> ApiResult<ScanResponse> {
    match service::scan_for_arbitrage(
        &request.pools,
        &request.token_from,
        &request.token_to,
        &app_state.settings,
    )
    .await
    {
        Ok(routes) => Ok(Json(ScanResponse {
            timestamp_utc: chrono::Utc::now().to_rfc3339(),
            routes: routes.iter().map(EvaluatedRouteDto::from_evaluated).collect(),
        })),
        Err(e) => bad_request(e),
    }
}

#[post("/api/v1/negative-cycle", data = "<request>")]
pub fn negative_cycle(
    request: Json<NegativeCycleRequest>,
    app_state: &State<Arc<AppState>>,
) -> ApiResult<NegativeCycleResponse> {
    match service::probe_negative_cycle(&request.pools, &request.source, &app_state.settings) {
        Ok(cycle) => Ok(Json(NegativeCycleResponse::from_cycle(cycle))),
        Err(e) => bad_request(e),
    }
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}
