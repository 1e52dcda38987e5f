use rocket::{launch, routes};
use std::sync::Arc;

mod bootstrap;
mod config;
mod engine;
mod error;
mod graph;
mod math;
mod models;
mod web;

use crate::web::routes::{
    discover_cycles, health, negative_cycle, optimize_pair, optimize_route, route_profit,
    scan_for_arbitrage, simulate_route, simulate_swap, spot_price,
};

#[launch]
async fn rocket() -> _ {
    env_logger::init();

    // Load configuration
    let config = config::Config::from_env().expect("Failed to load configuration");

    // Build application state
    let app_state =
        Arc::new(bootstrap::AppState::new(&config).expect("Failed to initialize application state"));

    // Configure Rocket
    let figment = rocket::Config::figment()
        .merge(("port", config.port))
        .merge(("address", "0.0.0.0"));

    rocket::custom(figment).manage(app_state).mount(
        "/",
        routes![
            simulate_swap,
            spot_price,
            optimize_pair,
            optimize_route,
            route_profit,
            simulate_route,
            discover_cycles,
            scan_for_arbitrage,
            negative_cycle,
            health
        ],
    )
}
