use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{controllers::home_controller, AppState};

pub mod alerts_routes;
pub mod home_routes;
pub mod stocks_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = home_routes::add_routes(router);
    let router = stocks_routes::add_routes(router);
    let router = alerts_routes::add_routes(router, state.clone());

    router
        .fallback(home_controller::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
