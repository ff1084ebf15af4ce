use axum::{routing::get, Router};
use crate::{AppState, controllers::stocks_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/stocks/indices", get(stocks_controller::get_indices))
        .route("/api/stocks/quote/:symbol", get(stocks_controller::get_quote))
        .route("/api/stocks/stats", get(stocks_controller::get_stats))
}
