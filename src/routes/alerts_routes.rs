use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch},
    Router,
};

use crate::{auth, controllers::alerts_controller, AppState};

pub fn add_routes(router: Router<AppState>, state: AppState) -> Router<AppState> {
    let alerts = Router::<AppState>::new()
        .route(
            "/api/alerts",
            get(alerts_controller::get_alerts).post(alerts_controller::post_create_alert),
        )
        .route("/api/alerts/:id", delete(alerts_controller::delete_alert))
        .route("/api/alerts/:id/toggle", patch(alerts_controller::patch_toggle_alert))
        .route_layer(from_fn_with_state(state, auth::require_user));

    router.merge(alerts)
}
