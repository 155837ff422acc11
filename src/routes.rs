use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::handlers::api::{chat, chat_welcome, submit_question, submit_reservation, AppState};
use crate::handlers::test::{health_check, sample_submissions};

pub fn create_router(app_state: Arc<AppState>, is_production: bool) -> Router {
    let mut router = Router::new();

    // Health check is always available
    let health_route = Router::new().route("/health", get(health_check));
    router = router.merge(health_route);

    // Form submission and chat endpoints are always available
    let form_routes = Router::new()
        .route("/questions", post(submit_question))
        .route("/reservations", post(submit_reservation))
        .route("/chat", post(chat))
        .route("/chat/welcome", get(chat_welcome));
    router = router.merge(form_routes);

    // Sample payloads are only served outside production
    if !is_production {
        let sample_routes = Router::new().route("/samples", get(sample_submissions));
        router = router.merge(sample_routes);

        info!("Sample routes enabled - server running in development mode");
    } else {
        info!("Running in production mode - sample endpoints disabled");
    }

    router.with_state(app_state)
}
