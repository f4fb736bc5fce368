use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/drinks",
            get(handlers::list_drinks).post(handlers::create_drink),
        )
        .route("/api/drinks/:id", delete(handlers::delete_drink))
        .route(
            "/api/moods",
            get(handlers::list_moods).post(handlers::save_mood),
        )
        .route("/api/moods/:id", delete(handlers::delete_mood))
        .route(
            "/api/saved-drinks",
            get(handlers::list_saved_drinks).post(handlers::save_drink),
        )
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/charts/spending", get(handlers::spending_chart))
        .route("/api/charts/health", get(handlers::health_chart))
        .route("/api/charts/mood", get(handlers::mood_chart))
        .route("/api/correlation", get(handlers::get_correlation))
        .with_state(state)
}
