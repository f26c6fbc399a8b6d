use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/auth/callback", get(handlers::auth_callback))
        .route("/config", post(handlers::submit_config))
        .route("/config/reset", post(handlers::reset_config))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/date", post(handlers::change_date_form))
        .route("/select/category", post(handlers::select_category_form))
        .route("/select/habit", post(handlers::select_habit_form))
        .route("/record", post(handlers::record_form))
        .route("/api/view", get(handlers::get_view))
        .route(
            "/api/session",
            post(handlers::open_session).delete(handlers::close_session),
        )
        .route("/api/date", post(handlers::change_date))
        .route("/api/select/category", post(handlers::select_category))
        .route("/api/select/habit", post(handlers::select_habit))
        .route("/api/record", post(handlers::record))
        .with_state(state)
}
