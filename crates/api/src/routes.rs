use crate::{handlers::*, AppState};
use axum::{
    routing::get,
    Router,
};

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        // Accounts
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/:id",
            get(get_account).put(update_account).delete(delete_account),
        )
        .fallback(not_found)
}

pub fn build_router(state: AppState) -> Router {
    create_router().with_state(state)
}
