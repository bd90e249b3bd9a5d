use crate::handler;
use crate::state::AppState;
use axum::{
    routing::{get, put},
    Router,
};

/// Build the axum router with all todo list endpoints.
pub fn build_router(state: AppState) -> Router {
    let collection = get(handler::list_items).post(handler::create_item);

    Router::new()
        .route("/health", get(handler::health))
        .route("/todolist", collection.clone())
        .route("/todolist/", collection)
        .route("/todolist/order", put(handler::reorder_item))
        .route(
            "/todolist/{id}",
            get(handler::get_item)
                .put(handler::update_item)
                .delete(handler::delete_item),
        )
        .route("/todolist/{id}/order", put(handler::move_item))
        .with_state(state)
}
