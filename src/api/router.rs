use axum::{
    Router,
    routing::{get, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_book, delete_book, get_book, list_books, toggle_availability, update_book,
};

/// Creates the API router with all catalog endpoints
///
/// Query endpoints (Read operations):
/// - GET /books - List, page (?page&size) or search (?q=) books
/// - GET /books/:id - Get a book by its public id
///
/// Command endpoints (Write operations):
/// - POST /books - Register a book
/// - PUT /books/:id - Partially update a book
/// - PUT /books/:id/availability - Toggle availability
/// - DELETE /books/:id - Remove a book
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/books/:id/availability", put(toggle_availability))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
