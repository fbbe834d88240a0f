use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_book, create_customer, create_loan, delete_book, delete_customer, get_book,
    get_book_loans, get_customer, get_loan, list_books, list_loans, update_book,
    update_loan_returned,
};

/// Creates the API router with all library endpoints
///
/// Books:
/// - POST /api/books, GET /api/books
/// - GET, PUT, DELETE /api/books/:id
/// - GET /api/books/:id/loans
///
/// Customers:
/// - POST /api/customers
/// - GET, DELETE /api/customers/:id
///
/// Loans:
/// - POST /api/loans, GET /api/loans
/// - GET, PATCH /api/loans/:id
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/books", post(create_book).get(list_books))
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/books/:id/loans", get(get_book_loans))
        .route("/customers", post(create_customer))
        .route("/customers/:id", get(get_customer).delete(delete_customer))
        .route("/loans", post(create_loan).get(list_loans))
        .route("/loans/:id", get(get_loan).patch(update_loan_returned));

    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .nest("/api", api)
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
