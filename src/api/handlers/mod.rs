mod books;
mod customers;
mod loans;

use crate::application::ServiceDependencies;

pub use books::{create_book, delete_book, get_book, get_book_loans, list_books, update_book};
pub use customers::{create_customer, delete_customer, get_customer};
pub use loans::{create_loan, get_loan, list_loans, update_loan_returned};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}
