pub mod book_repository;
pub mod customer_repository;
pub mod loan_repository;

use crate::ports::Conflict;

// パブリックに型を再エクスポート
pub use book_repository::BookRepository as PostgresBookRepository;
pub use customer_repository::CustomerRepository as PostgresCustomerRepository;
pub use loan_repository::LoanRepository as PostgresLoanRepository;

/// Translates a unique-constraint violation into the matching `Conflict`.
///
/// Other database errors pass through unchanged.
pub(crate) fn map_unique_violation(err: sqlx::Error) -> Box<dyn std::error::Error + Send + Sync> {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            if let Some(conflict) = db.constraint().and_then(conflict_for_constraint) {
                return Box::new(conflict);
            }
        }
    }

    Box::new(err)
}

fn conflict_for_constraint(constraint: &str) -> Option<Conflict> {
    match constraint {
        "books_isbn_unique" => Some(Conflict::Isbn),
        "customers_cpf_unique" => Some(Conflict::Cpf),
        "customers_email_unique" => Some(Conflict::Email),
        "loans_one_open_per_book" => Some(Conflict::OpenLoan),
        _ => None,
    }
}
