mod loan_service;
mod overdue_notification;

pub use loan_service::{
    create_loan, find_loans, get_loan, get_loans_by_book, get_overdue_loans, mark_returned,
    resolve_book_for_loan,
};
pub use overdue_notification::{OverdueNotice, SweepReport, notify_overdue_loans};
