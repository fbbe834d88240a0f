pub mod book;
pub mod commands;
pub mod customer;
pub mod loan;
pub mod page;
pub mod value_objects;

pub use book::{Book, BookFilter};
pub use customer::Customer;
pub use loan::{Loan, LoanDetails, LoanFilter};
pub use page::{Page, PageRequest};
pub use value_objects::*;
