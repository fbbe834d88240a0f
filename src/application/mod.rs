pub mod book;
pub mod customer;
pub mod errors;
pub mod loan;
mod service_dependencies;

pub use errors::{ApplicationError, Result};
pub use service_dependencies::ServiceDependencies;
