mod customer_service;

pub use customer_service::{delete_customer, get_customer, register_customer};
