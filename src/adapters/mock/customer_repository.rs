use crate::domain::{Customer, CustomerId};
use crate::ports::Conflict;
use crate::ports::customer_repository::{CustomerRepository as CustomerRepositoryTrait, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory implementation of CustomerRepository
pub struct CustomerRepository {
    customers: Mutex<HashMap<CustomerId, Customer>>,
}

impl CustomerRepository {
    pub fn new() -> Self {
        Self {
            customers: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for CustomerRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CustomerRepositoryTrait for CustomerRepository {
    async fn exists_by_cpf(&self, cpf: &str) -> Result<bool> {
        Ok(self
            .customers
            .lock()
            .unwrap()
            .values()
            .any(|c| c.cpf == cpf))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        Ok(self
            .customers
            .lock()
            .unwrap()
            .values()
            .any(|c| c.email == email))
    }

    async fn save(&self, customer: Customer) -> Result<Customer> {
        let mut customers = self.customers.lock().unwrap();
        if customers
            .values()
            .any(|c| c.id != customer.id && c.cpf == customer.cpf)
        {
            return Err(Box::new(Conflict::Cpf));
        }
        if customers
            .values()
            .any(|c| c.id != customer.id && c.email == customer.email)
        {
            return Err(Box::new(Conflict::Email));
        }

        customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn find_by_id(&self, customer_id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.customers.lock().unwrap().get(&customer_id).cloned())
    }

    async fn delete(&self, customer_id: CustomerId) -> Result<()> {
        self.customers.lock().unwrap().remove(&customer_id);
        Ok(())
    }
}
