use crate::domain::{Customer, CustomerId};
use crate::ports::customer_repository::{CustomerRepository as CustomerRepositoryTrait, Result};
use async_trait::async_trait;

use super::map_unique_violation;
use sqlx::{PgPool, Row, postgres::PgRow};

fn map_row_to_customer(row: &PgRow) -> Customer {
    Customer {
        id: CustomerId::from_uuid(row.get("id")),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        cpf: row.get("cpf"),
    }
}

/// PostgreSQL implementation of CustomerRepository
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepositoryTrait for CustomerRepository {
    async fn exists_by_cpf(&self, cpf: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM customers WHERE cpf = $1)")
                .bind(cpf)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM customers WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn save(&self, customer: Customer) -> Result<Customer> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, first_name, last_name, email, cpf)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id)
            DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                email = EXCLUDED.email,
                cpf = EXCLUDED.cpf
            "#,
        )
        .bind(customer.id.value())
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.email)
        .bind(&customer.cpf)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(customer)
    }

    async fn find_by_id(&self, customer_id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query(
            "SELECT id, first_name, last_name, email, cpf FROM customers WHERE id = $1",
        )
        .bind(customer_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_customer))
    }

    async fn delete(&self, customer_id: CustomerId) -> Result<()> {
        sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(customer_id.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
