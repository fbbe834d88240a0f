use crate::domain::{self, Customer, CustomerId, commands::RegisterCustomer};

use crate::application::{
    ServiceDependencies,
    errors::{ApplicationError, Result},
};

/// 顧客を登録する（純粋な関数）
///
/// ビジネスルール：
/// - CPFは一意（先に確認する）
/// - メールアドレスは一意
pub async fn register_customer(
    deps: &ServiceDependencies,
    cmd: RegisterCustomer,
) -> Result<Customer> {
    let cpf_exists = deps
        .customer_repository
        .exists_by_cpf(&cmd.cpf)
        .await
        .map_err(ApplicationError::RepositoryError)?;

    if cpf_exists {
        return Err(ApplicationError::DuplicateCpf);
    }

    let email_exists = deps
        .customer_repository
        .exists_by_email(&cmd.email)
        .await
        .map_err(ApplicationError::RepositoryError)?;

    if email_exists {
        return Err(ApplicationError::DuplicateEmail);
    }

    let customer =
        domain::customer::register_customer(cmd.first_name, cmd.last_name, cmd.email, cmd.cpf);

    let saved = deps
        .customer_repository
        .save(customer)
        .await
        .map_err(ApplicationError::from_repository)?;

    tracing::info!(customer_id = %saved.id, "Customer registered");

    Ok(saved)
}

/// IDで顧客を取得する
pub async fn get_customer(deps: &ServiceDependencies, customer_id: CustomerId) -> Result<Customer> {
    deps.customer_repository
        .find_by_id(customer_id)
        .await
        .map_err(ApplicationError::RepositoryError)?
        .ok_or(ApplicationError::CustomerNotFound)
}

/// 顧客を削除する
pub async fn delete_customer(deps: &ServiceDependencies, customer: &Customer) -> Result<()> {
    deps.customer_repository
        .delete(customer.id)
        .await
        .map_err(ApplicationError::RepositoryError)?;

    tracing::info!(customer_id = %customer.id, "Customer deleted");

    Ok(())
}
