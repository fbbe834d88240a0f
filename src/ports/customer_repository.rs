use crate::domain::{Customer, CustomerId};
use async_trait::async_trait;

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 顧客リポジトリポート
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// 同じCPFの顧客が存在するか確認する
    async fn exists_by_cpf(&self, cpf: &str) -> Result<bool>;

    /// 同じメールアドレスの顧客が存在するか確認する
    async fn exists_by_email(&self, email: &str) -> Result<bool>;

    /// 顧客を保存する
    async fn save(&self, customer: Customer) -> Result<Customer>;

    /// IDで顧客を取得する
    async fn find_by_id(&self, customer_id: CustomerId) -> Result<Option<Customer>>;

    /// 顧客を削除する
    async fn delete(&self, customer_id: CustomerId) -> Result<()>;
}
