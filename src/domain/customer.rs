use serde::{Deserialize, Serialize};

use super::CustomerId;

/// Customer集約 - 図書館の利用者
///
/// メールアドレスとCPF（ブラジルの個人納税者番号）はそれぞれ一意。
/// 登録後に更新されることはない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub cpf: String,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// 純粋関数：顧客を登録する
pub fn register_customer(
    first_name: String,
    last_name: String,
    email: String,
    cpf: String,
) -> Customer {
    Customer {
        id: CustomerId::new(),
        first_name,
        last_name,
        email,
        cpf,
    }
}
