use crate::ports::*;
use std::sync::Arc;

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
///
/// このパターンにより：
/// - すべての依存が明示的
/// - データと振る舞いの分離
/// - テストではインメモリ実装に差し替え可能
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_repository: Arc<dyn BookRepository>,
    pub customer_repository: Arc<dyn CustomerRepository>,
    pub loan_repository: Arc<dyn LoanRepository>,
    pub notification_service: Arc<dyn NotificationService>,
}
