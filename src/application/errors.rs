use crate::ports::Conflict;
use thiserror::Error;

/// アプリケーション層のエラー
///
/// HTTPステータスへの変換はAPI層の責務（`api::error`）。
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 入力値の検証エラー（項目ごとのメッセージ）
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// ISBNが既に登録されている
    #[error("Isbn already exists.")]
    DuplicateIsbn,

    /// CPFが既に登録されている
    #[error("CPF already registered.")]
    DuplicateCpf,

    /// メールアドレスが既に登録されている
    #[error("Email already registered.")]
    DuplicateEmail,

    /// 書籍が貸出中
    #[error("Book already loaned.")]
    AlreadyLoaned,

    /// 指定されたISBNの書籍が存在しない
    #[error("Book not found for passed isbn")]
    BookNotFoundForIsbn,

    /// 貸出履歴のある書籍は削除できない
    #[error("Book has loans and cannot be deleted.")]
    BookHasLoans,

    /// 書籍が見つからない
    #[error("Book not found")]
    BookNotFound,

    /// 顧客が見つからない
    #[error("Customer not found")]
    CustomerNotFound,

    /// 貸出が見つからない
    #[error("Loan not found")]
    LoanNotFound,

    /// 延滞判定の日数が日付の表現範囲を超える
    #[error("Overdue threshold of {0} days is out of range")]
    InvalidOverdueThreshold(u32),

    /// リポジトリのエラー
    #[error("Repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 通知サービスのエラー
    #[error("Notification error")]
    NotificationError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApplicationError {
    /// ビジネスルール違反か
    pub fn is_business_rule_violation(&self) -> bool {
        matches!(
            self,
            ApplicationError::DuplicateIsbn
                | ApplicationError::DuplicateCpf
                | ApplicationError::DuplicateEmail
                | ApplicationError::AlreadyLoaned
                | ApplicationError::BookNotFoundForIsbn
                | ApplicationError::BookHasLoans
        )
    }

    /// 対象が見つからないエラーか
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApplicationError::BookNotFound
                | ApplicationError::CustomerNotFound
                | ApplicationError::LoanNotFound
        )
    }

    /// 保存時のリポジトリエラーを変換する
    ///
    /// 一意性制約の違反（`Conflict`）は対応するビジネスルール違反に、
    /// それ以外は`RepositoryError`になる。
    pub fn from_repository(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        match err.downcast_ref::<Conflict>() {
            Some(Conflict::Isbn) => ApplicationError::DuplicateIsbn,
            Some(Conflict::Cpf) => ApplicationError::DuplicateCpf,
            Some(Conflict::Email) => ApplicationError::DuplicateEmail,
            Some(Conflict::OpenLoan) => ApplicationError::AlreadyLoaned,
            None => ApplicationError::RepositoryError(err),
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, ApplicationError>;
