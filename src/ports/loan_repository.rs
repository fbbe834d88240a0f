use crate::domain::{BookId, Loan, LoanDetails, LoanFilter, LoanId, Page, PageRequest};
use async_trait::async_trait;
use chrono::NaiveDate;

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 条件付きINSERTの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanInsert {
    /// 保存された
    Created(Loan),
    /// 同じ書籍に未返却の貸出が既に存在したため保存しなかった
    BookAlreadyLoaned,
}

/// 貸出リポジトリポート
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// 書籍に未返却の貸出が存在するか確認する
    ///
    /// 返却フラグがfalseまたは未設定の貸出を未返却とみなす。
    async fn exists_open_loan_for_book(&self, book_id: BookId) -> Result<bool>;

    /// 書籍に貸出（返却済みを含む）が1件でも存在するか確認する
    ///
    /// 書籍削除の可否判定に使用される。
    async fn exists_for_book(&self, book_id: BookId) -> Result<bool>;

    /// 書籍に未返却の貸出がない場合のみ新しい貸出を保存する
    ///
    /// 確認と保存は不可分に実行される。並行した貸出作成でも
    /// 1冊につき未返却の貸出が2件以上になることはない。
    async fn insert_if_book_available(&self, loan: Loan) -> Result<LoanInsert>;

    /// 貸出を保存する
    ///
    /// 新規の場合はINSERT、既存の場合はUPDATE（upsert）を実行する。
    async fn save(&self, loan: Loan) -> Result<Loan>;

    /// IDで貸出を取得する
    async fn find_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>>;

    /// ISBNまたは顧客名で貸出を検索する
    async fn find(&self, filter: &LoanFilter, page: PageRequest) -> Result<Page<LoanDetails>>;

    /// 書籍の全貸出（返却済みを含む）を取得する
    async fn find_by_book(&self, book_id: BookId, page: PageRequest)
    -> Result<Page<LoanDetails>>;

    /// 延滞している貸出を検索する
    ///
    /// loan_date < cutoff かつ未返却の貸出を返す。順序は保証しない。
    /// バッチジョブでの延滞通知に使用される。
    async fn find_overdue(&self, cutoff: NaiveDate) -> Result<Vec<Loan>>;
}
