use crate::domain::{Book, BookFilter, BookId, Page, PageRequest};
use async_trait::async_trait;

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 書籍リポジトリポート
///
/// カタログの永続化を抽象化する。
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// 同じISBNの書籍が存在するか確認する
    ///
    /// 登録時の重複チェックに使用される。
    async fn exists_by_isbn(&self, isbn: &str) -> Result<bool>;

    /// 書籍を保存する
    ///
    /// 新規の場合はINSERT、既存の場合はUPDATE（upsert）を実行する。
    async fn save(&self, book: Book) -> Result<Book>;

    /// IDで書籍を取得する
    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>>;

    /// ISBNで書籍を取得する
    ///
    /// 貸出作成時にリクエストのISBNから書籍を解決するために使用される。
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>>;

    /// 書籍を削除する
    async fn delete(&self, book_id: BookId) -> Result<()>;

    /// 条件に一致する書籍をページ単位で検索する
    async fn find(&self, filter: &BookFilter, page: PageRequest) -> Result<Page<Book>>;
}
