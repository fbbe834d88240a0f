use crate::domain::{self, Book, BookFilter, BookId, Page, PageRequest, commands::*};

use crate::application::{
    ServiceDependencies,
    errors::{ApplicationError, Result},
};

/// 書籍を登録する（純粋な関数）
///
/// ビジネスルール：
/// - ISBNはカタログ全体で一意
pub async fn register_book(deps: &ServiceDependencies, cmd: RegisterBook) -> Result<Book> {
    let isbn_exists = deps
        .book_repository
        .exists_by_isbn(&cmd.isbn)
        .await
        .map_err(ApplicationError::RepositoryError)?;

    if isbn_exists {
        return Err(ApplicationError::DuplicateIsbn);
    }

    let book = domain::book::register_book(cmd.title, cmd.author, cmd.isbn);

    let saved = deps
        .book_repository
        .save(book)
        .await
        .map_err(ApplicationError::from_repository)?;

    tracing::info!(book_id = %saved.id, isbn = %saved.isbn, "Book registered");

    Ok(saved)
}

/// IDで書籍を取得する
pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.book_repository
        .find_by_id(book_id)
        .await
        .map_err(ApplicationError::RepositoryError)?
        .ok_or(ApplicationError::BookNotFound)
}

/// ISBNで書籍を取得する
pub async fn get_book_by_isbn(deps: &ServiceDependencies, isbn: &str) -> Result<Option<Book>> {
    deps.book_repository
        .find_by_isbn(isbn)
        .await
        .map_err(ApplicationError::RepositoryError)
}

/// 書籍情報を更新する（純粋な関数）
///
/// 呼び出し側がIDから書籍を解決済みであること。
/// タイトルと著者のみ更新し、ISBNは変更しない。
pub async fn update_book(deps: &ServiceDependencies, book: Book, cmd: UpdateBook) -> Result<Book> {
    let updated = domain::book::update_book(book, cmd.title, cmd.author);

    deps.book_repository
        .save(updated)
        .await
        .map_err(ApplicationError::from_repository)
}

/// 書籍を削除する（純粋な関数）
///
/// ビジネスルール：
/// - 貸出履歴（返却済みを含む）のある書籍は削除不可
pub async fn delete_book(deps: &ServiceDependencies, book: &Book) -> Result<()> {
    let has_loans = deps
        .loan_repository
        .exists_for_book(book.id)
        .await
        .map_err(ApplicationError::RepositoryError)?;

    if has_loans {
        return Err(ApplicationError::BookHasLoans);
    }

    deps.book_repository
        .delete(book.id)
        .await
        .map_err(ApplicationError::RepositoryError)?;

    tracing::info!(book_id = %book.id, "Book deleted");

    Ok(())
}

/// 条件に一致する書籍をページ単位で検索する
pub async fn find_books(
    deps: &ServiceDependencies,
    filter: &BookFilter,
    page: PageRequest,
) -> Result<Page<Book>> {
    deps.book_repository
        .find(filter, page)
        .await
        .map_err(ApplicationError::RepositoryError)
}
