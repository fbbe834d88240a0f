use serde::{Deserialize, Serialize};

use super::BookId;

/// Book集約 - カタログに登録された1冊の書籍
///
/// ISBNはカタログ全体で一意（アプリケーション層とDB制約で保証）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
}

/// 書籍検索条件
///
/// 指定された項目はすべて満たす必要がある（AND）。
/// 未指定の項目は無視し、文字列は大文字小文字を区別しない部分一致。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        contains_ignore_case(&book.title, self.title.as_deref())
            && contains_ignore_case(&book.author, self.author.as_deref())
            && contains_ignore_case(&book.isbn, self.isbn.as_deref())
    }
}

fn contains_ignore_case(value: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => value.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

/// 純粋関数：書籍を登録する
///
/// 新しいIDを採番したBookを返す。重複チェックはアプリケーション層の責務。
pub fn register_book(title: String, author: String, isbn: String) -> Book {
    Book {
        id: BookId::new(),
        title,
        author,
        isbn,
    }
}

/// 純粋関数：書籍情報を更新する
///
/// ビジネスルール：変更できるのはタイトルと著者のみ（ISBNは不変）。
pub fn update_book(book: Book, title: String, author: String) -> Book {
    Book {
        title,
        author,
        ..book
    }
}
