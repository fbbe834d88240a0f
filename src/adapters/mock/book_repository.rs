use crate::domain::{Book, BookFilter, BookId, Page, PageRequest};
use crate::ports::Conflict;
use crate::ports::book_repository::{BookRepository as BookRepositoryTrait, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// In-memory implementation of BookRepository
///
/// Keeps books in insertion order. Used by tests and by local runs
/// without a database.
pub struct BookRepository {
    books: Mutex<Vec<Book>>,
}

impl BookRepository {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(Vec::new()),
        }
    }

    /// Synchronous lookup used by the in-memory loan repository
    pub fn get(&self, book_id: BookId) -> Option<Book> {
        self.books
            .lock()
            .unwrap()
            .iter()
            .find(|book| book.id == book_id)
            .cloned()
    }
}

impl Default for BookRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn exists_by_isbn(&self, isbn: &str) -> Result<bool> {
        Ok(self.books.lock().unwrap().iter().any(|b| b.isbn == isbn))
    }

    /// Replace the book with the same id, or append a new one
    ///
    /// Rejects an isbn already held by another book, like the unique
    /// constraint in the database.
    async fn save(&self, book: Book) -> Result<Book> {
        let mut books = self.books.lock().unwrap();
        if books.iter().any(|b| b.id != book.id && b.isbn == book.isbn) {
            return Err(Box::new(Conflict::Isbn));
        }
        match books.iter_mut().find(|b| b.id == book.id) {
            Some(existing) => *existing = book.clone(),
            None => books.push(book.clone()),
        }
        Ok(book)
    }

    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        Ok(self.get(book_id))
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        Ok(self
            .books
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.isbn == isbn)
            .cloned())
    }

    async fn delete(&self, book_id: BookId) -> Result<()> {
        self.books.lock().unwrap().retain(|b| b.id != book_id);
        Ok(())
    }

    async fn find(&self, filter: &BookFilter, page: PageRequest) -> Result<Page<Book>> {
        let matching: Vec<Book> = self
            .books
            .lock()
            .unwrap()
            .iter()
            .filter(|book| filter.matches(book))
            .cloned()
            .collect();

        Ok(Page::slice(matching, page))
    }
}
