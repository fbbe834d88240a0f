mod book_service;

pub use book_service::{
    delete_book, find_books, get_book, get_book_by_isbn, register_book, update_book,
};
