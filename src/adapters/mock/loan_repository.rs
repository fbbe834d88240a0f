use crate::domain::{BookId, Loan, LoanDetails, LoanFilter, LoanId, Page, PageRequest};
use crate::ports::Conflict;
use crate::ports::loan_repository::{LoanInsert, LoanRepository as LoanRepositoryTrait, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

use super::book_repository::BookRepository;

/// In-memory implementation of LoanRepository
///
/// Book details for query results are joined from the shared in-memory
/// BookRepository. Loans whose book is unknown are left out of query results.
pub struct LoanRepository {
    loans: Mutex<Vec<Loan>>,
    books: Arc<BookRepository>,
}

impl LoanRepository {
    pub fn new(books: Arc<BookRepository>) -> Self {
        Self {
            loans: Mutex::new(Vec::new()),
            books,
        }
    }

    fn details<'a>(&self, loans: impl Iterator<Item = &'a Loan>) -> Vec<LoanDetails> {
        loans
            .filter_map(|loan| {
                self.books
                    .get(loan.book_id)
                    .map(|book| LoanDetails::new(loan.clone(), &book))
            })
            .collect()
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    async fn exists_open_loan_for_book(&self, book_id: BookId) -> Result<bool> {
        Ok(self
            .loans
            .lock()
            .unwrap()
            .iter()
            .any(|l| l.book_id == book_id && l.is_open()))
    }

    async fn exists_for_book(&self, book_id: BookId) -> Result<bool> {
        Ok(self
            .loans
            .lock()
            .unwrap()
            .iter()
            .any(|l| l.book_id == book_id))
    }

    /// Check and insert under a single lock acquisition
    async fn insert_if_book_available(&self, loan: Loan) -> Result<LoanInsert> {
        let mut loans = self.loans.lock().unwrap();
        if loans.iter().any(|l| l.book_id == loan.book_id && l.is_open()) {
            return Ok(LoanInsert::BookAlreadyLoaned);
        }
        loans.push(loan.clone());
        Ok(LoanInsert::Created(loan))
    }

    /// Rejects a second open loan for the same book, like the partial
    /// unique index in the database
    async fn save(&self, loan: Loan) -> Result<Loan> {
        let mut loans = self.loans.lock().unwrap();
        if loan.is_open()
            && loans
                .iter()
                .any(|l| l.id != loan.id && l.book_id == loan.book_id && l.is_open())
        {
            return Err(Box::new(Conflict::OpenLoan));
        }
        match loans.iter_mut().find(|l| l.id == loan.id) {
            Some(existing) => *existing = loan.clone(),
            None => loans.push(loan.clone()),
        }
        Ok(loan)
    }

    async fn find_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        Ok(self
            .loans
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == loan_id)
            .cloned())
    }

    async fn find(&self, filter: &LoanFilter, page: PageRequest) -> Result<Page<LoanDetails>> {
        let loans = self.loans.lock().unwrap().clone();
        let matching = self
            .details(loans.iter())
            .into_iter()
            .filter(|details| filter.matches(details))
            .collect();

        Ok(Page::slice(matching, page))
    }

    async fn find_by_book(
        &self,
        book_id: BookId,
        page: PageRequest,
    ) -> Result<Page<LoanDetails>> {
        let loans = self.loans.lock().unwrap().clone();
        let matching = self.details(loans.iter().filter(|l| l.book_id == book_id));

        Ok(Page::slice(matching, page))
    }

    async fn find_overdue(&self, cutoff: NaiveDate) -> Result<Vec<Loan>> {
        Ok(self
            .loans
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.is_overdue(cutoff))
            .cloned()
            .collect())
    }
}
