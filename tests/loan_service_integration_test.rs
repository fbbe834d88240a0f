use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use library_rental::adapters::mock;
use library_rental::application::{ApplicationError, ServiceDependencies, book, loan};
use library_rental::domain::commands::*;
use library_rental::domain::{
    Book, BookId, Loan, LoanDetails, LoanFilter, LoanId, Page, PageRequest,
};
use library_rental::ports::{Conflict, LoanInsert, LoanRepository};
use std::sync::Arc;

mod common;

// ============================================================================
// テスト用のヘルパー関数
// ============================================================================

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn days_ago(days: u64) -> NaiveDate {
    today().checked_sub_days(Days::new(days)).unwrap()
}

async fn add_book(deps: &ServiceDependencies, isbn: &str) -> Book {
    book::register_book(
        deps,
        RegisterBook {
            title: format!("Book {}", isbn),
            author: "Author".to_string(),
            isbn: isbn.to_string(),
        },
    )
    .await
    .unwrap()
}

fn loan_cmd(book: &Book, customer: &str, loan_date: NaiveDate) -> CreateLoan {
    CreateLoan {
        book_id: book.id,
        customer_name: customer.to_string(),
        customer_email: format!("{}@example.com", customer.to_lowercase()),
        loan_date,
    }
}

async fn open_loans_for(deps: &ServiceDependencies, book: &Book) -> usize {
    loan::get_loans_by_book(deps, book, PageRequest::default())
        .await
        .unwrap()
        .content
        .iter()
        .filter(|d| d.loan.is_open())
        .count()
}

// ============================================================================
// 貸出作成
// ============================================================================

#[tokio::test]
async fn test_create_loan_success() {
    // Arrange
    let ctx = common::in_memory_context();
    let book = add_book(&ctx.deps, "123456").await;

    // Act
    let created = loan::create_loan(&ctx.deps, loan_cmd(&book, "Alice", today()))
        .await
        .unwrap();

    // Assert
    assert_eq!(created.book_id, book.id);
    assert_eq!(created.returned, Some(false));
    assert_eq!(created.loan_date, today());

    let fetched = loan::get_loan(&ctx.deps, created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_loan_on_loaned_book_fails_without_write() {
    // Arrange
    let ctx = common::in_memory_context();
    let book = add_book(&ctx.deps, "123456").await;
    loan::create_loan(&ctx.deps, loan_cmd(&book, "Alice", today()))
        .await
        .unwrap();

    // Act
    let result = loan::create_loan(&ctx.deps, loan_cmd(&book, "Bob", today())).await;

    // Assert
    assert!(matches!(result, Err(ApplicationError::AlreadyLoaned)));
    assert_eq!(result.unwrap_err().to_string(), "Book already loaned.");

    let history = loan::get_loans_by_book(&ctx.deps, &book, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(history.total_elements, 1);
    assert_eq!(history.content[0].loan.customer_name, "Alice");
}

#[tokio::test]
async fn test_create_return_create_succeeds() {
    let ctx = common::in_memory_context();
    let book = add_book(&ctx.deps, "123456").await;

    let first = loan::create_loan(&ctx.deps, loan_cmd(&book, "Alice", today()))
        .await
        .unwrap();
    let returned = loan::mark_returned(&ctx.deps, first, true).await.unwrap();
    assert_eq!(returned.returned, Some(true));

    let second = loan::create_loan(&ctx.deps, loan_cmd(&book, "Bob", today())).await;
    assert!(second.is_ok());
    assert_eq!(open_loans_for(&ctx.deps, &book).await, 1);
}

#[tokio::test]
async fn test_loan_with_absent_returned_flag_counts_as_open() {
    // Arrange: 返却フラグ未設定の貸出を直接保存
    let ctx = common::in_memory_context();
    let book = add_book(&ctx.deps, "123456").await;
    let mut legacy = library_rental::domain::loan::open_loan(
        book.id,
        "Carol".to_string(),
        "carol@example.com".to_string(),
        today(),
    );
    legacy.returned = None;
    ctx.loans.save(legacy).await.unwrap();

    // Act
    let result = loan::create_loan(&ctx.deps, loan_cmd(&book, "Bob", today())).await;

    // Assert
    assert!(matches!(result, Err(ApplicationError::AlreadyLoaned)));
}

#[tokio::test]
async fn test_single_open_loan_invariant_over_sequence() {
    let ctx = common::in_memory_context();
    let book = add_book(&ctx.deps, "123456").await;

    for customer in ["Alice", "Bob", "Carol", "Dave"] {
        let created = loan::create_loan(&ctx.deps, loan_cmd(&book, customer, today()))
            .await
            .unwrap();
        assert_eq!(open_loans_for(&ctx.deps, &book).await, 1);

        // 貸出中の再作成は常に失敗する
        let again = loan::create_loan(&ctx.deps, loan_cmd(&book, "Eve", today())).await;
        assert!(matches!(again, Err(ApplicationError::AlreadyLoaned)));
        assert_eq!(open_loans_for(&ctx.deps, &book).await, 1);

        loan::mark_returned(&ctx.deps, created, true).await.unwrap();
        assert_eq!(open_loans_for(&ctx.deps, &book).await, 0);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creations_yield_one_open_loan() {
    let ctx = common::in_memory_context();
    let book = add_book(&ctx.deps, "123456").await;

    let mut handles = Vec::new();
    for i in 0..16 {
        let deps = ctx.deps.clone();
        let cmd = loan_cmd(&book, &format!("Customer{}", i), today());
        handles.push(tokio::spawn(
            async move { loan::create_loan(&deps, cmd).await },
        ));
    }

    let mut created = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(ApplicationError::AlreadyLoaned) => rejected += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(rejected, 15);
    assert_eq!(open_loans_for(&ctx.deps, &book).await, 1);
}

#[tokio::test]
async fn test_resolve_book_for_loan_unknown_isbn() {
    let ctx = common::in_memory_context();

    let result = loan::resolve_book_for_loan(&ctx.deps, "999").await;

    assert!(matches!(result, Err(ApplicationError::BookNotFoundForIsbn)));
}

// ============================================================================
// 返却
// ============================================================================

#[tokio::test]
async fn test_get_loan_not_found() {
    let ctx = common::in_memory_context();

    let result = loan::get_loan(&ctx.deps, library_rental::domain::LoanId::new()).await;

    assert!(matches!(result, Err(ApplicationError::LoanNotFound)));
}

#[tokio::test]
async fn test_mark_returned_applies_supplied_flag() {
    let ctx = common::in_memory_context();
    let book = add_book(&ctx.deps, "123456").await;
    let created = loan::create_loan(&ctx.deps, loan_cmd(&book, "Alice", today()))
        .await
        .unwrap();

    let returned = loan::mark_returned(&ctx.deps, created, true).await.unwrap();
    assert_eq!(returned.returned, Some(true));

    // 他に貸出がなければ未返却に戻せる
    let reopened = loan::mark_returned(&ctx.deps, returned, false)
        .await
        .unwrap();
    assert_eq!(reopened.returned, Some(false));

    let fetched = loan::get_loan(&ctx.deps, reopened.id).await.unwrap();
    assert_eq!(fetched.returned, Some(false));
}

#[tokio::test]
async fn test_reopen_rejected_when_book_loaned_again() {
    let ctx = common::in_memory_context();
    let book = add_book(&ctx.deps, "123456").await;
    let first = loan::create_loan(&ctx.deps, loan_cmd(&book, "Alice", today()))
        .await
        .unwrap();
    let first = loan::mark_returned(&ctx.deps, first, true).await.unwrap();
    loan::create_loan(&ctx.deps, loan_cmd(&book, "Bob", today()))
        .await
        .unwrap();

    let result = loan::mark_returned(&ctx.deps, first, false).await;

    assert!(matches!(result, Err(ApplicationError::AlreadyLoaned)));
    assert_eq!(open_loans_for(&ctx.deps, &book).await, 1);
}

type PortResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 未返却チェックが常に「貸出なし」を返す貸出リポジトリ
///
/// チェックと保存の間に別のリクエストが同じ書籍を貸し出した状況を再現する。
struct UncheckedLoanRepository(Arc<mock::LoanRepository>);

#[async_trait]
impl LoanRepository for UncheckedLoanRepository {
    async fn exists_open_loan_for_book(&self, _book_id: BookId) -> PortResult<bool> {
        Ok(false)
    }

    async fn exists_for_book(&self, book_id: BookId) -> PortResult<bool> {
        self.0.exists_for_book(book_id).await
    }

    async fn insert_if_book_available(&self, loan: Loan) -> PortResult<LoanInsert> {
        self.0.insert_if_book_available(loan).await
    }

    async fn save(&self, loan: Loan) -> PortResult<Loan> {
        self.0.save(loan).await
    }

    async fn find_by_id(&self, loan_id: LoanId) -> PortResult<Option<Loan>> {
        self.0.find_by_id(loan_id).await
    }

    async fn find(&self, filter: &LoanFilter, page: PageRequest) -> PortResult<Page<LoanDetails>> {
        self.0.find(filter, page).await
    }

    async fn find_by_book(
        &self,
        book_id: BookId,
        page: PageRequest,
    ) -> PortResult<Page<LoanDetails>> {
        self.0.find_by_book(book_id, page).await
    }

    async fn find_overdue(&self, cutoff: NaiveDate) -> PortResult<Vec<Loan>> {
        self.0.find_overdue(cutoff).await
    }
}

#[tokio::test]
async fn test_reopen_conflict_on_save_reports_already_loaned() {
    // Arrange
    let ctx = common::in_memory_context();
    let deps = ServiceDependencies {
        loan_repository: Arc::new(UncheckedLoanRepository(ctx.loans.clone())),
        ..ctx.deps
    };
    let book = add_book(&deps, "123456").await;
    let first = loan::create_loan(&deps, loan_cmd(&book, "Alice", today()))
        .await
        .unwrap();
    let first = loan::mark_returned(&deps, first, true).await.unwrap();
    loan::create_loan(&deps, loan_cmd(&book, "Bob", today()))
        .await
        .unwrap();

    // Act
    let result = loan::mark_returned(&deps, first, false).await;

    // Assert
    assert!(matches!(result, Err(ApplicationError::AlreadyLoaned)));
    assert_eq!(open_loans_for(&deps, &book).await, 1);
}

#[tokio::test]
async fn test_in_memory_save_rejects_second_open_loan() {
    let ctx = common::in_memory_context();
    let book = add_book(&ctx.deps, "123456").await;
    loan::create_loan(&ctx.deps, loan_cmd(&book, "Alice", today()))
        .await
        .unwrap();

    let second = library_rental::domain::loan::open_loan(
        book.id,
        "Bob".to_string(),
        "bob@example.com".to_string(),
        today(),
    );
    let err = ctx.loans.save(second).await.unwrap_err();

    assert_eq!(err.downcast_ref::<Conflict>(), Some(&Conflict::OpenLoan));
}

// ============================================================================
// 検索
// ============================================================================

#[tokio::test]
async fn test_find_loans_or_semantics() {
    // Arrange
    let ctx = common::in_memory_context();
    let book_a = add_book(&ctx.deps, "123").await;
    let book_b = add_book(&ctx.deps, "456").await;
    let book_c = add_book(&ctx.deps, "789").await;
    loan::create_loan(&ctx.deps, loan_cmd(&book_a, "Zed", today()))
        .await
        .unwrap();
    loan::create_loan(&ctx.deps, loan_cmd(&book_b, "Alice", today()))
        .await
        .unwrap();
    loan::create_loan(&ctx.deps, loan_cmd(&book_c, "Bob", today()))
        .await
        .unwrap();

    // Act & Assert: ISBNのみ一致
    let by_isbn = loan::find_loans(
        &ctx.deps,
        &LoanFilter {
            isbn: Some("123".to_string()),
            customer_name: Some("Alice".to_string()),
        },
        PageRequest::default(),
    )
    .await
    .unwrap();

    let mut names: Vec<_> = by_isbn
        .content
        .iter()
        .map(|d| d.loan.customer_name.clone())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Alice", "Zed"]);

    // 顧客名のみ指定
    let by_customer = loan::find_loans(
        &ctx.deps,
        &LoanFilter {
            isbn: None,
            customer_name: Some("Alice".to_string()),
        },
        PageRequest::default(),
    )
    .await
    .unwrap();
    assert_eq!(by_customer.total_elements, 1);
    assert_eq!(by_customer.content[0].isbn, "456");

    // 条件なしは全件
    let all = loan::find_loans(&ctx.deps, &LoanFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total_elements, 3);
}

#[tokio::test]
async fn test_find_loans_paging() {
    let ctx = common::in_memory_context();
    for i in 0..5 {
        let book = add_book(&ctx.deps, &format!("isbn-{}", i)).await;
        loan::create_loan(&ctx.deps, loan_cmd(&book, "Alice", today()))
            .await
            .unwrap();
    }

    let page = loan::find_loans(
        &ctx.deps,
        &LoanFilter {
            isbn: None,
            customer_name: Some("Alice".to_string()),
        },
        PageRequest::new(1, 2),
    )
    .await
    .unwrap();

    assert_eq!(page.content.len(), 2);
    assert_eq!(page.total_elements, 5);
    assert_eq!(page.total_pages, 3);
}

#[tokio::test]
async fn test_get_loans_by_book_includes_returned() {
    let ctx = common::in_memory_context();
    let book = add_book(&ctx.deps, "123456").await;
    let other = add_book(&ctx.deps, "654321").await;

    let first = loan::create_loan(&ctx.deps, loan_cmd(&book, "Alice", today()))
        .await
        .unwrap();
    loan::mark_returned(&ctx.deps, first, true).await.unwrap();
    loan::create_loan(&ctx.deps, loan_cmd(&book, "Bob", today()))
        .await
        .unwrap();
    loan::create_loan(&ctx.deps, loan_cmd(&other, "Carol", today()))
        .await
        .unwrap();

    let history = loan::get_loans_by_book(&ctx.deps, &book, PageRequest::default())
        .await
        .unwrap();

    assert_eq!(history.total_elements, 2);
    assert!(history.content.iter().all(|d| d.isbn == "123456"));
}

#[tokio::test]
async fn test_save_and_refetch_round_trip() {
    let ctx = common::in_memory_context();
    let book = add_book(&ctx.deps, "123456").await;
    let loan = library_rental::domain::loan::open_loan(
        book.id,
        "Alice".to_string(),
        "alice@example.com".to_string(),
        days_ago(2),
    );

    let saved: Loan = ctx.loans.save(loan.clone()).await.unwrap();
    let fetched = loan::get_loan(&ctx.deps, saved.id).await.unwrap();

    assert_eq!(fetched.book_id, loan.book_id);
    assert_eq!(fetched.customer_name, loan.customer_name);
    assert_eq!(fetched.customer_email, loan.customer_email);
    assert_eq!(fetched.loan_date, loan.loan_date);
    assert_eq!(fetched.returned, loan.returned);
}

// ============================================================================
// 延滞
// ============================================================================

#[tokio::test]
async fn test_get_overdue_loans_threshold() {
    // Arrange
    let ctx = common::in_memory_context();
    let old_book = add_book(&ctx.deps, "old").await;
    let new_book = add_book(&ctx.deps, "new").await;
    let returned_book = add_book(&ctx.deps, "returned").await;

    let old = loan::create_loan(&ctx.deps, loan_cmd(&old_book, "Alice", days_ago(5)))
        .await
        .unwrap();
    loan::create_loan(&ctx.deps, loan_cmd(&new_book, "Bob", today()))
        .await
        .unwrap();
    let returned = loan::create_loan(&ctx.deps, loan_cmd(&returned_book, "Carol", days_ago(10)))
        .await
        .unwrap();
    loan::mark_returned(&ctx.deps, returned, true).await.unwrap();

    // Act
    let overdue = loan::get_overdue_loans(&ctx.deps, 3, today()).await.unwrap();

    // Assert
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].id, old.id);
}

#[tokio::test]
async fn test_get_overdue_loans_boundary_is_exclusive() {
    let ctx = common::in_memory_context();
    let book = add_book(&ctx.deps, "123456").await;
    loan::create_loan(&ctx.deps, loan_cmd(&book, "Alice", days_ago(4)))
        .await
        .unwrap();

    // 貸出日がちょうど境界日の場合は延滞ではない
    let on_boundary = loan::get_overdue_loans(&ctx.deps, 4, today()).await.unwrap();
    assert!(on_boundary.is_empty());

    let past_boundary = loan::get_overdue_loans(&ctx.deps, 3, today()).await.unwrap();
    assert_eq!(past_boundary.len(), 1);
}

#[tokio::test]
async fn test_get_overdue_loans_out_of_range_threshold() {
    let ctx = common::in_memory_context();
    let book = add_book(&ctx.deps, "123456").await;
    loan::create_loan(&ctx.deps, loan_cmd(&book, "Alice", days_ago(10)))
        .await
        .unwrap();

    let result = loan::get_overdue_loans(&ctx.deps, u32::MAX, today()).await;

    assert!(matches!(
        result,
        Err(ApplicationError::InvalidOverdueThreshold(u32::MAX))
    ));
}

// ============================================================================
// シナリオ
// ============================================================================

#[tokio::test]
async fn test_alice_bob_scenario() {
    let ctx = common::in_memory_context();
    add_book(&ctx.deps, "123456").await;

    // Alice borrows the book
    let book = loan::resolve_book_for_loan(&ctx.deps, "123456").await.unwrap();
    let alice = loan::create_loan(&ctx.deps, loan_cmd(&book, "Alice", today()))
        .await
        .unwrap();
    assert_eq!(alice.returned, Some(false));

    // Bob is rejected while Alice holds it
    let bob = loan::create_loan(&ctx.deps, loan_cmd(&book, "Bob", today())).await;
    assert!(matches!(bob, Err(ApplicationError::AlreadyLoaned)));

    // Alice returns it
    let alice = loan::get_loan(&ctx.deps, alice.id).await.unwrap();
    let alice = loan::mark_returned(&ctx.deps, alice, true).await.unwrap();
    assert_eq!(alice.returned, Some(true));

    // Bob can borrow now
    let bob = loan::create_loan(&ctx.deps, loan_cmd(&book, "Bob", today()))
        .await
        .unwrap();
    assert_eq!(bob.customer_name, "Bob");
    assert_eq!(open_loans_for(&ctx.deps, &book).await, 1);
}
