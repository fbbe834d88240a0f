use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::domain::{
    Book, BookFilter, Customer, Loan, LoanDetails, LoanFilter, PageRequest,
    commands::{RegisterBook, RegisterCustomer, UpdateBook},
    page::DEFAULT_PAGE_SIZE,
};

// ============================================================================
// Requests
// ============================================================================

/// 書籍登録リクエスト（POST /api/books）
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub author: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub isbn: String,
}

impl CreateBookRequest {
    pub fn to_command(self) -> RegisterBook {
        RegisterBook {
            title: self.title,
            author: self.author,
            isbn: self.isbn,
        }
    }
}

/// 書籍更新リクエスト（PUT /api/books/:id）
///
/// ISBNは更新できない。
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBookRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub author: String,
}

impl UpdateBookRequest {
    pub fn to_command(self) -> UpdateBook {
        UpdateBook {
            title: self.title,
            author: self.author,
        }
    }
}

/// 顧客登録リクエスト（POST /api/customers）
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub last_name: String,
    #[serde(default)]
    #[validate(
        length(min = 1, message = "must not be empty"),
        email(message = "must be a well-formed email address")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub cpf: String,
}

impl CreateCustomerRequest {
    pub fn to_command(self) -> RegisterCustomer {
        RegisterCustomer {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            cpf: self.cpf,
        }
    }
}

/// 貸出作成リクエスト（POST /api/loans）
///
/// 書籍はISBNで指定する。貸出日はサーバー側で当日に設定される。
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLoanRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub isbn: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub customer_name: String,
    #[serde(default)]
    #[validate(
        length(min = 1, message = "must not be empty"),
        email(message = "must be a well-formed email address")
    )]
    pub customer_email: String,
}

/// 返却フラグ更新リクエスト（PATCH /api/loans/:id）
#[derive(Debug, Deserialize, Validate)]
pub struct ReturnLoanRequest {
    #[validate(required(message = "must not be null"))]
    pub returned: Option<bool>,
}

/// 検証エラーを項目ごとのメッセージに変換する
///
/// `field: message`形式で、項目名の順に並べる。
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();
    messages.sort();
    messages.dedup();
    messages
}

// ============================================================================
// Queries
// ============================================================================

/// ページングのクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl PageQuery {
    pub fn to_page_request(&self) -> PageRequest {
        page_request(self.page, self.size)
    }
}

/// 書籍検索のクエリパラメータ（GET /api/books）
#[derive(Debug, Default, Deserialize)]
pub struct BookQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl BookQuery {
    pub fn to_filter(&self) -> BookFilter {
        BookFilter {
            title: non_blank(&self.title),
            author: non_blank(&self.author),
            isbn: non_blank(&self.isbn),
        }
    }

    pub fn to_page_request(&self) -> PageRequest {
        page_request(self.page, self.size)
    }
}

/// 貸出検索のクエリパラメータ（GET /api/loans）
#[derive(Debug, Default, Deserialize)]
pub struct LoanQuery {
    pub isbn: Option<String>,
    /// 顧客名（完全一致）
    pub customer: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl LoanQuery {
    pub fn to_filter(&self) -> LoanFilter {
        LoanFilter {
            isbn: non_blank(&self.isbn),
            customer_name: non_blank(&self.customer),
        }
    }

    pub fn to_page_request(&self) -> PageRequest {
        page_request(self.page, self.size)
    }
}

fn page_request(page: Option<u32>, size: Option<u32>) -> PageRequest {
    PageRequest::new(page.unwrap_or(0), size.unwrap_or(DEFAULT_PAGE_SIZE))
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Responses
// ============================================================================

/// 書籍レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.value(),
            title: book.title,
            author: book.author,
            isbn: book.isbn,
        }
    }
}

/// 顧客レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub cpf: String,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id.value(),
            first_name: customer.first_name,
            last_name: customer.last_name,
            email: customer.email,
            cpf: customer.cpf,
        }
    }
}

/// 貸出に埋め込まれる書籍の概要
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanBookSummary {
    pub id: Uuid,
    pub isbn: String,
    pub title: String,
    pub author: String,
}

/// 貸出レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanResponse {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub loan_date: NaiveDate,
    pub returned: Option<bool>,
    pub book: LoanBookSummary,
}

impl LoanResponse {
    pub fn new(loan: Loan, book: &Book) -> Self {
        Self::from(LoanDetails::new(loan, book))
    }
}

impl From<LoanDetails> for LoanResponse {
    fn from(details: LoanDetails) -> Self {
        let LoanDetails {
            loan,
            isbn,
            title,
            author,
        } = details;

        Self {
            id: loan.id.value(),
            customer_name: loan.customer_name,
            customer_email: loan.customer_email,
            loan_date: loan.loan_date,
            returned: loan.returned,
            book: LoanBookSummary {
                id: loan.book_id.value(),
                isbn,
                title,
                author,
            },
        }
    }
}

/// エラーレスポンス
///
/// 検証エラーは項目ごとに、ビジネスルール違反は1件のメッセージを返す。
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }

    pub fn from_messages(errors: Vec<String>) -> Self {
        Self { errors }
    }
}
