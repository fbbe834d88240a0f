use crate::domain::{BookId, Loan, LoanDetails, LoanFilter, LoanId, Page, PageRequest};
use crate::ports::loan_repository::{LoanInsert, LoanRepository as LoanRepositoryTrait, Result};
use async_trait::async_trait;

use super::map_unique_violation;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};

/// PostgreSQLの行データをLoanに変換する
fn map_row_to_loan(row: &PgRow) -> Loan {
    Loan {
        id: LoanId::from_uuid(row.get("id")),
        book_id: BookId::from_uuid(row.get("book_id")),
        customer_name: row.get("customer_name"),
        customer_email: row.get("customer_email"),
        loan_date: row.get("loan_date"),
        returned: row.get("returned"),
    }
}

/// 書籍と結合した行データをLoanDetailsに変換する
fn map_row_to_loan_details(row: &PgRow) -> LoanDetails {
    LoanDetails {
        loan: map_row_to_loan(row),
        isbn: row.get("isbn"),
        title: row.get("title"),
        author: row.get("author"),
    }
}

/// LoanRepositoryのPostgreSQL実装
///
/// 1冊につき未返却の貸出は1件までという制約は
/// 部分ユニークインデックス`loans_one_open_per_book`で保証する。
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    /// PostgreSQLコネクションプールから新しいLoanRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    async fn exists_open_loan_for_book(&self, book_id: BookId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM loans
                WHERE book_id = $1 AND returned IS NOT TRUE
            )
            "#,
        )
        .bind(book_id.value())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn exists_for_book(&self, book_id: BookId) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM loans WHERE book_id = $1)")
                .bind(book_id.value())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// 条件付きINSERT
    ///
    /// 部分ユニークインデックスと衝突した場合は何もしない。
    /// 影響行数0で貸出中と判定する。
    async fn insert_if_book_available(&self, loan: Loan) -> Result<LoanInsert> {
        let result = sqlx::query(
            r#"
            INSERT INTO loans (
                id,
                book_id,
                customer_name,
                customer_email,
                loan_date,
                returned
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (book_id) WHERE returned IS NOT TRUE
            DO NOTHING
            "#,
        )
        .bind(loan.id.value())
        .bind(loan.book_id.value())
        .bind(&loan.customer_name)
        .bind(&loan.customer_email)
        .bind(loan.loan_date)
        .bind(loan.returned)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(LoanInsert::BookAlreadyLoaned);
        }

        Ok(LoanInsert::Created(loan))
    }

    /// 貸出を保存（upsert）
    async fn save(&self, loan: Loan) -> Result<Loan> {
        sqlx::query(
            r#"
            INSERT INTO loans (
                id,
                book_id,
                customer_name,
                customer_email,
                loan_date,
                returned
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id)
            DO UPDATE SET
                book_id = EXCLUDED.book_id,
                customer_name = EXCLUDED.customer_name,
                customer_email = EXCLUDED.customer_email,
                loan_date = EXCLUDED.loan_date,
                returned = EXCLUDED.returned,
                updated_at = NOW()
            "#,
        )
        .bind(loan.id.value())
        .bind(loan.book_id.value())
        .bind(&loan.customer_name)
        .bind(&loan.customer_email)
        .bind(loan.loan_date)
        .bind(loan.returned)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(loan)
    }

    async fn find_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT id, book_id, customer_name, customer_email, loan_date, returned
            FROM loans
            WHERE id = $1
            "#,
        )
        .bind(loan_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_loan))
    }

    /// ISBNまたは顧客名で検索（OR）
    async fn find(&self, filter: &LoanFilter, page: PageRequest) -> Result<Page<LoanDetails>> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM loans l
            JOIN books b ON b.id = l.book_id
            WHERE ($1::text IS NULL AND $2::text IS NULL)
               OR b.isbn = $1
               OR l.customer_name = $2
            "#,
        )
        .bind(filter.isbn.as_deref())
        .bind(filter.customer_name.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(
            r#"
            SELECT
                l.id,
                l.book_id,
                l.customer_name,
                l.customer_email,
                l.loan_date,
                l.returned,
                b.isbn,
                b.title,
                b.author
            FROM loans l
            JOIN books b ON b.id = l.book_id
            WHERE ($1::text IS NULL AND $2::text IS NULL)
               OR b.isbn = $1
               OR l.customer_name = $2
            ORDER BY l.loan_date DESC, l.id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.isbn.as_deref())
        .bind(filter.customer_name.as_deref())
        .bind(i64::from(page.size()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let loans = rows.iter().map(map_row_to_loan_details).collect();
        Ok(Page::new(loans, page, total.max(0) as u64))
    }

    async fn find_by_book(
        &self,
        book_id: BookId,
        page: PageRequest,
    ) -> Result<Page<LoanDetails>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE book_id = $1")
            .bind(book_id.value())
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(
            r#"
            SELECT
                l.id,
                l.book_id,
                l.customer_name,
                l.customer_email,
                l.loan_date,
                l.returned,
                b.isbn,
                b.title,
                b.author
            FROM loans l
            JOIN books b ON b.id = l.book_id
            WHERE l.book_id = $1
            ORDER BY l.loan_date DESC, l.id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(book_id.value())
        .bind(i64::from(page.size()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let loans = rows.iter().map(map_row_to_loan_details).collect();
        Ok(Page::new(loans, page, total.max(0) as u64))
    }

    /// 延滞を検索（バッチ延滞通知用）
    ///
    /// 部分インデックス`idx_loans_open_loan_date`を使用する。
    async fn find_overdue(&self, cutoff: NaiveDate) -> Result<Vec<Loan>> {
        let rows = sqlx::query(
            r#"
            SELECT id, book_id, customer_name, customer_email, loan_date, returned
            FROM loans
            WHERE loan_date < $1 AND returned IS NOT TRUE
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_loan).collect())
    }
}
