use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Book, BookId, LoanId};

/// Loan集約 - 1冊の書籍の1回の貸出
///
/// 書籍はIDで参照するのみ（所有しない）。
/// 顧客は貸出時点の氏名とメールアドレスを保持する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    // 識別子
    pub id: LoanId,

    // 他の集約への参照（IDのみ）
    pub book_id: BookId,

    // 借り手
    pub customer_name: String,
    pub customer_email: String,

    // 貸出管理の責務
    pub loan_date: NaiveDate,
    /// 返却フラグ
    ///
    /// `None`（未設定）と`Some(false)`はどちらも未返却として扱う。
    pub returned: Option<bool>,
}

impl Loan {
    /// 未返却の貸出か
    pub fn is_open(&self) -> bool {
        !self.returned.unwrap_or(false)
    }

    /// 延滞しているか
    ///
    /// 未返却かつ貸出日がcutoffより前の場合に延滞とする。
    pub fn is_overdue(&self, cutoff: NaiveDate) -> bool {
        self.is_open() && self.loan_date < cutoff
    }
}

/// 貸出とその書籍情報（一覧表示用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanDetails {
    pub loan: Loan,
    pub isbn: String,
    pub title: String,
    pub author: String,
}

impl LoanDetails {
    pub fn new(loan: Loan, book: &Book) -> Self {
        Self {
            loan,
            isbn: book.isbn.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
        }
    }
}

/// 貸出検索条件
///
/// ISBNと顧客名は独立に評価し、どちらかが一致すれば対象とする（OR）。
/// 両方未指定の場合はすべての貸出が対象。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanFilter {
    pub isbn: Option<String>,
    pub customer_name: Option<String>,
}

impl LoanFilter {
    pub fn is_empty(&self) -> bool {
        self.isbn.is_none() && self.customer_name.is_none()
    }

    pub fn matches(&self, details: &LoanDetails) -> bool {
        if self.is_empty() {
            return true;
        }

        let isbn_matches = self.isbn.as_deref() == Some(details.isbn.as_str());
        let customer_matches =
            self.customer_name.as_deref() == Some(details.loan.customer_name.as_str());

        isbn_matches || customer_matches
    }
}

/// 純粋関数：書籍を貸し出す
///
/// ビジネスルール：
/// - 返却フラグはfalseで開始
/// - 1冊につき未返却の貸出は1件まで（アプリケーション層と永続化層で保証）
///
/// 副作用なし。新しいLoanを返す。
pub fn open_loan(
    book_id: BookId,
    customer_name: String,
    customer_email: String,
    loan_date: NaiveDate,
) -> Loan {
    Loan {
        id: LoanId::new(),
        book_id,
        customer_name,
        customer_email,
        loan_date,
        returned: Some(false),
    }
}

/// 純粋関数：返却フラグを設定する
///
/// 呼び出し側が指定した値をそのまま反映する。
pub fn set_returned(loan: Loan, returned: bool) -> Loan {
    Loan {
        returned: Some(returned),
        ..loan
    }
}

/// 延滞判定の基準日を求める
///
/// `today - threshold_days`より前に貸し出された未返却の貸出が延滞。
/// 基準日が日付の表現範囲外になる場合は`None`。
pub fn overdue_cutoff(today: NaiveDate, threshold_days: u32) -> Option<NaiveDate> {
    today.checked_sub_days(Days::new(u64::from(threshold_days)))
}
