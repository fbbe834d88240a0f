use crate::domain::{
    self, Book, Loan, LoanDetails, LoanFilter, LoanId, Page, PageRequest, commands::CreateLoan,
};
use crate::ports::LoanInsert;
use chrono::NaiveDate;

use crate::application::{
    ServiceDependencies,
    errors::{ApplicationError, Result},
};

/// 貸出対象の書籍をISBNから解決する
///
/// # エラー
/// - BookNotFoundForIsbn: ISBNに一致する書籍がない（ビジネスルール違反として扱う）
pub async fn resolve_book_for_loan(deps: &ServiceDependencies, isbn: &str) -> Result<Book> {
    deps.book_repository
        .find_by_isbn(isbn)
        .await
        .map_err(ApplicationError::RepositoryError)?
        .ok_or(ApplicationError::BookNotFoundForIsbn)
}

/// 書籍を貸し出す（純粋な関数）
///
/// ビジネスルール：
/// - 書籍に未返却の貸出がないこと（返却フラグがfalseまたは未設定の貸出）
/// - 新しい貸出は返却フラグfalseで作成される
///
/// すべての依存が引数として明示的に渡される（関数型の原則）。
///
/// # 一貫性保証
///
/// 事前の存在確認で大半の重複を書き込みなしで弾き、
/// 最終的な判定はリポジトリの条件付きINSERTで不可分に行う。
/// 並行した呼び出しで確認をすり抜けた場合もAlreadyLoanedになる。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - 貸出コマンド
///
/// # 戻り値
/// 作成された貸出
pub async fn create_loan(deps: &ServiceDependencies, cmd: CreateLoan) -> Result<Loan> {
    // 1. 未返却の貸出の確認
    let already_loaned = deps
        .loan_repository
        .exists_open_loan_for_book(cmd.book_id)
        .await
        .map_err(ApplicationError::RepositoryError)?;

    if already_loaned {
        return Err(ApplicationError::AlreadyLoaned);
    }

    // 2. ドメイン層の純粋関数を呼び出し
    let loan = domain::loan::open_loan(
        cmd.book_id,
        cmd.customer_name,
        cmd.customer_email,
        cmd.loan_date,
    );

    // 3. 条件付きで保存
    let outcome = deps
        .loan_repository
        .insert_if_book_available(loan)
        .await
        .map_err(ApplicationError::RepositoryError)?;

    match outcome {
        LoanInsert::Created(loan) => {
            tracing::info!(loan_id = %loan.id, book_id = %loan.book_id, "Loan created");
            Ok(loan)
        }
        LoanInsert::BookAlreadyLoaned => {
            tracing::warn!(book_id = %cmd.book_id, "Concurrent loan creation rejected");
            Err(ApplicationError::AlreadyLoaned)
        }
    }
}

/// IDで貸出を取得する
pub async fn get_loan(deps: &ServiceDependencies, loan_id: LoanId) -> Result<Loan> {
    deps.loan_repository
        .find_by_id(loan_id)
        .await
        .map_err(ApplicationError::RepositoryError)?
        .ok_or(ApplicationError::LoanNotFound)
}

/// 返却フラグを更新する（純粋な関数）
///
/// 呼び出し側が`get_loan`で貸出を解決済みであること（存在確認は行わない）。
/// 指定された`returned`をそのまま保存する。
///
/// ビジネスルール：
/// - 返却済みの貸出を未返却に戻す場合、同じ書籍に他の未返却の貸出がないこと
pub async fn mark_returned(deps: &ServiceDependencies, loan: Loan, returned: bool) -> Result<Loan> {
    if !returned && !loan.is_open() {
        let other_open = deps
            .loan_repository
            .exists_open_loan_for_book(loan.book_id)
            .await
            .map_err(ApplicationError::RepositoryError)?;

        if other_open {
            return Err(ApplicationError::AlreadyLoaned);
        }
    }

    let updated = domain::loan::set_returned(loan, returned);

    let saved = deps
        .loan_repository
        .save(updated)
        .await
        .map_err(ApplicationError::from_repository)?;

    tracing::info!(loan_id = %saved.id, returned, "Loan return flag updated");

    Ok(saved)
}

/// ISBNまたは顧客名で貸出を検索する
///
/// 2つの条件は独立に評価され、どちらかに一致すれば結果に含まれる（OR）。
pub async fn find_loans(
    deps: &ServiceDependencies,
    filter: &LoanFilter,
    page: PageRequest,
) -> Result<Page<LoanDetails>> {
    deps.loan_repository
        .find(filter, page)
        .await
        .map_err(ApplicationError::RepositoryError)
}

/// 書籍の貸出履歴を取得する（返却済みを含む）
pub async fn get_loans_by_book(
    deps: &ServiceDependencies,
    book: &Book,
    page: PageRequest,
) -> Result<Page<LoanDetails>> {
    deps.loan_repository
        .find_by_book(book.id, page)
        .await
        .map_err(ApplicationError::RepositoryError)
}

/// 延滞している貸出を取得する
///
/// `today - threshold_days`より前に貸し出され、未返却の貸出を返す。
/// 内部のバッチ処理用で、ページングは行わない。
///
/// # エラー
/// - InvalidOverdueThreshold: 基準日が日付の表現範囲外
pub async fn get_overdue_loans(
    deps: &ServiceDependencies,
    threshold_days: u32,
    today: NaiveDate,
) -> Result<Vec<Loan>> {
    let cutoff = domain::loan::overdue_cutoff(today, threshold_days)
        .ok_or(ApplicationError::InvalidOverdueThreshold(threshold_days))?;

    deps.loan_repository
        .find_overdue(cutoff)
        .await
        .map_err(ApplicationError::RepositoryError)
}
