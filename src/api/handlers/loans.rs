use crate::application::{book, loan};
use crate::domain::{LoanId, Page, commands::CreateLoan};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::AppState;
use crate::api::{
    error::ApiError,
    extract::ApiJson,
    types::{CreateLoanRequest, LoanQuery, LoanResponse, ReturnLoanRequest},
};

// ============================================================================
// Command handlers
// ============================================================================

/// POST /api/loans - 新しい貸出を作成
///
/// ISBNで書籍を解決し、当日付で貸し出す。
///
/// 強制されるビジネスルール:
/// - ISBNに一致する書籍が存在すること
/// - 書籍に未返却の貸出がないこと
pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateLoanRequest>,
) -> Result<(StatusCode, Json<LoanResponse>), ApiError> {
    req.validate()?;

    let book = loan::resolve_book_for_loan(&state.service_deps, &req.isbn).await?;

    let cmd = CreateLoan {
        book_id: book.id,
        customer_name: req.customer_name,
        customer_email: req.customer_email,
        loan_date: chrono::Utc::now().date_naive(),
    };

    let created = loan::create_loan(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(LoanResponse::new(created, &book))))
}

/// PATCH /api/loans/:id - 返却フラグを更新
///
/// `returned: false`で返却済みの貸出を戻す場合、同じ書籍に他の未返却の貸出がないこと。
pub async fn update_loan_returned(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
    ApiJson(req): ApiJson<ReturnLoanRequest>,
) -> Result<Json<LoanResponse>, ApiError> {
    req.validate()?;

    let existing = loan::get_loan(&state.service_deps, LoanId::from_uuid(loan_id)).await?;
    let returned = matches!(req.returned, Some(true));
    let updated = loan::mark_returned(&state.service_deps, existing, returned).await?;
    let book = book::get_book(&state.service_deps, updated.book_id).await?;

    Ok(Json(LoanResponse::new(updated, &book)))
}

// ============================================================================
// Query handlers
// ============================================================================

/// GET /api/loans/:id - 貸出詳細をIDで取得
pub async fn get_loan(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
) -> Result<Json<LoanResponse>, ApiError> {
    let found = loan::get_loan(&state.service_deps, LoanId::from_uuid(loan_id)).await?;
    let book = book::get_book(&state.service_deps, found.book_id).await?;

    Ok(Json(LoanResponse::new(found, &book)))
}

/// GET /api/loans - 貸出を検索
///
/// クエリパラメータ:
/// - isbn: 書籍のISBN（完全一致）
/// - customer: 顧客名（完全一致）
/// - page, size: ページング
///
/// 両方指定された場合はどちらかに一致すれば結果に含まれる（OR）。
/// どちらも指定されない場合は全件を返す。
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoanQuery>,
) -> Result<Json<Page<LoanResponse>>, ApiError> {
    let page = loan::find_loans(
        &state.service_deps,
        &query.to_filter(),
        query.to_page_request(),
    )
    .await?;

    Ok(Json(page.map(LoanResponse::from)))
}
