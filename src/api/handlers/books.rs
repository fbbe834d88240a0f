use crate::application::{book, loan};
use crate::domain::{BookId, Page};
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
    types::{BookQuery, BookResponse, CreateBookRequest, LoanResponse, PageQuery, UpdateBookRequest},
};

// ============================================================================
// Command handlers
// ============================================================================

/// POST /api/books - 書籍を登録
///
/// 強制されるビジネスルール:
/// - ISBNが未登録であること
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    req.validate()?;

    let book = book::register_book(&state.service_deps, req.to_command()).await?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// PUT /api/books/:id - 書籍のタイトルと著者を更新
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
    ApiJson(req): ApiJson<UpdateBookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    req.validate()?;

    let existing = book::get_book(&state.service_deps, BookId::from_uuid(book_id)).await?;
    let updated = book::update_book(&state.service_deps, existing, req.to_command()).await?;

    Ok(Json(BookResponse::from(updated)))
}

/// DELETE /api/books/:id - 書籍を削除
///
/// 貸出履歴のある書籍は削除できない。
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let existing = book::get_book(&state.service_deps, BookId::from_uuid(book_id)).await?;
    book::delete_book(&state.service_deps, &existing).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Query handlers
// ============================================================================

/// GET /api/books/:id - 書籍をIDで取得
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<BookResponse>, ApiError> {
    let found = book::get_book(&state.service_deps, BookId::from_uuid(book_id)).await?;

    Ok(Json(BookResponse::from(found)))
}

/// GET /api/books - 書籍を検索
///
/// クエリパラメータ:
/// - title, author: 部分一致（大文字小文字を区別しない）
/// - isbn: 部分一致
/// - page, size: ページング
///
/// 指定された条件はすべて満たす必要がある（AND）。
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookQuery>,
) -> Result<Json<Page<BookResponse>>, ApiError> {
    let page = book::find_books(
        &state.service_deps,
        &query.to_filter(),
        query.to_page_request(),
    )
    .await?;

    Ok(Json(page.map(BookResponse::from)))
}

/// GET /api/books/:id/loans - 書籍の貸出履歴
pub async fn get_book_loans(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<LoanResponse>>, ApiError> {
    let found = book::get_book(&state.service_deps, BookId::from_uuid(book_id)).await?;
    let page =
        loan::get_loans_by_book(&state.service_deps, &found, query.to_page_request()).await?;

    Ok(Json(page.map(LoanResponse::from)))
}
