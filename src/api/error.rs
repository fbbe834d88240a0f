use crate::application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use validator::ValidationErrors;

use super::types::{ErrorResponse, validation_messages};

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(ApplicationError);

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        ApiError(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError(ApplicationError::Validation(validation_messages(&errors)))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ApplicationError::Validation(_) => StatusCode::BAD_REQUEST,
            e if e.is_business_rule_violation() => StatusCode::BAD_REQUEST,
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self.0 {
            // 400 Bad Request - 項目ごとの検証エラー
            ApplicationError::Validation(messages) => ErrorResponse::from_messages(messages),

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ApplicationError::RepositoryError(ref e) => {
                tracing::error!("Repository error: {}", e);
                ErrorResponse::new("Internal server error")
            }
            ApplicationError::NotificationError(ref e) => {
                tracing::error!("Notification error: {}", e);
                ErrorResponse::new("Internal server error")
            }

            // 400 ビジネスルール違反 / 404 Not Found
            other => ErrorResponse::new(other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
