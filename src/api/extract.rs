use axum::extract::{FromRequest, rejection::JsonRejection};

use super::error::ApiError;
use crate::application::ApplicationError;

/// JSONボディの抽出器
///
/// `axum::Json`と同じく本文を読み取るが、拒否時は`ApiError`として
/// 検証エラーと同じ`{"errors": [...]}`形式の400を返す。
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::from(ApplicationError::Validation(vec![rejection.body_text()]))
    }
}
