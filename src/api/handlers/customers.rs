use crate::application::customer;
use crate::domain::CustomerId;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::AppState;
use crate::api::{
    error::ApiError,
    extract::ApiJson,
    types::{CreateCustomerRequest, CustomerResponse},
};

/// POST /api/customers - 顧客を登録
///
/// 強制されるビジネスルール:
/// - CPFが未登録であること
/// - メールアドレスが未登録であること
pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), ApiError> {
    req.validate()?;

    let registered = customer::register_customer(&state.service_deps, req.to_command()).await?;

    Ok((StatusCode::CREATED, Json(CustomerResponse::from(registered))))
}

/// GET /api/customers/:id - 顧客をIDで取得
pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let found =
        customer::get_customer(&state.service_deps, CustomerId::from_uuid(customer_id)).await?;

    Ok(Json(CustomerResponse::from(found)))
}

/// DELETE /api/customers/:id - 顧客を削除
pub async fn delete_customer(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let found =
        customer::get_customer(&state.service_deps, CustomerId::from_uuid(customer_id)).await?;
    customer::delete_customer(&state.service_deps, &found).await?;

    Ok(StatusCode::NO_CONTENT)
}
