use anyhow::Error;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::api::error::InnerApiError;
use crate::error::ServiceError;

/// 统一的响应包装，status_code 与 HTTP 状态码一致
#[derive(ToSchema, Serialize)]
pub struct ApiResponse<T: Serialize> {
    status_code: u16,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { status_code: 200, data }
    }

    pub fn created(data: T) -> Self {
        Self { status_code: 201, data }
    }

    pub fn bad_request(data: T) -> Self {
        Self { status_code: 400, data }
    }

    pub fn unauthorized(data: T) -> Self {
        Self { status_code: 401, data }
    }

    pub fn forbidden(data: T) -> Self {
        Self { status_code: 403, data }
    }

    pub fn not_found(data: T) -> Self {
        Self { status_code: 404, data }
    }

    pub fn conflict(data: T) -> Self {
        Self { status_code: 409, data }
    }

    pub fn internal_server_error(data: T) -> Self {
        Self { status_code: 500, data }
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

pub struct ApiError(Error);

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(value: E) -> Self {
        Self(value.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let message = self.0.to_string();
        if let Some(service_error) = self.0.downcast_ref::<ServiceError>() {
            return match service_error {
                ServiceError::NotFound { .. } => ApiResponse::not_found(message).into_response(),
                ServiceError::Validation(_) => ApiResponse::bad_request(message).into_response(),
                ServiceError::Conflict(_) => ApiResponse::conflict(message).into_response(),
                ServiceError::Forbidden(_) => ApiResponse::forbidden(message).into_response(),
                ServiceError::Unauthorized(_) => ApiResponse::unauthorized(message).into_response(),
                ServiceError::Database(_) | ServiceError::Internal(_) => {
                    error!("请求处理失败: {:#}", self.0);
                    ApiResponse::internal_server_error(message).into_response()
                }
            };
        }
        if self.0.is::<JsonRejection>() || self.0.is::<QueryRejection>() || self.0.is::<PathRejection>() {
            return ApiResponse::bad_request(format!("Bad request: {message}")).into_response();
        }
        if let Some(inner_error) = self.0.downcast_ref::<InnerApiError>() {
            return match inner_error {
                InnerApiError::NotFound(_) => ApiResponse::not_found(message).into_response(),
                InnerApiError::BadRequest(_) => ApiResponse::bad_request(message).into_response(),
                InnerApiError::Unauthorized => ApiResponse::unauthorized(message).into_response(),
                InnerApiError::Forbidden(_) => ApiResponse::forbidden(message).into_response(),
            };
        }
        error!("未分类的接口错误: {:#}", self.0);
        ApiResponse::internal_server_error(message).into_response()
    }
}
