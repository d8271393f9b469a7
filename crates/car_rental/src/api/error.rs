use thiserror::Error;

/// 接口层自身的错误，业务错误见 [`crate::error::ServiceError`]
#[derive(Error, Debug)]
pub enum InnerApiError {
    #[error("Primary key not found: {0}")]
    NotFound(i32),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Authentication required")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
}
