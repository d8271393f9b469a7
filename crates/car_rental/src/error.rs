use sea_orm::DbErr;
use thiserror::Error;

/// 业务层错误，API 层据此映射 HTTP 状态码
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i32 },
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        ServiceError::NotFound { entity, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
