use std::sync::Arc;

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use axum::Extension;
use car_rental_entity::{client_profile, user};
use sea_orm::DatabaseConnection;
use tracing::debug;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::api::error::InnerApiError;
use crate::api::wrapper::ApiError;
use crate::auth::SessionStore;
use crate::error::ServiceError;
use crate::service::account::{self, Account};

/// 通过会话令牌认证的当前用户
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub account: Account,
    pub token: String,
}

impl CurrentUser {
    pub fn user(&self) -> &user::Model {
        &self.account.user
    }

    pub fn is_admin(&self) -> bool {
        self.account.is_admin()
    }

    pub fn require_admin(&self) -> Result<&user::Model, ApiError> {
        if self.is_admin() {
            Ok(&self.account.user)
        } else {
            Err(ServiceError::Forbidden("Administrator access required".to_string()).into())
        }
    }

    pub fn require_client(&self) -> Result<&client_profile::Model, ApiError> {
        self.account
            .client_profile()
            .ok_or_else(|| ServiceError::Forbidden("Client profile required".to_string()).into())
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| InnerApiError::Unauthorized.into())
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// 解析 Authorization 头并把当前用户放进请求扩展，是否必须登录由具体接口决定
pub async fn auth(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(sessions): Extension<SessionStore>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(token) = bearer_token(&headers) {
        match sessions.get(token) {
            Some(user_id) => match account::load_account(db.as_ref(), user_id).await {
                Ok(account) if account.user.is_active => {
                    request.extensions_mut().insert(CurrentUser {
                        account,
                        token: token.to_string(),
                    });
                }
                Ok(_) | Err(ServiceError::NotFound { .. }) => {
                    debug!("令牌对应的账号 {} 已停用或不存在", user_id);
                    sessions.revoke(token);
                }
                Err(e) => return Err(e.into()),
            },
            None => debug!("收到无效或已过期的令牌"),
        }
    }
    Ok(next.run(request).await)
}

pub(super) struct OpenAPIAuth;

impl utoipa::Modify for OpenAPIAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme("Token", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
        }
    }
}
