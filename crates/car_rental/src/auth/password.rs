//! argon2id 密码哈希，存储为 PHC 字符串
//!
//! argon2 计算耗时，异步接口都放到阻塞线程池执行

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;
use tokio::task::{spawn_blocking, JoinError};

use crate::error::{ServiceError, ServiceResult};

fn join_error(e: JoinError) -> ServiceError {
    ServiceError::Internal(format!("密码计算任务失败: {e}"))
}

pub async fn hash_password(password: &str) -> ServiceResult<String> {
    let password = password.to_owned();
    spawn_blocking(move || hash_blocking(&password))
        .await
        .map_err(join_error)?
}

pub async fn verify_password(password: &str, hash: &str) -> ServiceResult<bool> {
    let (password, hash) = (password.to_owned(), hash.to_owned());
    spawn_blocking(move || verify_blocking(&password, &hash))
        .await
        .map_err(join_error)
}

pub(crate) fn hash_blocking(password: &str) -> ServiceResult<String> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| ServiceError::Internal(format!("生成盐值失败: {e}")))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::Internal(format!("密码哈希失败: {e}")))
}

/// 哈希格式无法解析时视为校验失败
fn verify_blocking(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            tracing::warn!("无法解析密码哈希: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("s3cret-pass").await.unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret-pass", &hash).await.unwrap());
        assert!(!verify_password("s3cret-pasS", &hash).await.unwrap());
        // 相同密码每次生成不同的盐
        assert_ne!(hash, hash_password("s3cret-pass").await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "plain-text").await.unwrap());
        assert!(!verify_password("", "").await.unwrap());
    }

    #[test]
    fn test_blocking_hash_matches_async_verify() {
        let hash = hash_blocking("s3cret-pass").unwrap();
        assert!(verify_blocking("s3cret-pass", &hash));
    }
}
