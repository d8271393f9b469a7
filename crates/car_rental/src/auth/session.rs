use std::sync::Arc;

use chrono::{DateTime, Duration, Local};
use dashmap::DashMap;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Session {
    user_id: i32,
    expires_at: DateTime<Local>,
}

/// 内存中的登录会话，token 为随机 UUID
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn issue(&self, user_id: i32) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            token.clone(),
            Session {
                user_id,
                expires_at: Local::now() + self.ttl,
            },
        );
        token
    }

    /// 返回 token 对应的用户，过期的会话顺带删除
    pub fn get(&self, token: &str) -> Option<i32> {
        let user_id = {
            let session = self.sessions.get(token)?;
            (session.expires_at > Local::now()).then_some(session.user_id)
        };
        if user_id.is_none() {
            self.sessions.remove(token);
        }
        user_id
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// 删除某个用户的全部会话，用于删除或停用账号
    pub fn revoke_user(&self, user_id: i32) {
        self.sessions.retain(|_, session| session.user_id != user_id);
    }

    pub fn purge_expired(&self) -> usize {
        let now = Local::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.expires_at > now);
        before - self.sessions.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::hours(24))
    }
}
