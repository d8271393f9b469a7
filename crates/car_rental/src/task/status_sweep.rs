use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::auth::SessionStore;
use crate::service::rental::update_overdue_rentals;
use crate::utils::time_format::today;

/// 执行一轮状态刷新：pending 到期转 active，active 超期转 overdue，并清理过期会话
pub async fn sweep_once(db: &DatabaseConnection, sessions: &SessionStore, today: NaiveDate) -> Result<u64> {
    let updated = update_overdue_rentals(db, today).await?;
    let purged = sessions.purge_expired();
    if updated > 0 {
        info!("租赁状态刷新完成，更新 {} 条记录", updated);
    }
    if purged > 0 {
        debug!("清理过期会话 {} 个", purged);
    }
    Ok(updated)
}

/// 定时刷新租赁状态，main 在接口服务退出后 abort 该任务
pub async fn status_sweep_service(db: Arc<DatabaseConnection>, sessions: SessionStore, period: Duration) {
    info!("启动租赁状态刷新任务，间隔 {} 秒", period.as_secs());
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        if let Err(e) = sweep_once(&db, &sessions, today()).await {
            error!("租赁状态刷新失败: {:#}", e);
        }
    }
}
