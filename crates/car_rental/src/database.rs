use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use car_rental_migration::{Migrator, MigratorTrait};
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sea_orm::sqlx::Executor;
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, SqlxSqliteConnector, TransactionTrait};
use tracing::{debug, info};

use crate::config::{Args, MigrateAction};

/// 数据库位置：显式 url 优先，否则使用配置目录下的 data.sqlite
#[derive(Debug, Clone)]
pub enum DatabaseLocation {
    Url(String),
    File(PathBuf),
}

impl DatabaseLocation {
    pub fn from_args(args: &Args) -> Self {
        match &args.database_url {
            Some(url) => DatabaseLocation::Url(url.clone()),
            None => DatabaseLocation::File(args.config_dir().join("data.sqlite")),
        }
    }

    fn connect_options(&self) -> Result<SqliteConnectOptions> {
        let options = match self {
            DatabaseLocation::Url(url) => {
                SqliteConnectOptions::from_str(url).with_context(|| format!("无效的数据库地址: {url}"))?
            }
            DatabaseLocation::File(path) => {
                ensure_parent_dir(path)?;
                SqliteConnectOptions::new().filename(path)
            }
        };
        Ok(options
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30))
            .pragma("cache_size", "-16384")
            .pragma("temp_store", "MEMORY"))
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).with_context(|| format!("创建配置目录失败: {}", parent.display()))?;
        }
    }
    Ok(())
}

pub async fn database_connection(location: &DatabaseLocation) -> Result<DatabaseConnection> {
    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                // 每个新连接都重新执行，保证外键约束生效
                conn.execute("PRAGMA foreign_keys = ON;").await?;
                Ok(())
            })
        })
        .connect_with(location.connect_options()?)
        .await
        .context("创建数据库连接池失败")?;

    debug!("SQLite 连接池已创建: {:?}", location);
    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// 执行迁移操作，使用单连接池避免迁移顺序问题
pub async fn migrate_database(location: &DatabaseLocation, action: MigrateAction) -> Result<()> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(location.connect_options()?)
        .await
        .context("创建迁移连接失败")?;
    let connection = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone());

    match action {
        MigrateAction::Up => {
            let pending = Migrator::get_pending_migrations(&connection).await?.len();
            Migrator::up(&connection, None).await.context("应用迁移失败")?;
            info!("迁移完成，本次应用 {} 个迁移", pending);
        }
        MigrateAction::Down => {
            Migrator::down(&connection, Some(1)).await.context("回滚迁移失败")?;
            info!("已回滚最近一次迁移");
        }
        MigrateAction::Status => {
            Migrator::status(&connection).await?;
        }
    }

    pool.close().await;
    debug!("已关闭迁移连接池");
    Ok(())
}

/// 应用全部迁移并返回连接池，供 serve 和 create-superuser 使用
pub async fn setup_database(location: &DatabaseLocation) -> Result<DatabaseConnection> {
    migrate_database(location, MigrateAction::Up).await?;
    database_connection(location).await
}

/// 开始一个事务并立即获取写锁
/// 通过更新锁定表强制升级为写事务，先查后写的流程（如检查车辆档期）因此串行执行
pub async fn begin_write_transaction(connection: &DatabaseConnection) -> Result<DatabaseTransaction, DbErr> {
    connection
        .execute_unprepared("CREATE TABLE IF NOT EXISTS _write_lock (id INTEGER PRIMARY KEY, ts INTEGER)")
        .await?;
    connection
        .execute_unprepared("INSERT OR IGNORE INTO _write_lock (id, ts) VALUES (1, 0)")
        .await?;

    let txn = connection.begin().await?;
    txn.execute_unprepared("UPDATE _write_lock SET ts = strftime('%s', 'now') WHERE id = 1")
        .await?;
    Ok(txn)
}

/// 内存数据库，单连接保证所有查询看到同一个库
#[cfg(test)]
pub async fn memory_database() -> DatabaseConnection {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("内存数据库地址")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("创建内存数据库失败");
    let connection = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
    Migrator::up(&connection, None).await.expect("内存数据库迁移失败");
    connection
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, Statement};

    #[tokio::test]
    async fn test_memory_database_has_all_tables() {
        let db = memory_database().await;
        let backend = db.get_database_backend();
        for table in ["user", "client_profile", "car_type", "car", "rental", "fine", "payment"] {
            let row = db
                .query_one(Statement::from_string(
                    backend,
                    format!("SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = '{table}'"),
                ))
                .await
                .unwrap()
                .unwrap();
            let count: i32 = row.try_get("", "n").unwrap();
            assert_eq!(count, 1, "missing table {table}");
        }
    }

    #[tokio::test]
    async fn test_file_database_migrates_into_new_directory() {
        let dir = std::env::temp_dir().join(format!("car-rental-db-{}", uuid::Uuid::new_v4()));
        let location = DatabaseLocation::File(dir.join("nested").join("data.sqlite"));
        let db = setup_database(&location).await.unwrap();
        let pending = Migrator::get_pending_migrations(&db).await.unwrap();
        assert!(pending.is_empty());
        drop(db);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
