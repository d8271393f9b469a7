use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;

/// 默认配置目录，可通过 `--config-dir` 或 `CAR_RENTAL_CONFIG_DIR` 覆盖
pub static CONFIG_DIR: Lazy<PathBuf> = Lazy::new(|| {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("car-rental")
});

#[derive(Parser, Debug)]
#[command(name = "car-rental", version, about = "Car rental service")]
pub struct Args {
    /// Directory holding the sqlite database
    #[arg(long, env = "CAR_RENTAL_CONFIG_DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Full database url, overrides the sqlite file under --config-dir
    #[arg(long, env = "CAR_RENTAL_DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    #[arg(long, env = "CAR_RENTAL_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply, roll back or inspect schema migrations
    Migrate {
        #[command(subcommand)]
        action: Option<MigrateAction>,
    },
    /// Create an administrator account
    CreateSuperuser(CreateSuperuserArgs),
    /// Start the HTTP API server
    Serve(ServeArgs),
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Roll back the most recent migration
    Down,
    /// List applied and pending migrations
    Status,
}

#[derive(clap::Args, Debug, Default)]
pub struct CreateSuperuserArgs {
    #[arg(long)]
    pub email: Option<String>,

    /// Prefer the interactive prompt, command line arguments end up in shell history
    #[arg(long, env = "CAR_RENTAL_SUPERUSER_PASSWORD")]
    pub password: Option<String>,

    /// Fail instead of prompting for missing values
    #[arg(long)]
    pub no_input: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "CAR_RENTAL_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Period of the pending/overdue status sweep
    #[arg(long, default_value_t = 300)]
    pub status_interval_secs: u64,

    #[arg(long, default_value_t = 24)]
    pub session_ttl_hours: i64,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            status_interval_secs: 300,
            session_ttl_hours: 24,
        }
    }
}

impl Args {
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone().unwrap_or_else(|| CONFIG_DIR.clone())
    }
}

/// 业务规则常量
#[derive(Debug, Clone)]
pub struct RentalPolicy {
    /// 押金占预估租金的比例
    pub deposit_rate: Decimal,
    pub late_fine_per_day: Decimal,
    pub max_rental_days: i64,
    pub default_strategy: String,
    pub occupancy_window_days: i64,
    pub top_cars_limit: u64,
    pub min_password_len: usize,
}

impl Default for RentalPolicy {
    fn default() -> Self {
        Self {
            deposit_rate: Decimal::new(3, 1),
            late_fine_per_day: Decimal::new(50000, 2),
            max_rental_days: 365,
            default_strategy: "combined".to_string(),
            occupancy_window_days: 90,
            top_cars_limit: 5,
            min_password_len: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_defaults() {
        let args = Args::try_parse_from(["car-rental", "serve"]).unwrap();
        let Some(Command::Serve(serve)) = args.command else {
            panic!("expected serve command");
        };
        assert_eq!(serve.bind.port(), 8000);
        assert_eq!(serve.status_interval_secs, 300);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_parse_create_superuser_flags() {
        let args = Args::try_parse_from([
            "car-rental",
            "--config-dir",
            "/tmp/rental",
            "create-superuser",
            "--email",
            "admin@example.com",
            "--no-input",
        ])
        .unwrap();
        assert_eq!(args.config_dir(), PathBuf::from("/tmp/rental"));
        let Some(Command::CreateSuperuser(cmd)) = args.command else {
            panic!("expected create-superuser command");
        };
        assert_eq!(cmd.email.as_deref(), Some("admin@example.com"));
        assert!(cmd.no_input);
    }

    #[test]
    fn test_migrate_action_is_optional() {
        let args = Args::try_parse_from(["car-rental", "migrate"]).unwrap();
        assert!(matches!(args.command, Some(Command::Migrate { action: None })));
        let args = Args::try_parse_from(["car-rental", "migrate", "status"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Command::Migrate {
                action: Some(MigrateAction::Status)
            })
        ));
    }
}
