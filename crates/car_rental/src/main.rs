mod api;
mod auth;
mod cli;
mod config;
mod database;
mod error;
mod rental;
mod service;
mod task;
#[cfg(test)]
mod test_support;
mod utils;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::auth::SessionStore;
use crate::config::{Args, Command, MigrateAction, RentalPolicy, ServeArgs};
use crate::database::{migrate_database, setup_database, DatabaseLocation};
use crate::task::status_sweep_service;
use crate::utils::init_logger;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(&args.log_level);

    if let Err(e) = run(args).await {
        error!("程序异常退出: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let location = DatabaseLocation::from_args(&args);
    let policy = RentalPolicy::default();
    match args.command {
        Some(Command::Migrate { action }) => migrate_database(&location, action.unwrap_or(MigrateAction::Up)).await,
        Some(Command::CreateSuperuser(superuser_args)) => {
            let db = setup_database(&location).await?;
            let admin = cli::create_superuser_command(&db, &superuser_args, &policy).await?;
            println!("Superuser {} created", admin.email);
            Ok(())
        }
        Some(Command::Serve(serve_args)) => serve(&location, serve_args, policy).await,
        None => serve(&location, ServeArgs::default(), policy).await,
    }
}

async fn serve(location: &DatabaseLocation, args: ServeArgs, policy: RentalPolicy) -> Result<()> {
    let db = Arc::new(setup_database(location).await?);
    let sessions = SessionStore::new(chrono::Duration::hours(args.session_ttl_hours));
    let app = api::router(db.clone(), sessions.clone(), Arc::new(policy));

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("监听 {} 失败", args.bind))?;
    info!("接口服务已启动: http://{}", args.bind);
    info!("接口文档: http://{}/swagger-ui/", args.bind);

    let sweep = tokio::spawn(status_sweep_service(
        db,
        sessions,
        Duration::from_secs(args.status_interval_secs.max(1)),
    ));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("监听退出信号失败: {}", e);
            }
            info!("收到退出信号，正在停止服务");
        })
        .await
        .context("接口服务异常退出")?;
    sweep.abort();
    info!("服务已停止");
    Ok(())
}
