pub mod money;
pub mod time_format;
pub mod validation;

use std::fmt;
use std::fmt::Write as _;

use chrono::Local;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

// 控制台输出层：时间戳 + 彩色级别 + 消息 + 结构化字段
struct ConsoleLayer;

impl<S> Layer<S> for ConsoleLayer
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let level = event.metadata().level();

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let Some(message) = visitor.message else {
            return;
        };
        let timestamp = Local::now().format("%b %d %H:%M:%S");

        let (color_code, level_str) = match *level {
            tracing::Level::ERROR => ("\x1b[31m", "ERROR"),
            tracing::Level::WARN => ("\x1b[33m", " WARN"),
            tracing::Level::INFO => ("\x1b[32m", " INFO"),
            tracing::Level::DEBUG => ("\x1b[36m", "DEBUG"),
            tracing::Level::TRACE => ("\x1b[35m", "TRACE"),
        };

        println!(
            "\x1b[2m{}\x1b[0m {}{:>5}\x1b[0m {}{}",
            timestamp, color_code, level_str, message, visitor.fields
        );
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            let _ = write!(self.fields, " \x1b[2m{}\x1b[0m={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            let _ = write!(self.fields, " \x1b[2m{}\x1b[0m={}", field.name(), value);
        }
    }
}

pub fn init_logger(log_level: &str) {
    let console_layer = ConsoleLayer.with_filter(build_console_filter(log_level));

    // 测试中可能重复初始化，忽略错误
    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}

/// 构建控制台日志过滤器，降低 sqlx 等依赖的噪音
fn build_console_filter(base_level: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::builder().parse_lossy(format!(
        "{},\
            sqlx::query=error,\
            sqlx=error,\
            sea_orm::database=error,\
            sea_orm_migration=warn,\
            hyper=warn,\
            tower_http=info",
        base_level
    ))
}
