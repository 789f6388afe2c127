//! 可观测性：tracing 初始化与行为日志落点

pub mod sink;

pub use sink::{FileSink, LogSink, MemorySink, TracingSink};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 安装全局 subscriber；默认 info，可通过 RUST_LOG 覆盖
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}
