//! Companion - 同伴行为协调器
//!
//! 每个宿主帧推进一次 tick，在抽象引擎之上驱动一个跟随玩家的同伴角色。
//!
//! 模块划分：
//! - **behavior**: 快照、任务门控、模式决策、同乘 / 停留 / 跟随、自动回收、手动召回、生命周期
//! - **config**: 配置加载（TOML + 环境变量）
//! - **core**: 状态、冷却、错误、协调器与关闭处理
//! - **engine**: 引擎适配器 trait、有界资源轮询、模拟引擎
//! - **input**: 按键码与边沿检测
//! - **observability**: tracing 初始化与日志落点

pub mod behavior;
pub mod config;
pub mod core;
pub mod engine;
pub mod input;
pub mod observability;

pub use crate::core::{Coordinator, TickReport};
pub use config::{load_config, CompanionConfig};
