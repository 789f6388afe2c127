//! 核心层：同伴状态、冷却、错误类型、协调器主循环与宿主关闭处理

pub mod cooldown;
pub mod error;
pub mod orchestrator;
pub mod shutdown;
pub mod state;

pub use cooldown::CooldownTimers;
pub use error::EngineError;
pub use orchestrator::{Coordinator, TickReport};
pub use shutdown::{ShutdownManager, ShutdownReason};
pub use state::{CompanionMode, CompanionState, StatusSnapshot, Vec3};
