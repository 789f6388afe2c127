//! 行为层：传感器快照、任务门控、模式决策、同乘 / 停留 / 跟随执行器、自动回收、手动召回、生命周期
//!
//! 每个组件是一个接收 Ports（引擎 + 日志落点）与相关状态的函数或小状态机，由 core::Coordinator 按固定顺序调用。

pub mod decision;
pub mod follow;
pub mod hold;
pub mod lifecycle;
pub mod mission;
pub mod recall;
pub mod recovery;
pub mod ride;
pub mod snapshot;

pub use decision::{decide, CommandBatch, FollowParams, Intent};
pub use hold::HoldOutcome;
pub use lifecycle::LifecycleOutcome;
pub use mission::{GateEdge, GatePhase, MissionGate, MissionMemory};
pub use recall::RecallOutcome;
pub use ride::{RideOutcome, RideState};
pub use snapshot::TickContext;

use crate::engine::EngineAdapter;
use crate::observability::LogSink;

/// 单个 tick 内行为组件可用的外部端口
pub struct Ports<'a, E: EngineAdapter + ?Sized> {
    pub engine: &'a mut E,
    pub sink: &'a mut dyn LogSink,
}

impl<'a, E: EngineAdapter + ?Sized> Ports<'a, E> {
    pub fn new(engine: &'a mut E, sink: &'a mut dyn LogSink) -> Self {
        Self { engine, sink }
    }
}
