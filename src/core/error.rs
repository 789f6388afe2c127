//! 引擎调用错误
//!
//! 只覆盖「可能失败的执行器调用」（生成、上车）。查询类调用对不存在的实体返回中性默认值，不产生错误。
//! 协调器在调用点吸收所有错误：记日志、不改状态、不自动重试。

use thiserror::Error;

use crate::engine::Seat;

/// 执行器调用失败（资源加载超时、实体不存在、座位被占等）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// 模型资源在轮询上限内未就绪
    #[error("Asset not ready after {attempts} poll attempts")]
    AssetTimeout { attempts: u32 },

    #[error("Companion does not exist")]
    CompanionMissing,

    #[error("Companion already spawned")]
    AlreadySpawned,

    #[error("Vehicle seat {seat:?} is occupied")]
    SeatOccupied { seat: Seat },

    #[error("Vehicle not found")]
    VehicleMissing,
}
