//! 模式决策：(TickContext, CompanionState) → CommandBatch
//!
//! 纯函数，不修改状态。跟随与停留用同一个 Option<Intent> 表达，同一批次里不可能同时出现。

use serde::Serialize;

use crate::behavior::TickContext;
use crate::config::{FollowSection, LoggingSection};
use crate::core::CompanionState;

/// 跟随指令参数
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FollowParams {
    pub distance: f32,
    pub speed: f32,
    pub refresh_ticks: u32,
}

impl From<&FollowSection> for FollowParams {
    fn from(cfg: &FollowSection) -> Self {
        Self {
            distance: cfg.distance,
            speed: cfg.speed,
            refresh_ticks: cfg.refresh_ticks,
        }
    }
}

/// 行为意图：跟随或停留（互斥）
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    Follow(FollowParams),
    Stay,
}

/// 本 tick 的命令批次，tick 结束即丢弃
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct CommandBatch {
    pub request_log: bool,
    pub request_spawn: bool,
    pub request_despawn: bool,
    pub intent: Option<Intent>,
}

impl CommandBatch {
    pub fn requests_stay(&self) -> bool {
        matches!(self.intent, Some(Intent::Stay))
    }

    pub fn follow(&self) -> Option<FollowParams> {
        match self.intent {
            Some(Intent::Follow(p)) => Some(p),
            _ => None,
        }
    }

    pub fn requests_follow(&self) -> bool {
        self.follow().is_some()
    }
}

/// 决策
pub fn decide(
    ctx: &TickContext,
    state: &CompanionState,
    follow: &FollowSection,
    logging: &LoggingSection,
) -> CommandBatch {
    let mut out = CommandBatch {
        request_log: logging.log_interval_ticks > 0 && ctx.tick % logging.log_interval_ticks == 0,
        ..CommandBatch::default()
    };

    if state.spawned && ctx.player_alive() {
        out.intent = Some(if state.stay_enabled {
            Intent::Stay
        } else {
            Intent::Follow(FollowParams::from(follow))
        });
    }

    out
}
