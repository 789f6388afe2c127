//! 手动召回
//!
//! 召回键边沿触发，仅在抑制门控 Inactive 时有效。未生成时忽略（记日志）。
//! 停留中先强制退出停留，再无条件传送到玩家身边；跟随冷却清零，传送冷却盖当前 tick，避免同 tick 自动回收重复触发。

use serde::Serialize;

use crate::behavior::{hold, Ports, TickContext};
use crate::core::{CompanionState, CooldownTimers, Vec3};
use crate::engine::EngineAdapter;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecallOutcome {
    #[default]
    NotRequested,
    Ignored,
    Recalled {
        exited_stay: bool,
    },
}

pub fn run<E: EngineAdapter + ?Sized>(
    ports: &mut Ports<'_, E>,
    ctx: &TickContext,
    pressed: bool,
    state: &mut CompanionState,
    timers: &mut CooldownTimers,
    offset: Vec3,
) -> RecallOutcome {
    if !pressed {
        return RecallOutcome::NotRequested;
    }

    if !state.spawned {
        ports
            .sink
            .write_line("[Recall] Ignored: companion not spawned.");
        return RecallOutcome::Ignored;
    }

    let exited_stay = state.stay_enabled || state.holding;
    if exited_stay {
        state.stay_enabled = false;
        if state.holding {
            hold::exit(ports, state, timers);
        }
        state.clear_anchor();
        ports.sink.write_line("[Recall] Exiting Stay -> Follow");
    }

    ports.engine.teleport_companion_near_player(offset);
    timers.reset_follow();
    timers.last_teleport = ctx.tick;

    ports
        .sink
        .write_line("[Recall] Teleported companion to player.");
    RecallOutcome::Recalled { exited_stay }
}
