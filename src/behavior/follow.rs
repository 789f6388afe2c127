//! 跟随执行器
//!
//! 只有在「请求跟随 + 已生成 + 未骑乘 + 玩家不在车上」时才运行，且距上次发出超过刷新间隔才重发，避免指令堆叠。
//! 条件不满足时把上次发出戳清零，下一个合法 tick 立即重发。

use crate::behavior::{CommandBatch, Ports, TickContext};
use crate::core::{CompanionState, CooldownTimers};
use crate::engine::EngineAdapter;

/// 返回本 tick 是否发出了跟随指令
pub fn run<E: EngineAdapter + ?Sized>(
    ports: &mut Ports<'_, E>,
    ctx: &TickContext,
    cmd: &CommandBatch,
    state: &CompanionState,
    timers: &mut CooldownTimers,
    default_refresh: u32,
) -> bool {
    let params = match cmd.follow() {
        Some(p) if state.spawned && !state.riding_vehicle && !ctx.player_in_vehicle => p,
        _ => {
            timers.reset_follow();
            return false;
        }
    };

    let refresh = if params.refresh_ticks > 0 {
        params.refresh_ticks
    } else {
        default_refresh
    };

    if timers.since_follow(ctx.tick) > refresh {
        ports.engine.task_follow_player(params.distance, params.speed);
        timers.last_follow = ctx.tick;
        true
    } else {
        false
    }
}
