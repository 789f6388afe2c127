//! 自动回收：距离过远时传送回玩家身边
//!
//! 条件：未停留、已生成、玩家不在车上。距离平方超过阈值平方且冷却已过时传送、盖冷却戳，并重置跟随冷却以立即重发。
//! 条件不满足时清零传送冷却戳。

use crate::behavior::{CommandBatch, Ports, TickContext};
use crate::config::RecoverySection;
use crate::core::{CompanionState, CooldownTimers};
use crate::engine::EngineAdapter;

/// 返回本 tick 是否执行了自动传送
pub fn run<E: EngineAdapter + ?Sized>(
    ports: &mut Ports<'_, E>,
    ctx: &TickContext,
    cmd: &CommandBatch,
    state: &CompanionState,
    timers: &mut CooldownTimers,
    cfg: &RecoverySection,
) -> bool {
    if cmd.requests_stay() || !state.spawned || ctx.player_in_vehicle {
        timers.last_teleport = 0;
        return false;
    }

    let companion = ports.engine.companion_position();
    let too_far = ctx.player_pos.distance_sq(companion) > cfg.teleport_distance_sq();
    let cooled = timers.since_teleport(ctx.tick) >= cfg.cooldown_ticks;

    if !(too_far && cooled) {
        return false;
    }

    ports.engine.teleport_companion_near_player(cfg.offset);
    timers.last_teleport = ctx.tick;
    timers.reset_follow();

    ports.sink.log(format_args!(
        "[Recovery] Auto-teleport: too far (>{:.1}m).",
        cfg.teleport_distance
    ));
    true
}
