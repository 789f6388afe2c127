//! 停留执行器（锚点）
//!
//! 停留请求的第一个 tick：捕获当前位置为锚点、清任务、冻结、重置跟随冷却。已在停留中再次进入不会重新捕获或重复冻结。
//! 停留期间每 `snap_ticks` 检查一次漂移，超过阈值就把同伴放回锚点。
//! 停留请求消失（或被同乘否决）时：解冻、清锚点、重置回正计时与跟随冷却。

use serde::Serialize;

use crate::behavior::{CommandBatch, Ports, TickContext};
use crate::config::StaySection;
use crate::core::{CompanionMode, CompanionState, CooldownTimers};
use crate::engine::EngineAdapter;

/// 本 tick 停留执行器做了什么
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldOutcome {
    #[default]
    Idle,
    Entered,
    Holding,
    Resnapped,
    Exited,
}

pub fn run<E: EngineAdapter + ?Sized>(
    ports: &mut Ports<'_, E>,
    ctx: &TickContext,
    cmd: &CommandBatch,
    state: &mut CompanionState,
    timers: &mut CooldownTimers,
    cfg: &StaySection,
) -> HoldOutcome {
    if cmd.requests_stay() && state.spawned {
        let mut outcome = HoldOutcome::Holding;

        if !state.holding {
            enter(ports, ctx, state, timers);
            outcome = HoldOutcome::Entered;
        }

        if let Some(anchor) = state.anchor() {
            if timers.since_resnap(ctx.tick) >= cfg.snap_ticks {
                let current = ports.engine.companion_position();
                if current.distance_sq(anchor) > cfg.drift_sq() {
                    ports.engine.set_companion_position(anchor);
                    outcome = HoldOutcome::Resnapped;
                }
                timers.last_resnap = ctx.tick;
            }
        }

        outcome
    } else if state.holding {
        exit(ports, state, timers);
        HoldOutcome::Exited
    } else {
        HoldOutcome::Idle
    }
}

fn enter<E: EngineAdapter + ?Sized>(
    ports: &mut Ports<'_, E>,
    ctx: &TickContext,
    state: &mut CompanionState,
    timers: &mut CooldownTimers,
) {
    let anchor = ports.engine.companion_position();
    state.set_anchor(anchor);
    timers.last_resnap = ctx.tick;

    ports.engine.clear_companion_tasks();
    ports.engine.freeze_companion(true);

    state.holding = true;
    state.mode = CompanionMode::Stay;

    // 退出停留时立即重发跟随
    timers.reset_follow();

    ports
        .sink
        .log(format_args!("[Stay] Stay ACTIVE anchor={}", anchor));
}

/// 退出停留（手动召回也会调用）
pub fn exit<E: EngineAdapter + ?Sized>(
    ports: &mut Ports<'_, E>,
    state: &mut CompanionState,
    timers: &mut CooldownTimers,
) {
    ports.engine.freeze_companion(false);

    state.holding = false;
    state.clear_anchor();
    state.mode = CompanionMode::Protection;
    timers.last_resnap = 0;
    timers.reset_follow();

    ports.sink.write_line("[Stay] Stay OFF");
}
