//! 协调器：单个同伴的 tick 主循环
//!
//! 持有全部跨 tick 状态（CompanionState、冷却、同乘、任务门控、按键边沿表）与注入的日志落点。
//! 每个宿主帧调用一次 `tick`，顺序固定：
//! 任务门控 → 停留开关 → 快照 → 决策 → 同乘 → 停留 → 跟随 → 周期日志 → 自动回收 → 生命周期 → 状态行 → 手动召回 → 心跳。
//! 单线程、无并发；多线程宿主需要自行串行化 tick（例如 Mutex<Coordinator>）。

use serde::Serialize;

use crate::behavior::{
    decide, follow, hold, lifecycle, recall, recovery, ride, CommandBatch, GateEdge, HoldOutcome,
    LifecycleOutcome, MissionGate, Ports, RecallOutcome, RideOutcome, RideState, TickContext,
};
use crate::config::CompanionConfig;
use crate::core::{CompanionState, CooldownTimers, StatusSnapshot};
use crate::engine::EngineAdapter;
use crate::input::{InputEdges, KeyEdgeTable};
use crate::observability::LogSink;

/// 单个 tick 的执行报告
#[derive(Clone, Debug, Default, Serialize)]
pub struct TickReport {
    pub tick: u32,
    pub suppressed: bool,
    pub gate: Option<GateEdge>,
    pub input: InputEdges,
    pub commands: CommandBatch,
    pub ride: RideOutcome,
    pub hold: HoldOutcome,
    pub follow_issued: bool,
    pub auto_teleported: bool,
    pub lifecycle: Vec<LifecycleOutcome>,
    pub recall: RecallOutcome,
    /// tick 结束时停留执行器是否激活
    pub holding: bool,
    /// tick 结束时是否骑乘
    pub riding: bool,
}

/// 同伴行为协调器
pub struct Coordinator {
    config: CompanionConfig,
    state: CompanionState,
    timers: CooldownTimers,
    ride: RideState,
    gate: MissionGate,
    keys: KeyEdgeTable,
    tick: u32,
    sink: Box<dyn LogSink>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("tick", &self.tick)
            .field("state", &self.state)
            .field("timers", &self.timers)
            .field("ride", &self.ride)
            .field("gate", &self.gate)
            .field("sink", &"Box<dyn LogSink>")
            .finish()
    }
}

impl Coordinator {
    /// 创建协调器（宿主加载钩子）；全部状态取默认值
    pub fn new(config: CompanionConfig, mut sink: Box<dyn LogSink>) -> Self {
        sink.write_line("=== Companion coordinator loaded ===");
        Self {
            config,
            state: CompanionState::new(),
            timers: CooldownTimers::new(),
            ride: RideState::new(),
            gate: MissionGate::new(),
            keys: KeyEdgeTable::new(),
            tick: 0,
            sink,
        }
    }

    pub fn config(&self) -> &CompanionConfig {
        &self.config
    }

    pub fn state(&self) -> &CompanionState {
        &self.state
    }

    pub fn timers(&self) -> &CooldownTimers {
        &self.timers
    }

    pub fn ride(&self) -> &RideState {
        &self.ride
    }

    pub fn gate(&self) -> &MissionGate {
        &self.gate
    }

    pub fn current_tick(&self) -> u32 {
        self.tick
    }

    pub fn status(&self) -> StatusSnapshot {
        self.state.project(self.tick, self.gate.is_active())
    }

    /// 推进一个 tick
    pub fn tick<E: EngineAdapter + ?Sized>(&mut self, engine: &mut E) -> TickReport {
        self.tick = self.tick.wrapping_add(1);
        let tick = self.tick;
        let cfg = &self.config;
        let mut ports = Ports::new(engine, self.sink.as_mut());
        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };

        // --- 任务门控 ---
        let suppressed = ports.engine.is_mission_active();
        report.gate = self.gate.update(
            &mut ports,
            suppressed,
            &mut self.state,
            &mut self.ride,
            &mut self.timers,
        );
        report.input = self.keys.poll(&*ports.engine, &cfg.keys);

        if self.gate.is_active() {
            report.suppressed = true;
            draw_status(&mut ports, cfg.host.show_status, &self.state.project(tick, true));
            heartbeat(ports.sink, tick, cfg.logging.heartbeat_ticks);
            return report;
        }

        // --- 停留开关 ---
        if report.input.stay_toggle {
            self.state.stay_enabled = !self.state.stay_enabled;
            ports.sink.log(format_args!(
                "[Input] Stay toggled: {}",
                if self.state.stay_enabled { "ON" } else { "OFF" }
            ));
            if !self.state.stay_enabled {
                self.timers.reset_follow();
            }
        }

        // --- 快照与决策 ---
        let ctx = TickContext::capture(&*ports.engine, tick, cfg.host.delta_seconds());
        self.state.spawned = ports.engine.companion_exists();
        let cmd = decide(&ctx, &self.state, &cfg.follow, &cfg.logging);
        report.commands = cmd;

        // --- 执行（同乘可否决停留 / 跟随） ---
        report.ride = ride::run(
            &mut ports,
            &ctx,
            &cmd,
            &mut self.state,
            &mut self.ride,
            &mut self.timers,
            cfg.recovery.offset,
        );
        report.hold = hold::run(&mut ports, &ctx, &cmd, &mut self.state, &mut self.timers, &cfg.stay);
        report.follow_issued = follow::run(
            &mut ports,
            &ctx,
            &cmd,
            &self.state,
            &mut self.timers,
            cfg.follow.refresh_ticks,
        );

        if cmd.request_log {
            ports.sink.log(format_args!(
                "[Core] tick={} exists={} dead={} inVeh={} pos={}",
                ctx.tick,
                ctx.player_exists as u8,
                ctx.player_dead as u8,
                ctx.player_in_vehicle as u8,
                ctx.player_pos
            ));
        }

        report.auto_teleported = recovery::run(
            &mut ports,
            &ctx,
            &cmd,
            &self.state,
            &mut self.timers,
            &cfg.recovery,
        );

        report.lifecycle = lifecycle::run(&mut ports, report.input.spawn_toggle, &cmd, &mut self.state);

        draw_status(&mut ports, cfg.host.show_status, &self.state.project(tick, false));

        report.recall = recall::run(
            &mut ports,
            &ctx,
            report.input.recall,
            &mut self.state,
            &mut self.timers,
            cfg.recovery.offset,
        );

        heartbeat(ports.sink, tick, cfg.logging.heartbeat_ticks);

        report.holding = self.state.holding;
        report.riding = self.ride.riding;
        report
    }

    /// 关闭日志落点（宿主卸载钩子）
    pub fn shutdown(mut self) -> StatusSnapshot {
        let status = self.status();
        self.sink.write_line("=== Companion coordinator unloaded ===");
        self.sink.close();
        status
    }
}

fn draw_status<E: EngineAdapter + ?Sized>(ports: &mut Ports<'_, E>, show: bool, status: &StatusSnapshot) {
    if show {
        ports.engine.draw_text(&status.status_line(), 0.01, 0.01);
    }
}

/// 心跳与任务门控无关，挂起期间照常输出
fn heartbeat(sink: &mut dyn LogSink, tick: u32, interval: u32) {
    if interval > 0 && tick % interval == 0 {
        sink.log(format_args!("Heartbeat - tick {}", tick));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Vec3;
    use crate::engine::{EngineCall, SimulatedEngine};
    use crate::input::KeyCode;
    use crate::observability::MemorySink;

    fn coordinator() -> (Coordinator, MemorySink) {
        let sink = MemorySink::new();
        let coordinator = Coordinator::new(CompanionConfig::default(), Box::new(sink.clone()));
        (coordinator, sink)
    }

    #[test]
    fn test_spawned_mirrors_world() {
        let (mut c, _) = coordinator();
        let mut engine = SimulatedEngine::new();
        engine.place_companion(Vec3::ZERO);

        c.tick(&mut engine);
        assert!(c.state().spawned);

        // 同伴在世界中消失
        engine.companion = None;
        c.tick(&mut engine);
        assert!(!c.state().spawned);
    }

    #[test]
    fn test_stay_toggle_enters_and_leaves_hold() {
        let (mut c, sink) = coordinator();
        let mut engine = SimulatedEngine::new();
        engine.place_companion(Vec3::new(3.0, 0.0, 0.0));

        engine.press(KeyCode::F6);
        let report = c.tick(&mut engine);
        assert!(report.input.stay_toggle);
        assert_eq!(report.hold, HoldOutcome::Entered);
        assert!(report.holding);
        engine.release(KeyCode::F6);
        c.tick(&mut engine);

        engine.press(KeyCode::F6);
        let report = c.tick(&mut engine);
        assert_eq!(report.hold, HoldOutcome::Exited);
        assert!(!c.state().stay_enabled);
        assert_eq!(c.timers().last_follow, 0);
        assert!(sink.contains("Stay toggled: ON"));
        assert!(sink.contains("Stay toggled: OFF"));
    }

    #[test]
    fn test_suppressed_tick_skips_behavior() {
        let (mut c, _) = coordinator();
        let mut engine = SimulatedEngine::new();
        engine.mission_active = true;

        engine.press(KeyCode::F7);
        let report = c.tick(&mut engine);
        assert!(report.suppressed);
        assert_eq!(report.gate, Some(GateEdge::Started));
        assert!(report.lifecycle.is_empty());
        assert!(!c.state().spawned);
        assert!(engine.calls().is_empty());
        assert_eq!(
            engine.status_line.as_deref(),
            Some("Companion: suspended (mission active)")
        );
    }

    #[test]
    fn test_periodic_log_and_heartbeat() {
        let (mut c, sink) = coordinator();
        let mut engine = SimulatedEngine::new();
        for _ in 0..600 {
            c.tick(&mut engine);
        }
        assert_eq!(sink.count("[Core] tick="), 5);
        assert_eq!(sink.count("Heartbeat"), 1);
    }

    #[test]
    fn test_heartbeat_continues_while_suppressed() {
        let (mut c, sink) = coordinator();
        let mut engine = SimulatedEngine::new();
        engine.mission_active = true;
        for _ in 0..1200 {
            assert!(c.tick(&mut engine).suppressed);
        }
        assert_eq!(sink.count("Heartbeat"), 2);
        assert_eq!(sink.count("[Core] tick="), 0);
    }

    #[test]
    fn test_recall_preempts_same_tick_recovery() {
        let (mut c, _) = coordinator();
        let mut engine = SimulatedEngine::new();
        engine.place_companion(Vec3::new(500.0, 0.0, 0.0));

        for _ in 0..299 {
            c.tick(&mut engine);
            engine.nudge_companion(Vec3::new(500.0, 0.0, 0.0));
        }
        engine.take_calls();

        // tick 300：自动回收先触发，召回随后再传送一次并盖戳
        engine.press(KeyCode::F5);
        let report = c.tick(&mut engine);
        assert!(report.auto_teleported);
        assert_eq!(report.recall, RecallOutcome::Recalled { exited_stay: false });
        assert_eq!(c.timers().last_teleport, 300);

        engine.release(KeyCode::F5);
        engine.nudge_companion(Vec3::new(500.0, 0.0, 0.0));
        let report = c.tick(&mut engine);
        assert!(!report.auto_teleported);
        assert_eq!(
            engine.count_calls(|call| matches!(call, EngineCall::TeleportNearPlayer(_))),
            2
        );
    }

    #[test]
    fn test_shutdown_returns_status() {
        let (mut c, sink) = coordinator();
        let mut engine = SimulatedEngine::new();
        c.tick(&mut engine);
        let status = c.shutdown();
        assert_eq!(status.tick, 1);
        assert!(sink.contains("unloaded"));
    }
}
