//! 任务抑制门控
//!
//! Inactive ⇄ Active，按本 tick 与上 tick 的抑制标志做边沿检测。
//! 进入 Active 时记住 spawned / stay_enabled 并移除同伴；退出时恢复停留开关、按需重新生成。
//! 两端都清空同乘状态与全部冷却，保证恢复后立即重发跟随。

use serde::Serialize;

use crate::behavior::{lifecycle, Ports, RideState};
use crate::core::{CompanionMode, CompanionState, CooldownTimers};
use crate::engine::EngineAdapter;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum GatePhase {
    #[default]
    Inactive,
    Active,
}

/// 门控边沿
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateEdge {
    Started,
    Ended,
}

/// 抑制开始时保存的状态；只在 Started 与 Ended 之间存在
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MissionMemory {
    pub spawned: bool,
    pub stay_enabled: bool,
}

#[derive(Debug, Default, Clone)]
pub struct MissionGate {
    phase: GatePhase,
    memory: Option<MissionMemory>,
}

impl MissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GatePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == GatePhase::Active
    }

    pub fn memory(&self) -> Option<&MissionMemory> {
        self.memory.as_ref()
    }

    /// 纯边沿检测：记录新阶段，返回发生的边沿
    pub fn observe(&mut self, suppressed: bool) -> Option<GateEdge> {
        let next = if suppressed {
            GatePhase::Active
        } else {
            GatePhase::Inactive
        };
        let edge = match (self.phase, next) {
            (GatePhase::Inactive, GatePhase::Active) => Some(GateEdge::Started),
            (GatePhase::Active, GatePhase::Inactive) => Some(GateEdge::Ended),
            _ => None,
        };
        self.phase = next;
        edge
    }

    /// 边沿检测并执行挂起 / 恢复
    pub fn update<E: EngineAdapter + ?Sized>(
        &mut self,
        ports: &mut Ports<'_, E>,
        suppressed: bool,
        state: &mut CompanionState,
        ride: &mut RideState,
        timers: &mut CooldownTimers,
    ) -> Option<GateEdge> {
        let edge = self.observe(suppressed)?;
        match edge {
            GateEdge::Started => self.suspend(ports, state),
            GateEdge::Ended => self.resume(ports, state),
        }
        ride.clear();
        state.riding_vehicle = false;
        timers.clear();
        Some(edge)
    }

    fn suspend<E: EngineAdapter + ?Sized>(&mut self, ports: &mut Ports<'_, E>, state: &mut CompanionState) {
        let memory = MissionMemory {
            spawned: state.spawned,
            stay_enabled: state.stay_enabled,
        };
        self.memory = Some(memory);

        ports.sink.log(format_args!(
            "[MissionGate] Mission START - suspending companion. spawnedBefore={} stayBefore={}",
            memory.spawned as u8, memory.stay_enabled as u8
        ));

        if state.spawned {
            ports.engine.despawn_companion();
            state.spawned = false;
        }

        // 同伴已移除，停留运行态一并作废
        state.holding = false;
        state.clear_anchor();
        state.mode = CompanionMode::Protection;
    }

    fn resume<E: EngineAdapter + ?Sized>(&mut self, ports: &mut Ports<'_, E>, state: &mut CompanionState) {
        let memory = self.memory.take().unwrap_or(MissionMemory {
            spawned: false,
            stay_enabled: state.stay_enabled,
        });

        ports.sink.log(format_args!(
            "[MissionGate] Mission END - resuming companion. respawn={} stayRestore={}",
            memory.spawned as u8, memory.stay_enabled as u8
        ));

        state.stay_enabled = memory.stay_enabled;

        if memory.spawned && !state.spawned {
            lifecycle::spawn(ports, state, "MissionGate");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Vec3;
    use crate::engine::{EngineCall, SimulatedEngine, VehicleHandle};
    use crate::observability::MemorySink;

    #[test]
    fn test_observe_edges() {
        let mut gate = MissionGate::new();
        assert_eq!(gate.observe(false), None);
        assert_eq!(gate.observe(true), Some(GateEdge::Started));
        assert_eq!(gate.observe(true), None);
        assert!(gate.is_active());
        assert_eq!(gate.observe(false), Some(GateEdge::Ended));
        assert_eq!(gate.phase(), GatePhase::Inactive);
    }

    #[test]
    fn test_round_trip_restores_state() {
        let mut engine = SimulatedEngine::new();
        engine.place_companion(Vec3::ZERO);
        let sink = MemorySink::new();
        let mut writer = sink.clone();

        let mut gate = MissionGate::new();
        let mut state = CompanionState {
            spawned: true,
            stay_enabled: true,
            holding: true,
            riding_vehicle: true,
            ..CompanionState::default()
        };
        state.set_anchor(Vec3::new(3.0, 0.0, 0.0));
        let mut ride = RideState {
            riding: true,
            vehicle: Some(VehicleHandle(4)),
            player_was_in_vehicle: true,
        };
        let mut timers = CooldownTimers {
            last_follow: 400,
            last_teleport: 300,
            last_resnap: 450,
        };

        {
            let mut ports = Ports::new(&mut engine, &mut writer);
            let edge = gate.update(&mut ports, true, &mut state, &mut ride, &mut timers);
            assert_eq!(edge, Some(GateEdge::Started));
        }
        assert!(!state.spawned);
        assert!(!state.holding);
        assert_eq!(state.anchor(), None);
        assert!(!engine.companion_exists());
        assert_eq!(ride, RideState::default());
        assert!(!state.riding_vehicle);
        assert_eq!(timers, CooldownTimers::default());
        assert_eq!(
            gate.memory(),
            Some(&MissionMemory {
                spawned: true,
                stay_enabled: true
            })
        );

        // 抑制期间用户改了停留开关，结束时以记忆为准
        state.stay_enabled = false;
        timers.last_follow = 7;

        {
            let mut ports = Ports::new(&mut engine, &mut writer);
            let edge = gate.update(&mut ports, false, &mut state, &mut ride, &mut timers);
            assert_eq!(edge, Some(GateEdge::Ended));
        }
        assert!(state.spawned);
        assert!(state.stay_enabled);
        assert!(engine.companion_exists());
        assert_eq!(timers.last_follow, 0);
        assert_eq!(gate.memory(), None);
        assert!(sink.contains("Mission START"));
        assert!(sink.contains("[MissionGate] spawn OK"));
    }

    #[test]
    fn test_respawn_failure_is_logged_not_retried() {
        let mut engine = SimulatedEngine::new();
        engine.place_companion(Vec3::ZERO);
        let sink = MemorySink::new();
        let mut writer = sink.clone();

        let mut gate = MissionGate::new();
        let mut state = CompanionState {
            spawned: true,
            ..CompanionState::default()
        };
        let mut ride = RideState::default();
        let mut timers = CooldownTimers::default();

        let mut ports = Ports::new(&mut engine, &mut writer);
        gate.update(&mut ports, true, &mut state, &mut ride, &mut timers);
        ports.engine.asset_ready_after = None;
        gate.update(&mut ports, false, &mut state, &mut ride, &mut timers);
        assert!(!state.spawned);
        assert_eq!(gate.update(&mut ports, false, &mut state, &mut ride, &mut timers), None);

        assert_eq!(
            engine.count_calls(|c| matches!(c, EngineCall::Spawn { ok: false })),
            1
        );
        assert!(sink.contains("[MissionGate] spawn FAILED"));
    }

    #[test]
    fn test_not_spawned_before_stays_despawned() {
        let mut engine = SimulatedEngine::new();
        let mut sink = MemorySink::new();
        let mut gate = MissionGate::new();
        let mut state = CompanionState::default();
        let mut ride = RideState::default();
        let mut timers = CooldownTimers::default();

        let mut ports = Ports::new(&mut engine, &mut sink);
        gate.update(&mut ports, true, &mut state, &mut ride, &mut timers);
        gate.update(&mut ports, false, &mut state, &mut ride, &mut timers);
        assert!(!state.spawned);
        assert!(engine.calls().is_empty());
    }
}
