//! 生命周期开关：生成 / 移除
//!
//! 两个触发源（生成键边沿、决策的 spawn/despawn 请求）走同一组受 `spawned` 保护的动作，
//! 同一 tick 内不会重复生成或移除。生成失败只记日志，`spawned` 保持 false，不自动重试。

use serde::Serialize;

use crate::behavior::{CommandBatch, Ports};
use crate::core::CompanionState;
use crate::engine::EngineAdapter;

/// 生命周期动作结果
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleOutcome {
    Spawned,
    SpawnFailed,
    Despawned,
}

/// 生成同伴
pub fn spawn<E: EngineAdapter + ?Sized>(
    ports: &mut Ports<'_, E>,
    state: &mut CompanionState,
    source: &str,
) -> LifecycleOutcome {
    match ports.engine.spawn_companion() {
        Ok(()) => {
            state.spawned = true;
            ports.sink.log(format_args!("[{}] spawn OK", source));
            LifecycleOutcome::Spawned
        }
        Err(e) => {
            ports.sink.log(format_args!("[{}] spawn FAILED: {}", source, e));
            LifecycleOutcome::SpawnFailed
        }
    }
}

/// 移除同伴
pub fn despawn<E: EngineAdapter + ?Sized>(
    ports: &mut Ports<'_, E>,
    state: &mut CompanionState,
    source: &str,
) -> LifecycleOutcome {
    ports.engine.despawn_companion();
    state.spawned = false;
    ports.sink.log(format_args!("[{}] despawn OK", source));
    LifecycleOutcome::Despawned
}

/// 处理生成键与决策请求
pub fn run<E: EngineAdapter + ?Sized>(
    ports: &mut Ports<'_, E>,
    spawn_toggle: bool,
    cmd: &CommandBatch,
    state: &mut CompanionState,
) -> Vec<LifecycleOutcome> {
    let mut outcomes = Vec::new();

    if spawn_toggle {
        outcomes.push(if state.spawned {
            despawn(ports, state, "Toggle")
        } else {
            spawn(ports, state, "Toggle")
        });
    }

    if cmd.request_spawn && !state.spawned {
        outcomes.push(spawn(ports, state, "Core"));
    }

    if cmd.request_despawn && state.spawned {
        outcomes.push(despawn(ports, state, "Core"));
    }

    outcomes
}
