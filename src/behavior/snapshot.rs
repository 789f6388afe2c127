//! 传感器快照：每 tick 读一次玩家真值，tick 内不可变

use serde::Serialize;

use crate::core::Vec3;
use crate::engine::EngineAdapter;

/// 本 tick 的上下文
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TickContext {
    pub tick: u32,
    pub delta_seconds: f32,
    pub player_exists: bool,
    pub player_dead: bool,
    pub player_in_vehicle: bool,
    pub player_pos: Vec3,
}

impl TickContext {
    /// 纯读取，无副作用
    pub fn capture<E: EngineAdapter + ?Sized>(engine: &E, tick: u32, delta_seconds: f32) -> Self {
        Self {
            tick,
            delta_seconds,
            player_exists: engine.player_exists(),
            player_dead: engine.is_player_dead(),
            player_in_vehicle: engine.is_player_in_vehicle(),
            player_pos: engine.player_position(),
        }
    }

    /// 玩家存在且存活
    pub fn player_alive(&self) -> bool {
        self.player_exists && !self.player_dead
    }
}
