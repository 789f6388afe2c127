//! 输入边沿检测
//!
//! 宿主只提供原始按键状态；KeyEdgeTable 记住每个按键上一 tick 的状态，按下的那一个 tick 报告一次。
//! 该表独立于行为状态，由协调器每 tick 刷新一次。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::KeysSection;
use crate::engine::EngineAdapter;

/// 虚拟键码
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const F5: KeyCode = KeyCode(0x74);
    pub const F6: KeyCode = KeyCode(0x75);
    pub const F7: KeyCode = KeyCode(0x76);
}

/// 按键 → 上一 tick 的原始状态
#[derive(Debug, Default, Clone)]
pub struct KeyEdgeTable {
    last: HashMap<KeyCode, bool>,
}

impl KeyEdgeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录本 tick 的原始状态，返回是否为按下边沿
    pub fn just_pressed(&mut self, key: KeyCode, down: bool) -> bool {
        let was_down = self.last.insert(key, down).unwrap_or(false);
        down && !was_down
    }

    /// 读取三个控制键的边沿
    pub fn poll<E: EngineAdapter + ?Sized>(&mut self, engine: &E, keys: &KeysSection) -> InputEdges {
        InputEdges {
            stay_toggle: self.just_pressed(keys.stay_toggle, engine.is_key_down(keys.stay_toggle)),
            spawn_toggle: self.just_pressed(keys.spawn_toggle, engine.is_key_down(keys.spawn_toggle)),
            recall: self.just_pressed(keys.recall, engine.is_key_down(keys.recall)),
        }
    }
}

/// 本 tick 的按下边沿
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InputEdges {
    pub stay_toggle: bool,
    pub spawn_toggle: bool,
    pub recall: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SimulatedEngine;

    #[test]
    fn test_edge_fires_once_per_press() {
        let mut table = KeyEdgeTable::new();
        assert!(!table.just_pressed(KeyCode::F6, false));
        assert!(table.just_pressed(KeyCode::F6, true));
        assert!(!table.just_pressed(KeyCode::F6, true));
        assert!(!table.just_pressed(KeyCode::F6, false));
        assert!(table.just_pressed(KeyCode::F6, true));
    }

    #[test]
    fn test_first_observation_down_is_edge() {
        let mut table = KeyEdgeTable::new();
        assert!(table.just_pressed(KeyCode::F5, true));
    }

    #[test]
    fn test_keys_are_independent() {
        let mut table = KeyEdgeTable::new();
        assert!(table.just_pressed(KeyCode::F5, true));
        assert!(table.just_pressed(KeyCode::F7, true));
        assert!(!table.just_pressed(KeyCode::F5, true));
    }

    #[test]
    fn test_poll_from_engine() {
        let keys = KeysSection::default();
        let mut table = KeyEdgeTable::new();
        let mut engine = SimulatedEngine::new();

        engine.press(KeyCode::F7);
        let edges = table.poll(&engine, &keys);
        assert!(edges.spawn_toggle);
        assert!(!edges.stay_toggle);
        assert!(!edges.recall);

        let edges = table.poll(&engine, &keys);
        assert_eq!(edges, InputEdges::default());

        engine.release(KeyCode::F7);
        table.poll(&engine, &keys);
        engine.press(KeyCode::F7);
        assert!(table.poll(&engine, &keys).spawn_toggle);
    }
}
