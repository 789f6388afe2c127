//! 状态定义：CompanionState 与 StatusSnapshot 投影
//!
//! CompanionState 由协调器独占并跨 tick 保留；StatusSnapshot 是只读投影，供状态行与宿主输出使用。

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// 三维坐标（由传感器层提供，不做物理含义上的解释）
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// 两点距离的平方（比较阈值时避免开方）
    pub fn distance_sq(self, other: Vec3) -> f32 {
        let d = self - other;
        d.x * d.x + d.y * d.y + d.z * d.z
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2},{:.2},{:.2})", self.x, self.y, self.z)
    }
}

/// 同伴模式；目前只有 Protection / Stay 接入行为
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum CompanionMode {
    #[default]
    Protection,
    Stay,
    Frenzy,
}

/// 跨 tick 保留的同伴状态
///
/// `spawned` 每个 tick 从传感器回写，防止与世界实际情况不同步。
#[derive(Clone, Debug, Default, Serialize)]
pub struct CompanionState {
    pub mode: CompanionMode,
    pub spawned: bool,
    /// 用户期望的停留开关（输入层状态）
    pub stay_enabled: bool,
    /// 停留执行器是否已进入（冻结 + 锚点已捕获）
    pub holding: bool,
    pub has_anchor: bool,
    /// 仅当 has_anchor 时有效
    pub anchor: Vec3,
    pub riding_vehicle: bool,
}

impl CompanionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 有效锚点
    pub fn anchor(&self) -> Option<Vec3> {
        self.has_anchor.then_some(self.anchor)
    }

    pub fn set_anchor(&mut self, pos: Vec3) {
        self.anchor = pos;
        self.has_anchor = true;
    }

    pub fn clear_anchor(&mut self) {
        self.has_anchor = false;
    }

    /// 合并门控状态与 tick 计数，得到可渲染 / 可序列化的快照
    pub fn project(&self, tick: u32, suppressed: bool) -> StatusSnapshot {
        StatusSnapshot {
            tick,
            mode: self.mode,
            spawned: self.spawned,
            stay_enabled: self.stay_enabled,
            holding: self.holding,
            anchor: self.anchor(),
            riding: self.riding_vehicle,
            suppressed,
        }
    }
}

/// 状态投影（状态行 / 宿主 JSON 输出）
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub tick: u32,
    pub mode: CompanionMode,
    pub spawned: bool,
    pub stay_enabled: bool,
    pub holding: bool,
    pub anchor: Option<Vec3>,
    pub riding: bool,
    pub suppressed: bool,
}

impl StatusSnapshot {
    /// 屏幕状态行
    pub fn status_line(&self) -> String {
        if self.suppressed {
            return "Companion: suspended (mission active)".to_string();
        }
        format!(
            "Companion: {:?} spawned={} stay={} riding={}",
            self.mode,
            on_off(self.spawned),
            on_off(self.stay_enabled),
            on_off(self.riding)
        )
    }
}

fn on_off(v: bool) -> &'static str {
    if v {
        "ON"
    } else {
        "OFF"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_sq() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 6.0, 3.0);
        assert_eq!(a.distance_sq(b), 25.0);
        assert_eq!(b.distance_sq(a), 25.0);
        assert_eq!(a.distance_sq(a), 0.0);
    }

    #[test]
    fn test_anchor_only_valid_when_set() {
        let mut state = CompanionState::new();
        assert_eq!(state.anchor(), None);

        state.set_anchor(Vec3::new(5.0, 0.0, 1.0));
        assert_eq!(state.anchor(), Some(Vec3::new(5.0, 0.0, 1.0)));

        state.clear_anchor();
        assert_eq!(state.anchor(), None);
    }

    #[test]
    fn test_status_line() {
        let mut state = CompanionState::new();
        state.spawned = true;
        let line = state.project(10, false).status_line();
        assert_eq!(line, "Companion: Protection spawned=ON stay=OFF riding=OFF");

        let line = state.project(10, true).status_line();
        assert!(line.contains("suspended"));
    }
}
