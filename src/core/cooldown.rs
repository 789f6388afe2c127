//! 冷却计时：跟随重发、自动传送、锚点回正
//!
//! 每个计时器是单调 tick 戳；比较时用无符号回绕减法，tick 计数溢出后仍然正确。
//! 戳为 0 表示「立即可用」（当前 tick 大于间隔即可触发）。

use serde::Serialize;

/// 三个冷却戳
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CooldownTimers {
    pub last_follow: u32,
    pub last_teleport: u32,
    pub last_resnap: u32,
}

impl CooldownTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 `stamp` 到 `now` 经过的 tick 数
    pub fn elapsed(now: u32, stamp: u32) -> u32 {
        now.wrapping_sub(stamp)
    }

    pub fn since_follow(&self, now: u32) -> u32 {
        Self::elapsed(now, self.last_follow)
    }

    pub fn since_teleport(&self, now: u32) -> u32 {
        Self::elapsed(now, self.last_teleport)
    }

    pub fn since_resnap(&self, now: u32) -> u32 {
        Self::elapsed(now, self.last_resnap)
    }

    /// 下一个合法 tick 立即重发跟随
    pub fn reset_follow(&mut self) {
        self.last_follow = 0;
    }

    /// 全部清零（任务门控两端都会调用）
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
