//! 引擎适配层抽象
//!
//! 协调器只通过 EngineAdapter 读写世界：查询玩家 / 同伴状态、生成与移除、任务、冻结、传送、载具座位、按键与屏幕文字。
//! 所有查询对不存在的实体返回中性值（false / Vec3::ZERO / None）；只有生成和上车可能失败。

use serde::Serialize;

use crate::core::{EngineError, Vec3};
use crate::input::KeyCode;

/// 载具句柄（0 保留为「无」，因此用 Option<VehicleHandle> 表达缺失）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct VehicleHandle(pub u32);

/// 载具座位
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Seat {
    Driver,
    FrontPassenger,
    RearLeft,
    RearRight,
}

impl Seat {
    /// 引擎侧的座位索引（-1 = 驾驶位）
    pub fn index(self) -> i32 {
        match self {
            Seat::Driver => -1,
            Seat::FrontPassenger => 0,
            Seat::RearLeft => 1,
            Seat::RearRight => 2,
        }
    }
}

/// 同乘时的选座顺序；不包含驾驶位
pub const SEAT_PRIORITY: [Seat; 3] = [Seat::FrontPassenger, Seat::RearLeft, Seat::RearRight];

/// 世界读写接口：传感器（&self）与执行器（&mut self）
pub trait EngineAdapter {
    // --- 传感器 ---

    /// 任务抑制标志
    fn is_mission_active(&self) -> bool;

    fn player_exists(&self) -> bool;

    fn is_player_dead(&self) -> bool;

    fn is_player_in_vehicle(&self) -> bool;

    fn player_position(&self) -> Vec3;

    /// 玩家当前所在载具
    fn player_vehicle(&self) -> Option<VehicleHandle>;

    /// 原始按键状态（未去抖；边沿检测由 KeyEdgeTable 负责）
    fn is_key_down(&self, key: KeyCode) -> bool;

    fn companion_exists(&self) -> bool;

    fn companion_position(&self) -> Vec3;

    /// 同伴当前所在载具
    fn companion_vehicle(&self) -> Option<VehicleHandle>;

    fn is_vehicle_seat_free(&self, vehicle: VehicleHandle, seat: Seat) -> bool;

    // --- 执行器 ---

    /// 生成同伴；包含资源加载等待，可能超时失败
    fn spawn_companion(&mut self) -> Result<(), EngineError>;

    fn despawn_companion(&mut self);

    fn task_follow_player(&mut self, distance: f32, speed: f32);

    fn clear_companion_tasks(&mut self);

    fn freeze_companion(&mut self, frozen: bool);

    fn set_companion_position(&mut self, pos: Vec3);

    /// 传送到玩家位置 + offset
    fn teleport_companion_near_player(&mut self, offset: Vec3);

    fn put_companion_into_vehicle(
        &mut self,
        vehicle: VehicleHandle,
        seat: Seat,
    ) -> Result<(), EngineError>;

    /// 屏幕文字（仅状态展示，无行为影响）
    fn draw_text(&mut self, text: &str, x: f32, y: f32);
}
