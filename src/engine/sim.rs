//! 模拟引擎（用于宿主演示与测试，无需真实游戏）
//!
//! 内存中的玩家 / 同伴 / 载具世界；每次执行器调用都记录到 `calls()`，测试据此断言协调器发出了哪些命令。
//! `step(dt)` 推进一帧：跟随任务让同伴向玩家靠近，同乘时同伴位置随玩家。

use std::collections::{HashMap, HashSet};

use crate::core::{EngineError, Vec3};
use crate::engine::{BoundedPoll, EngineAdapter, Seat, VehicleHandle};
use crate::input::KeyCode;

/// 执行器调用记录
#[derive(Clone, Debug, PartialEq)]
pub enum EngineCall {
    Spawn { ok: bool },
    Despawn,
    Follow { distance: f32, speed: f32 },
    ClearTasks,
    Freeze(bool),
    SetPosition(Vec3),
    TeleportNearPlayer(Vec3),
    EnterVehicle { vehicle: VehicleHandle, seat: Seat },
}

#[derive(Clone, Debug)]
pub struct SimPlayer {
    pub exists: bool,
    pub dead: bool,
    pub position: Vec3,
    pub vehicle: Option<VehicleHandle>,
}

impl Default for SimPlayer {
    fn default() -> Self {
        Self {
            exists: true,
            dead: false,
            position: Vec3::ZERO,
            vehicle: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SimCompanion {
    pub position: Vec3,
    pub frozen: bool,
    /// 当前跟随任务 (distance, speed)
    pub follow: Option<(f32, f32)>,
    pub vehicle: Option<(VehicleHandle, Seat)>,
}

/// 座位被 NPC 占用的集合
#[derive(Clone, Debug, Default)]
pub struct SimVehicle {
    pub occupied: HashSet<Seat>,
}

/// 内存世界
#[derive(Debug)]
pub struct SimulatedEngine {
    pub mission_active: bool,
    pub player: SimPlayer,
    pub companion: Option<SimCompanion>,
    pub vehicles: HashMap<VehicleHandle, SimVehicle>,
    pub keys_down: HashSet<KeyCode>,
    /// 资源在第几次轮询时就绪；None 表示永不就绪（生成必然超时）
    pub asset_ready_after: Option<u32>,
    pub asset_poll: BoundedPoll,
    /// 生成点相对玩家的偏移
    pub spawn_offset: Vec3,
    /// 最近一次绘制的状态行
    pub status_line: Option<String>,
    /// 生成时让出的帧数累计（资源等待期间）
    pub yielded_frames: u32,
    calls: Vec<EngineCall>,
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self {
            mission_active: false,
            player: SimPlayer::default(),
            companion: None,
            vehicles: HashMap::new(),
            keys_down: HashSet::new(),
            asset_ready_after: Some(1),
            asset_poll: BoundedPoll::default(),
            spawn_offset: Vec3::new(1.5, 0.0, 0.0),
            status_line: None,
            yielded_frames: 0,
            calls: Vec::new(),
        }
    }
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_player_at(mut self, position: Vec3) -> Self {
        self.player.position = position;
        self
    }

    pub fn with_asset_poll(mut self, poll: BoundedPoll) -> Self {
        self.asset_poll = poll;
        self
    }

    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<EngineCall> {
        std::mem::take(&mut self.calls)
    }

    /// 统计满足条件的调用次数
    pub fn count_calls(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn press(&mut self, key: KeyCode) {
        self.keys_down.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
    }

    /// 直接放置一个同伴（不经过生成流程、不记录调用）
    pub fn place_companion(&mut self, position: Vec3) {
        self.companion = Some(SimCompanion {
            position,
            ..SimCompanion::default()
        });
    }

    /// 直接移动同伴（模拟被推开 / 掉队）
    pub fn nudge_companion(&mut self, position: Vec3) {
        if let Some(c) = self.companion.as_mut() {
            c.position = position;
        }
    }

    /// 注册载具，`occupied` 为已被他人占用的座位
    pub fn add_vehicle(&mut self, handle: VehicleHandle, occupied: &[Seat]) {
        self.vehicles.insert(
            handle,
            SimVehicle {
                occupied: occupied.iter().copied().collect(),
            },
        );
    }

    /// 玩家坐进驾驶位
    pub fn player_enter_vehicle(&mut self, handle: VehicleHandle) {
        self.vehicles
            .entry(handle)
            .or_default()
            .occupied
            .insert(Seat::Driver);
        self.player.vehicle = Some(handle);
    }

    /// 玩家下车；同伴仍留在座位上，直到协调器把它传送出来
    pub fn player_exit_vehicle(&mut self) {
        if let Some(handle) = self.player.vehicle.take() {
            if let Some(v) = self.vehicles.get_mut(&handle) {
                v.occupied.remove(&Seat::Driver);
            }
        }
    }

    /// 推进一帧
    pub fn step(&mut self, dt: f32) {
        let player_pos = self.player.position;
        let Some(c) = self.companion.as_mut() else {
            return;
        };
        if c.vehicle.is_some() {
            c.position = player_pos;
            return;
        }
        if c.frozen {
            return;
        }
        if let Some((distance, speed)) = c.follow {
            let to_player = player_pos - c.position;
            let dist = c.position.distance_sq(player_pos).sqrt();
            if dist > distance && dist > f32::EPSILON {
                let travel = (speed * dt).min(dist - distance);
                let scale = travel / dist;
                c.position = Vec3::new(
                    c.position.x + to_player.x * scale,
                    c.position.y + to_player.y * scale,
                    c.position.z + to_player.z * scale,
                );
            }
        }
    }

    fn release_companion_seat(&mut self) {
        let seat = self.companion.as_mut().and_then(|c| c.vehicle.take());
        if let Some((handle, seat)) = seat {
            if let Some(v) = self.vehicles.get_mut(&handle) {
                v.occupied.remove(&seat);
            }
        }
    }
}

impl EngineAdapter for SimulatedEngine {
    fn is_mission_active(&self) -> bool {
        self.mission_active
    }

    fn player_exists(&self) -> bool {
        self.player.exists
    }

    fn is_player_dead(&self) -> bool {
        self.player.exists && self.player.dead
    }

    fn is_player_in_vehicle(&self) -> bool {
        self.player.exists && self.player.vehicle.is_some()
    }

    fn player_position(&self) -> Vec3 {
        if self.player.exists {
            self.player.position
        } else {
            Vec3::ZERO
        }
    }

    fn player_vehicle(&self) -> Option<VehicleHandle> {
        self.player.exists.then_some(self.player.vehicle).flatten()
    }

    fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    fn companion_exists(&self) -> bool {
        self.companion.is_some()
    }

    fn companion_position(&self) -> Vec3 {
        self.companion
            .as_ref()
            .map(|c| c.position)
            .unwrap_or(Vec3::ZERO)
    }

    fn companion_vehicle(&self) -> Option<VehicleHandle> {
        self.companion
            .as_ref()
            .and_then(|c| c.vehicle)
            .map(|(handle, _)| handle)
    }

    fn is_vehicle_seat_free(&self, vehicle: VehicleHandle, seat: Seat) -> bool {
        self.vehicles
            .get(&vehicle)
            .map(|v| !v.occupied.contains(&seat))
            .unwrap_or(false)
    }

    fn spawn_companion(&mut self) -> Result<(), EngineError> {
        if self.companion.is_some() {
            return Err(EngineError::AlreadySpawned);
        }
        let ready_after = self.asset_ready_after;
        let mut yields = 0;
        let result = self.asset_poll.run(
            |attempt| ready_after.is_some_and(|n| attempt >= n),
            || yields += 1,
        );
        self.yielded_frames += yields;

        match result {
            Ok(attempts) => {
                tracing::debug!(attempts, "Companion asset ready");
                self.place_companion(self.player.position + self.spawn_offset);
                self.calls.push(EngineCall::Spawn { ok: true });
                Ok(())
            }
            Err(e) => {
                self.calls.push(EngineCall::Spawn { ok: false });
                Err(e)
            }
        }
    }

    fn despawn_companion(&mut self) {
        if self.companion.is_none() {
            return;
        }
        self.release_companion_seat();
        self.companion = None;
        self.calls.push(EngineCall::Despawn);
    }

    fn task_follow_player(&mut self, distance: f32, speed: f32) {
        if let Some(c) = self.companion.as_mut() {
            c.follow = Some((distance, speed));
            self.calls.push(EngineCall::Follow { distance, speed });
        }
    }

    fn clear_companion_tasks(&mut self) {
        if let Some(c) = self.companion.as_mut() {
            c.follow = None;
            self.calls.push(EngineCall::ClearTasks);
        }
    }

    fn freeze_companion(&mut self, frozen: bool) {
        if let Some(c) = self.companion.as_mut() {
            c.frozen = frozen;
            self.calls.push(EngineCall::Freeze(frozen));
        }
    }

    fn set_companion_position(&mut self, pos: Vec3) {
        if self.companion.is_none() {
            return;
        }
        self.release_companion_seat();
        if let Some(c) = self.companion.as_mut() {
            c.position = pos;
        }
        self.calls.push(EngineCall::SetPosition(pos));
    }

    fn teleport_companion_near_player(&mut self, offset: Vec3) {
        if self.companion.is_none() || !self.player.exists {
            return;
        }
        self.release_companion_seat();
        let target = self.player.position + offset;
        if let Some(c) = self.companion.as_mut() {
            c.position = target;
        }
        self.calls.push(EngineCall::TeleportNearPlayer(target));
    }

    fn put_companion_into_vehicle(
        &mut self,
        vehicle: VehicleHandle,
        seat: Seat,
    ) -> Result<(), EngineError> {
        if self.companion.is_none() {
            return Err(EngineError::CompanionMissing);
        }
        if !self.vehicles.contains_key(&vehicle) {
            return Err(EngineError::VehicleMissing);
        }
        if !self.is_vehicle_seat_free(vehicle, seat) {
            return Err(EngineError::SeatOccupied { seat });
        }
        self.release_companion_seat();
        if let Some(v) = self.vehicles.get_mut(&vehicle) {
            v.occupied.insert(seat);
        }
        let player_pos = self.player.position;
        if let Some(c) = self.companion.as_mut() {
            c.vehicle = Some((vehicle, seat));
            c.position = player_pos;
        }
        self.calls.push(EngineCall::EnterVehicle { vehicle, seat });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, _x: f32, _y: f32) {
        self.status_line = Some(text.to_string());
    }
}
