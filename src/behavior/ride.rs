//! 载具同乘协调
//!
//! 在停留 / 跟随执行器之前运行，可以否决它们。按玩家上下车边沿处理：
//! - 骑乘中收到停留请求：先传送下车、清骑乘状态、重置跟随冷却，停留绝不在车上生效
//! - 玩家下车且同伴在骑乘：传送到玩家身边、重置跟随冷却
//! - 玩家在车上、同伴已生成、无停留请求：同伴不在玩家的车里时按 副驾 > 左后 > 右后 选第一个空座

use serde::Serialize;

use crate::behavior::{CommandBatch, Ports, TickContext};
use crate::core::{CompanionState, CooldownTimers, Vec3};
use crate::engine::{EngineAdapter, Seat, VehicleHandle, SEAT_PRIORITY};

/// 骑乘状态
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RideState {
    pub riding: bool,
    /// 当前锁定的载具
    pub vehicle: Option<VehicleHandle>,
    /// 上一 tick 玩家是否在车上（边沿检测用）
    pub player_was_in_vehicle: bool,
}

impl RideState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn release(&mut self) {
        self.riding = false;
        self.vehicle = None;
    }
}

/// 本 tick 同乘协调的结果
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RideOutcome {
    /// 因停留请求而下车
    pub released_for_stay: bool,
    /// 玩家下车后把同伴传送出来
    pub exit_teleport: bool,
    pub mounted: Option<(VehicleHandle, Seat)>,
    /// 玩家车上没有空座
    pub no_free_seat: bool,
}

/// 按优先级选第一个空座
pub fn choose_seat<E: EngineAdapter + ?Sized>(engine: &E, vehicle: VehicleHandle) -> Option<Seat> {
    SEAT_PRIORITY
        .into_iter()
        .find(|&seat| engine.is_vehicle_seat_free(vehicle, seat))
}

#[allow(clippy::too_many_arguments)]
pub fn run<E: EngineAdapter + ?Sized>(
    ports: &mut Ports<'_, E>,
    ctx: &TickContext,
    cmd: &CommandBatch,
    state: &mut CompanionState,
    ride: &mut RideState,
    timers: &mut CooldownTimers,
    offset: Vec3,
) -> RideOutcome {
    let mut outcome = RideOutcome::default();
    let in_vehicle = ctx.player_in_vehicle;
    let stay = cmd.requests_stay();

    if stay && ride.riding && state.spawned {
        ports.engine.teleport_companion_near_player(offset);
        ride.release();
        timers.reset_follow();
        outcome.released_for_stay = true;
        ports
            .sink
            .write_line("[VehicleRide] Stay requested while riding -> released companion before Stay");
    }

    if ride.player_was_in_vehicle && !in_vehicle {
        if ride.riding && state.spawned {
            ports.engine.teleport_companion_near_player(offset);
            timers.reset_follow();
            outcome.exit_teleport = true;
            ports
                .sink
                .write_line("[VehicleRide] Player EXIT vehicle -> teleport companion + resume follow");
        }
        ride.release();
    }

    if in_vehicle && state.spawned && !stay {
        if let Some(vehicle) = ports.engine.player_vehicle() {
            let seated = ports.engine.companion_vehicle() == Some(vehicle);
            let latched = ride.riding && ride.vehicle == Some(vehicle);

            if !(latched && seated) {
                match choose_seat(&*ports.engine, vehicle) {
                    Some(seat) => match ports.engine.put_companion_into_vehicle(vehicle, seat) {
                        Ok(()) => {
                            ride.riding = true;
                            ride.vehicle = Some(vehicle);
                            // 骑乘期间不重发跟随
                            timers.last_follow = ctx.tick;
                            outcome.mounted = Some((vehicle, seat));
                            ports.sink.log(format_args!(
                                "[VehicleRide] Warped companion into vehicle={} seat={}",
                                vehicle.0,
                                seat.index()
                            ));
                        }
                        Err(e) => {
                            ports.sink.log(format_args!(
                                "[VehicleRide] Mount failed vehicle={}: {}",
                                vehicle.0, e
                            ));
                        }
                    },
                    None => {
                        ride.release();
                        outcome.no_free_seat = true;
                    }
                }
            }
        }
    }

    ride.player_was_in_vehicle = in_vehicle;
    state.riding_vehicle = ride.riding;
    outcome
}
