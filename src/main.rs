//! Companion - 模拟宿主
//!
//! 入口：初始化日志、加载配置、创建协调器与模拟引擎，按 tick_rate 驱动主循环，
//! 直到达到 max_ticks 或收到 Ctrl+C / SIGTERM。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use companion::config::{load_config, CompanionConfig};
use companion::core::{Coordinator, ShutdownManager, ShutdownReason, Vec3};
use companion::engine::{BoundedPoll, SimulatedEngine, VehicleHandle};
use companion::input::KeyCode;
use companion::observability::{self, FileSink, LogSink, TracingSink};
use tokio::time::MissedTickBehavior;

const DEMO_VEHICLE: VehicleHandle = VehicleHandle(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = match load_config(config_path) {
        Ok(cfg) => {
            tracing::info!("Config loaded");
            cfg
        }
        Err(e) => {
            tracing::warn!("Config load failed, using defaults: {}", e);
            CompanionConfig::default()
        }
    };

    let sink: Box<dyn LogSink> = match cfg.logging.file.as_ref() {
        Some(path) => Box::new(FileSink::open(path)),
        None => Box::new(TracingSink),
    };

    let dt = cfg.host.delta_seconds();
    let max_ticks = cfg.host.max_ticks;
    let mut engine = SimulatedEngine::new()
        .with_asset_poll(BoundedPoll::new(cfg.spawn.asset_poll_attempts));
    engine.add_vehicle(DEMO_VEHICLE, &[]);
    let mut coordinator = Coordinator::new(cfg, sink);

    let shutdown = Arc::new(ShutdownManager::new());
    let mut reasons = shutdown.subscribe();
    shutdown.install_signal_handlers();

    let mut interval = tokio::time::interval(Duration::from_secs_f32(dt));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(tick_rate_hz = 1.0 / dt, ?max_ticks, "Tick loop started");

    loop {
        tokio::select! {
            _ = shutdown.wait_for_shutdown() => break,
            _ = interval.tick() => {}
        }

        let next = coordinator.current_tick().wrapping_add(1);
        run_script(&mut engine, next, dt);
        let report = coordinator.tick(&mut engine);
        engine.step(dt);

        if report.gate.is_some() || !report.lifecycle.is_empty() {
            tracing::debug!(
                report = %serde_json::to_string(&report).unwrap_or_default(),
                "Tick report"
            );
        }

        if max_ticks.is_some_and(|limit| report.tick >= limit) {
            shutdown.shutdown(ShutdownReason::TickLimit(report.tick));
        }
    }

    match reasons.try_recv() {
        Ok(reason) => tracing::info!(?reason, "Tick loop stopped"),
        Err(_) => tracing::info!("Tick loop stopped"),
    }

    let status = coordinator.shutdown();
    let json = serde_json::to_string_pretty(&status).context("Failed to serialize final status")?;
    println!("{}", json);

    Ok(())
}

/// 演示脚本：生成、行走、停留、同乘、任务挂起、掉队回收、手动召回
fn run_script(engine: &mut SimulatedEngine, tick: u32, dt: f32) {
    let tap = |engine: &mut SimulatedEngine, key: KeyCode, at: u32| {
        if tick == at {
            engine.press(key);
        } else if tick == at + 1 {
            engine.release(key);
        }
    };

    tap(engine, KeyCode::F7, 30);
    tap(engine, KeyCode::F6, 400);
    tap(engine, KeyCode::F6, 700);
    tap(engine, KeyCode::F5, 1900);

    match tick {
        900 => engine.player_enter_vehicle(DEMO_VEHICLE),
        1200 => engine.player_exit_vehicle(),
        1400 => engine.mission_active = true,
        1600 => engine.mission_active = false,
        1800 => engine.player.position = engine.player.position + Vec3::new(100.0, 0.0, 0.0),
        _ => {}
    }

    // 玩家匀速行走（2 m/s）
    if tick >= 120 {
        engine.player.position = engine.player.position + Vec3::new(2.0 * dt, 0.0, 0.0);
    }
}
