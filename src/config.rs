//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `COMPANION__*` 覆盖（双下划线表示嵌套，如 `COMPANION__FOLLOW__SPEED=4.5`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::Vec3;
use crate::engine::DEFAULT_ASSET_POLL_ATTEMPTS;
use crate::input::KeyCode;

/// 配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompanionConfig {
    pub follow: FollowSection,
    pub stay: StaySection,
    pub recovery: RecoverySection,
    pub logging: LoggingSection,
    pub keys: KeysSection,
    pub spawn: SpawnSection,
    pub host: HostSection,
}

/// [follow] 段：跟随距离、速度、重发间隔
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FollowSection {
    pub distance: f32,
    pub speed: f32,
    /// 重发跟随指令的最小间隔（60 ≈ 1s @60fps）
    pub refresh_ticks: u32,
}

impl Default for FollowSection {
    fn default() -> Self {
        Self {
            distance: 2.0,
            speed: 3.0,
            refresh_ticks: 60,
        }
    }
}

/// [stay] 段：锚点回正间隔与漂移阈值
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaySection {
    pub snap_ticks: u32,
    /// 漂移超过该距离才回正（比较时取平方）
    pub drift_distance: f32,
}

impl StaySection {
    pub fn drift_sq(&self) -> f32 {
        self.drift_distance * self.drift_distance
    }
}

impl Default for StaySection {
    fn default() -> Self {
        Self {
            snap_ticks: 60,
            drift_distance: 0.10,
        }
    }
}

/// [recovery] 段：自动传送距离、冷却、传送偏移（手动召回共用偏移）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecoverySection {
    pub teleport_distance: f32,
    pub cooldown_ticks: u32,
    pub offset: Vec3,
}

impl RecoverySection {
    pub fn teleport_distance_sq(&self) -> f32 {
        self.teleport_distance * self.teleport_distance
    }
}

impl Default for RecoverySection {
    fn default() -> Self {
        Self {
            teleport_distance: 50.0,
            cooldown_ticks: 300,
            offset: Vec3::new(1.2, 0.8, 0.0),
        }
    }
}

/// [logging] 段：周期日志间隔、心跳间隔、日志文件
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub log_interval_ticks: u32,
    pub heartbeat_ticks: u32,
    /// 设置后行为日志写入该文件，否则转发给 tracing
    pub file: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            log_interval_ticks: 120,
            heartbeat_ticks: 600,
            file: None,
        }
    }
}

/// [keys] 段：三个控制键
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeysSection {
    pub stay_toggle: KeyCode,
    pub spawn_toggle: KeyCode,
    pub recall: KeyCode,
}

impl Default for KeysSection {
    fn default() -> Self {
        Self {
            stay_toggle: KeyCode::F6,
            spawn_toggle: KeyCode::F7,
            recall: KeyCode::F5,
        }
    }
}

/// [spawn] 段：资源就绪轮询上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpawnSection {
    pub asset_poll_attempts: u32,
}

impl Default for SpawnSection {
    fn default() -> Self {
        Self {
            asset_poll_attempts: DEFAULT_ASSET_POLL_ATTEMPTS,
        }
    }
}

/// [host] 段：模拟宿主的帧率、运行上限、状态行
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostSection {
    pub tick_rate_hz: u32,
    /// 未设置时一直运行到 Ctrl+C
    pub max_ticks: Option<u32>,
    pub show_status: bool,
}

impl HostSection {
    /// 每 tick 的秒数
    pub fn delta_seconds(&self) -> f32 {
        1.0 / self.tick_rate_hz.max(1) as f32
    }
}

impl Default for HostSection {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            max_ticks: None,
            show_status: true,
        }
    }
}

/// 从 config 目录加载配置，环境变量 COMPANION__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 COMPANION__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<CompanionConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("COMPANION")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = CompanionConfig::default();
        assert_eq!(cfg.follow.distance, 2.0);
        assert_eq!(cfg.follow.speed, 3.0);
        assert_eq!(cfg.follow.refresh_ticks, 60);
        assert_eq!(cfg.recovery.teleport_distance_sq(), 2500.0);
        assert_eq!(cfg.recovery.cooldown_ticks, 300);
        assert_eq!(cfg.stay.snap_ticks, 60);
        assert!((cfg.stay.drift_sq() - 0.01).abs() < 1e-6);
        assert_eq!(cfg.keys.recall, KeyCode::F5);
        assert_eq!(cfg.spawn.asset_poll_attempts, 120);
        assert_eq!(cfg.logging.log_interval_ticks, 120);
    }

    #[test]
    fn test_load_from_file_overrides() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[follow]
speed = 4.5

[recovery]
cooldown_ticks = 90
offset = {{ x = 2.0, y = 0.0, z = 0.5 }}

[keys]
recall = 114

[host]
max_ticks = 1000
"#
        )
        .unwrap();

        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.follow.speed, 4.5);
        assert_eq!(cfg.follow.distance, 2.0);
        assert_eq!(cfg.recovery.cooldown_ticks, 90);
        assert_eq!(cfg.recovery.offset, Vec3::new(2.0, 0.0, 0.5));
        assert_eq!(cfg.keys.recall, KeyCode(114));
        assert_eq!(cfg.keys.stay_toggle, KeyCode::F6);
        assert_eq!(cfg.host.max_ticks, Some(1000));
    }

    #[test]
    fn test_delta_seconds() {
        let host = HostSection {
            tick_rate_hz: 0,
            ..HostSection::default()
        };
        assert_eq!(host.delta_seconds(), 1.0);
        assert!((HostSection::default().delta_seconds() - 1.0 / 60.0).abs() < 1e-6);
    }
}
