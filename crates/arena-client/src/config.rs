//! 机器人配置
//!
//! 所有字段都有默认值，配置文件只需写出要改动的部分：
//!
//! ```toml
//! [limits]
//! max_speed = 6.0
//!
//! [events]
//! max_queue_size = 128
//!
//! [events.priorities]
//! scanned_bot = 125
//!
//! [scheduler]
//! stop_timeout_ms = 200
//! ```

use crate::events::EventKind;
use crate::motion::MotionLimits;
use arena_driver::PipelineConfig;
use arena_protocol::{MAX_GUN_TURN_RATE, MAX_RADAR_TURN_RATE, MAX_SPEED, MAX_TURN_RATE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unknown event kind in priorities: '{0}'")]
    UnknownEventKind(String),

    #[error("Invalid config value '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// 机器人配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub limits: LimitsConfig,
    pub events: EventsConfig,
    pub scheduler: SchedulerConfig,
}

/// 运动限制
///
/// 超过物理常量的值在转换为 [`MotionLimits`] 时被收敛到物理常量。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_speed: f64,
    pub max_turn_rate: f64,
    pub max_gun_turn_rate: f64,
    pub max_radar_turn_rate: f64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED,
            max_turn_rate: MAX_TURN_RATE,
            max_gun_turn_rate: MAX_GUN_TURN_RATE,
            max_radar_turn_rate: MAX_RADAR_TURN_RATE,
        }
    }
}

impl LimitsConfig {
    pub fn to_limits(&self) -> MotionLimits {
        MotionLimits {
            max_speed: self.max_speed,
            max_turn_rate: self.max_turn_rate,
            max_gun_turn_rate: self.max_gun_turn_rate,
            max_radar_turn_rate: self.max_radar_turn_rate,
        }
        .sanitized()
    }
}

/// 事件队列配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// 待分发事件上限，超出后丢弃新事件
    pub max_queue_size: usize,
    /// 非关键事件的最大存活回合数
    pub max_event_age: u32,
    /// 覆盖默认优先级（键为 snake_case 事件名）
    pub priorities: BTreeMap<String, i32>,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            max_queue_size: crate::events::MAX_QUEUE_SIZE,
            max_event_age: crate::events::MAX_EVENT_AGE,
            priorities: BTreeMap::new(),
        }
    }
}

impl EventsConfig {
    /// 解析优先级覆盖表
    pub fn priority_overrides(&self) -> Result<Vec<(EventKind, i32)>, ConfigError> {
        self.priorities
            .iter()
            .map(|(name, priority)| {
                EventKind::from_name(name)
                    .map(|kind| (kind, *priority))
                    .ok_or_else(|| ConfigError::UnknownEventKind(name.clone()))
            })
            .collect()
    }
}

/// 调度配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// 取消工作线程后等待其退出的最长时间（毫秒）
    pub stop_timeout_ms: u64,
    /// IO 循环接收超时（毫秒）
    pub receive_timeout_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            stop_timeout_ms: 100,
            receive_timeout_ms: PipelineConfig::default().receive_timeout_ms,
        }
    }
}

impl SchedulerConfig {
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            receive_timeout_ms: self.receive_timeout_ms,
        }
    }
}

impl BotConfig {
    /// 从 TOML 文本解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BotConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("limits.max_speed", self.limits.max_speed),
            ("limits.max_turn_rate", self.limits.max_turn_rate),
            ("limits.max_gun_turn_rate", self.limits.max_gun_turn_rate),
            ("limits.max_radar_turn_rate", self.limits.max_radar_turn_rate),
        ];
        for (field, value) in limits {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be a non-negative number, got {}", value),
                });
            }
        }
        if self.events.max_queue_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "events.max_queue_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.scheduler.receive_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.receive_timeout_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        self.events.priority_overrides()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BotConfig::from_toml_str("").unwrap();
        assert_eq!(config, BotConfig::default());
        assert_eq!(config.limits.to_limits(), MotionLimits::default());
        assert_eq!(config.scheduler.stop_timeout(), Duration::from_millis(100));
        assert_eq!(config.events.max_queue_size, 256);
        assert_eq!(config.events.max_event_age, 2);
    }

    #[test]
    fn test_partial_config() {
        let config = BotConfig::from_toml_str(
            r#"
            [limits]
            max_speed = 5.0
            max_radar_turn_rate = 90.0

            [events.priorities]
            scanned_bot = 125
            "#,
        )
        .unwrap();

        let limits = config.limits.to_limits();
        assert_eq!(limits.max_speed, 5.0);
        // 超过物理上限的值被收敛
        assert_eq!(limits.max_radar_turn_rate, MAX_RADAR_TURN_RATE);
        assert_eq!(limits.max_turn_rate, MAX_TURN_RATE);
        assert_eq!(
            config.events.priority_overrides().unwrap(),
            vec![(EventKind::ScannedBot, 125)]
        );
    }

    #[test]
    fn test_rejects_unknown_event_kind() {
        let err = BotConfig::from_toml_str("[events.priorities]\ntank = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEventKind(name) if name == "tank"));
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = BotConfig::from_toml_str("[limits]\nmax_speed = -1.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "limits.max_speed",
                ..
            }
        ));

        let err = BotConfig::from_toml_str("[events]\nmax_queue_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = BotConfig::from_toml_str("[limits]\nmax_speed = \"fast\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scheduler]\nstop_timeout_ms = 250").unwrap();

        let config = BotConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.scheduler.stop_timeout(), Duration::from_millis(250));

        let missing = BotConfig::load_from_file(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
