//! 回合快照
//!
//! 传输层每个 tick 解码出一个 `TickSnapshot`，运行时只保留最新的一份。

use crate::ProtocolError;
use crate::events::RawEvent;
use crate::intent::Color;

/// 机器人自身状态（服务器权威值）
///
/// 角度单位为度，0° 指向东，逆时针为正。
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BotState {
    /// 能量，0 表示机器人已失能
    pub energy: f64,
    /// X 坐标
    pub x: f64,
    /// Y 坐标
    pub y: f64,
    /// 车身朝向（度）
    pub direction: f64,
    /// 炮塔朝向（度）
    pub gun_direction: f64,
    /// 雷达朝向（度）
    pub radar_direction: f64,
    /// 雷达扫过的角度（度）
    pub radar_sweep: f64,
    /// 当前速度（单位/回合，负值表示倒车）
    pub speed: f64,
    /// 本回合实际车身转向速率
    pub turn_rate: f64,
    /// 本回合实际炮塔转向速率
    pub gun_turn_rate: f64,
    /// 本回合实际雷达转向速率
    pub radar_turn_rate: f64,
    /// 炮管热量，大于 0 时不能开火
    pub gun_heat: f64,
    /// 剩余敌方数量
    pub enemy_count: u32,
    /// 当前生效的颜色（`None` 表示服务器默认）
    pub body_color: Option<Color>,
    pub turret_color: Option<Color>,
    pub radar_color: Option<Color>,
    pub bullet_color: Option<Color>,
    pub scan_color: Option<Color>,
    pub tracks_color: Option<Color>,
    pub gun_color: Option<Color>,
}

impl BotState {
    /// 能量耗尽时机器人失能，不能移动也不能开火
    pub fn is_disabled(&self) -> bool {
        self.energy <= 0.0
    }

    /// 校验数值字段（拒绝 NaN/无穷）
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let fields = [
            ("energy", self.energy),
            ("x", self.x),
            ("y", self.y),
            ("direction", self.direction),
            ("gun_direction", self.gun_direction),
            ("radar_direction", self.radar_direction),
            ("speed", self.speed),
            ("gun_heat", self.gun_heat),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ProtocolError::InvalidValue { field, value });
            }
        }
        Ok(())
    }
}

/// 场上一颗子弹的状态
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BulletState {
    pub bullet_id: u32,
    pub owner_id: u32,
    pub power: f64,
    pub x: f64,
    pub y: f64,
    pub direction: f64,
    pub color: Option<Color>,
}

impl BulletState {
    /// 子弹速度由火力决定
    pub fn speed(&self) -> f64 {
        crate::constants::bullet_speed(self.power)
    }
}

/// 回合快照（不可变）
///
/// 包含轮次、回合号、机器人状态、活动子弹和本回合发生的子事件（保持服务器顺序）。
///
/// # 不变量
///
/// 同一轮内回合号单调递增，新一轮重新开始计数。见 [`crate::check_turn_order`]。
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickSnapshot {
    pub round: u32,
    pub turn: u32,
    pub bot: BotState,
    pub bullets: Vec<BulletState>,
    pub events: Vec<RawEvent>,
}

impl TickSnapshot {
    /// 创建不带子弹和子事件的快照
    pub fn new(round: u32, turn: u32, bot: BotState) -> Self {
        Self {
            round,
            turn,
            bot,
            bullets: Vec::new(),
            events: Vec::new(),
        }
    }

    /// 附加子事件（构建器风格，测试和模拟器使用）
    pub fn with_event(mut self, event: RawEvent) -> Self {
        self.events.push(event);
        self
    }

    /// 附加子弹
    pub fn with_bullet(mut self, bullet: BulletState) -> Self {
        self.bullets.push(bullet);
        self
    }

    /// 本回合是否确认了一次开火
    pub fn has_bullet_fired(&self) -> bool {
        self.events.iter().any(|e| matches!(e, RawEvent::BulletFired { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_state_disabled() {
        let mut state = BotState {
            energy: 100.0,
            ..Default::default()
        };
        assert!(!state.is_disabled());
        state.energy = 0.0;
        assert!(state.is_disabled());
    }

    #[test]
    fn test_bot_state_validate_rejects_nan() {
        let state = BotState {
            x: f64::NAN,
            ..Default::default()
        };
        match state.validate() {
            Err(ProtocolError::InvalidValue { field, .. }) => assert_eq!(field, "x"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
        assert!(BotState::default().validate().is_ok());
    }

    #[test]
    fn test_snapshot_bullet_fired() {
        let snapshot = TickSnapshot::new(1, 3, BotState::default());
        assert!(!snapshot.has_bullet_fired());

        let snapshot = snapshot.with_event(RawEvent::BulletFired {
            turn: 3,
            bullet: BulletState {
                power: 2.0,
                ..Default::default()
            },
        });
        assert!(snapshot.has_bullet_fired());
        assert_eq!(snapshot.events[0].turn(), 3);
    }
}
