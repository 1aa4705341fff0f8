//! 竞技场物理常量
//!
//! 集中定义所有与服务器物理模型相关的常量，避免在代码中散落"魔法数"。
//! 服务器是物理规则的最终裁决者，这里的值只用于客户端的预测和限幅。

/// 最大速度（单位/回合）
pub const MAX_SPEED: f64 = 8.0;

/// 加速度（单位/回合²）
pub const ACCELERATION: f64 = 1.0;

/// 减速度（单位/回合²，负值）
pub const DECELERATION: f64 = -2.0;

/// 减速度绝对值
pub const ABS_DECELERATION: f64 = 2.0;

/// 车身最大转向速率（度/回合）
pub const MAX_TURN_RATE: f64 = 10.0;

/// 炮塔最大转向速率（度/回合）
pub const MAX_GUN_TURN_RATE: f64 = 20.0;

/// 雷达最大转向速率（度/回合）
pub const MAX_RADAR_TURN_RATE: f64 = 45.0;

/// 最小火力
///
/// 低于此值的开火请求视为"不开火"。
pub const MIN_FIREPOWER: f64 = 0.1;

/// 最大火力
pub const MAX_FIREPOWER: f64 = 3.0;

/// 每回合最多发送的队伍消息数量
pub const MAX_TEAM_MESSAGES_PER_TURN: usize = 10;

/// 机器人包围圆半径
pub const BOUNDING_CIRCLE_RADIUS: f64 = 18.0;

/// 雷达扫描半径
pub const SCAN_RADIUS: f64 = 1200.0;

/// 根据火力计算子弹速度
///
/// `speed = 20 - 3 * firepower`，火力会先被限制在 `[MIN_FIREPOWER, MAX_FIREPOWER]`。
pub fn bullet_speed(firepower: f64) -> f64 {
    20.0 - 3.0 * firepower.clamp(MIN_FIREPOWER, MAX_FIREPOWER)
}

/// 根据火力计算开火后产生的炮管热量
///
/// `heat = 1 + firepower / 5`
pub fn gun_heat(firepower: f64) -> f64 {
    1.0 + firepower.clamp(MIN_FIREPOWER, MAX_FIREPOWER) / 5.0
}
