//! 原始子事件
//!
//! 服务器在每个 tick 内附带的事件列表。这里的类型只描述"发生了什么"，
//! 优先级、过期和分发策略由客户端层的事件分发器决定。

use crate::snapshot::BulletState;

/// 服务器下发的原始子事件
///
/// 每个事件都携带其产生时的回合号。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RawEvent {
    /// 某个机器人死亡（可能是自己）
    BotDeath { turn: u32, victim_id: u32 },

    /// 与其他机器人相撞
    HitBot {
        turn: u32,
        victim_id: u32,
        energy: f64,
        x: f64,
        y: f64,
        /// 是否由本机器人主动撞击
        rammed: bool,
    },

    /// 撞墙
    HitWall { turn: u32 },

    /// 本机器人发射了一颗子弹（确认开火）
    BulletFired { turn: u32, bullet: BulletState },

    /// 被子弹击中
    HitByBullet {
        turn: u32,
        bullet: BulletState,
        damage: f64,
        energy: f64,
    },

    /// 本机器人的子弹击中了其他机器人
    BulletHitBot {
        turn: u32,
        victim_id: u32,
        bullet: BulletState,
        damage: f64,
        energy: f64,
    },

    /// 子弹相撞
    BulletHitBullet {
        turn: u32,
        bullet: BulletState,
        hit_bullet: BulletState,
    },

    /// 子弹击中墙壁
    BulletHitWall { turn: u32, bullet: BulletState },

    /// 雷达扫描到其他机器人
    ScannedBot {
        turn: u32,
        scanned_by_bot_id: u32,
        scanned_bot_id: u32,
        energy: f64,
        x: f64,
        y: f64,
        direction: f64,
        speed: f64,
    },

    /// 赢得本轮
    WonRound { turn: u32 },

    /// 收到队友消息（负载已由传输层解码为文本）
    TeamMessage {
        turn: u32,
        sender_id: u32,
        payload: String,
    },
}

impl RawEvent {
    /// 事件产生时的回合号
    pub fn turn(&self) -> u32 {
        match self {
            RawEvent::BotDeath { turn, .. }
            | RawEvent::HitBot { turn, .. }
            | RawEvent::HitWall { turn }
            | RawEvent::BulletFired { turn, .. }
            | RawEvent::HitByBullet { turn, .. }
            | RawEvent::BulletHitBot { turn, .. }
            | RawEvent::BulletHitBullet { turn, .. }
            | RawEvent::BulletHitWall { turn, .. }
            | RawEvent::ScannedBot { turn, .. }
            | RawEvent::WonRound { turn }
            | RawEvent::TeamMessage { turn, .. } => *turn,
        }
    }
}
