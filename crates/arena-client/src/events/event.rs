//! 事件类型
//!
//! [`BotEvent`] 是交给用户处理器的事件；每个事件都带有产生时的回合号。
//! 生命周期通知（对局/轮次开始与结束）不进入事件队列，由运行时直接调用
//! [`BotBehavior`](crate::BotBehavior) 的对应方法。

use arena_protocol::{BulletState, RawEvent, TickSnapshot};
use std::sync::Arc;

/// 事件类别（优先级和可中断标志按类别配置）
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, num_enum::IntoPrimitive,
    num_enum::TryFromPrimitive,
)]
#[repr(u8)]
pub enum EventKind {
    Tick = 0,
    Death = 1,
    BotDeath = 2,
    HitBot = 3,
    HitWall = 4,
    BulletFired = 5,
    HitByBullet = 6,
    BulletHitBot = 7,
    BulletHitBullet = 8,
    BulletHitWall = 9,
    ScannedBot = 10,
    SkippedTurn = 11,
    WonRound = 12,
    Custom = 13,
    TeamMessage = 14,
}

impl EventKind {
    /// 类别总数
    pub const COUNT: usize = 15;

    pub const ALL: [EventKind; Self::COUNT] = [
        EventKind::Tick,
        EventKind::Death,
        EventKind::BotDeath,
        EventKind::HitBot,
        EventKind::HitWall,
        EventKind::BulletFired,
        EventKind::HitByBullet,
        EventKind::BulletHitBot,
        EventKind::BulletHitBullet,
        EventKind::BulletHitWall,
        EventKind::ScannedBot,
        EventKind::SkippedTurn,
        EventKind::WonRound,
        EventKind::Custom,
        EventKind::TeamMessage,
    ];

    /// 表格下标
    #[inline]
    pub fn index(self) -> usize {
        u8::from(self) as usize
    }

    /// 配置文件中使用的名称（snake_case）
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Tick => "tick",
            EventKind::Death => "death",
            EventKind::BotDeath => "bot_death",
            EventKind::HitBot => "hit_bot",
            EventKind::HitWall => "hit_wall",
            EventKind::BulletFired => "bullet_fired",
            EventKind::HitByBullet => "hit_by_bullet",
            EventKind::BulletHitBot => "bullet_hit_bot",
            EventKind::BulletHitBullet => "bullet_hit_bullet",
            EventKind::BulletHitWall => "bullet_hit_wall",
            EventKind::ScannedBot => "scanned_bot",
            EventKind::SkippedTurn => "skipped_turn",
            EventKind::WonRound => "won_round",
            EventKind::Custom => "custom",
            EventKind::TeamMessage => "team_message",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// 关键事件永远不会因过期被移除
    pub fn is_critical(self) -> bool {
        matches!(
            self,
            EventKind::Death | EventKind::WonRound | EventKind::SkippedTurn
        )
    }
}

/// 交给用户处理器的事件
#[derive(Debug, Clone, PartialEq)]
pub enum BotEvent {
    /// 每回合快照
    Tick(Arc<TickSnapshot>),

    /// 本机器人死亡
    Death { turn: u32 },

    /// 其他机器人死亡
    BotDeath { turn: u32, victim_id: u32 },

    /// 与其他机器人相撞
    HitBot {
        turn: u32,
        victim_id: u32,
        energy: f64,
        x: f64,
        y: f64,
        rammed: bool,
    },

    /// 撞墙
    HitWall { turn: u32 },

    /// 确认开火
    BulletFired { turn: u32, bullet: BulletState },

    /// 被子弹击中
    HitByBullet {
        turn: u32,
        bullet: BulletState,
        damage: f64,
        energy: f64,
    },

    /// 子弹击中其他机器人
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

    /// 扫描到其他机器人
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

    /// 错过了一个回合（意图没有及时送达）
    SkippedTurn { turn: u32 },

    /// 赢得本轮
    WonRound { turn: u32 },

    /// 自定义条件变为真
    Custom { turn: u32, name: Arc<str> },

    /// 收到队友消息
    TeamMessage {
        turn: u32,
        sender_id: u32,
        payload: String,
    },
}

impl BotEvent {
    /// 从服务器子事件转换
    ///
    /// `my_id` 用于区分自己的死亡和其他机器人的死亡。
    pub fn from_raw(raw: RawEvent, my_id: u32) -> Self {
        match raw {
            RawEvent::BotDeath { turn, victim_id } if victim_id == my_id => BotEvent::Death { turn },
            RawEvent::BotDeath { turn, victim_id } => BotEvent::BotDeath { turn, victim_id },
            RawEvent::HitBot {
                turn,
                victim_id,
                energy,
                x,
                y,
                rammed,
            } => BotEvent::HitBot {
                turn,
                victim_id,
                energy,
                x,
                y,
                rammed,
            },
            RawEvent::HitWall { turn } => BotEvent::HitWall { turn },
            RawEvent::BulletFired { turn, bullet } => BotEvent::BulletFired { turn, bullet },
            RawEvent::HitByBullet {
                turn,
                bullet,
                damage,
                energy,
            } => BotEvent::HitByBullet {
                turn,
                bullet,
                damage,
                energy,
            },
            RawEvent::BulletHitBot {
                turn,
                victim_id,
                bullet,
                damage,
                energy,
            } => BotEvent::BulletHitBot {
                turn,
                victim_id,
                bullet,
                damage,
                energy,
            },
            RawEvent::BulletHitBullet {
                turn,
                bullet,
                hit_bullet,
            } => BotEvent::BulletHitBullet {
                turn,
                bullet,
                hit_bullet,
            },
            RawEvent::BulletHitWall { turn, bullet } => BotEvent::BulletHitWall { turn, bullet },
            RawEvent::ScannedBot {
                turn,
                scanned_by_bot_id,
                scanned_bot_id,
                energy,
                x,
                y,
                direction,
                speed,
            } => BotEvent::ScannedBot {
                turn,
                scanned_by_bot_id,
                scanned_bot_id,
                energy,
                x,
                y,
                direction,
                speed,
            },
            RawEvent::WonRound { turn } => BotEvent::WonRound { turn },
            RawEvent::TeamMessage {
                turn,
                sender_id,
                payload,
            } => BotEvent::TeamMessage {
                turn,
                sender_id,
                payload,
            },
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            BotEvent::Tick(_) => EventKind::Tick,
            BotEvent::Death { .. } => EventKind::Death,
            BotEvent::BotDeath { .. } => EventKind::BotDeath,
            BotEvent::HitBot { .. } => EventKind::HitBot,
            BotEvent::HitWall { .. } => EventKind::HitWall,
            BotEvent::BulletFired { .. } => EventKind::BulletFired,
            BotEvent::HitByBullet { .. } => EventKind::HitByBullet,
            BotEvent::BulletHitBot { .. } => EventKind::BulletHitBot,
            BotEvent::BulletHitBullet { .. } => EventKind::BulletHitBullet,
            BotEvent::BulletHitWall { .. } => EventKind::BulletHitWall,
            BotEvent::ScannedBot { .. } => EventKind::ScannedBot,
            BotEvent::SkippedTurn { .. } => EventKind::SkippedTurn,
            BotEvent::WonRound { .. } => EventKind::WonRound,
            BotEvent::Custom { .. } => EventKind::Custom,
            BotEvent::TeamMessage { .. } => EventKind::TeamMessage,
        }
    }

    /// 事件产生时的回合号
    pub fn turn(&self) -> u32 {
        match self {
            BotEvent::Tick(tick) => tick.turn,
            BotEvent::Death { turn }
            | BotEvent::BotDeath { turn, .. }
            | BotEvent::HitBot { turn, .. }
            | BotEvent::HitWall { turn }
            | BotEvent::BulletFired { turn, .. }
            | BotEvent::HitByBullet { turn, .. }
            | BotEvent::BulletHitBot { turn, .. }
            | BotEvent::BulletHitBullet { turn, .. }
            | BotEvent::BulletHitWall { turn, .. }
            | BotEvent::ScannedBot { turn, .. }
            | BotEvent::SkippedTurn { turn }
            | BotEvent::WonRound { turn }
            | BotEvent::Custom { turn, .. }
            | BotEvent::TeamMessage { turn, .. } => *turn,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.kind().is_critical()
    }
}
