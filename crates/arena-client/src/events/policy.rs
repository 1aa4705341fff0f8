//! 分发策略
//!
//! 每个机器人实例持有自己的优先级表和可中断标志表，构造时从默认表复制。

use super::event::EventKind;

/// 默认优先级（数值越大越先分发）
pub fn default_priority(kind: EventKind) -> i32 {
    match kind {
        EventKind::WonRound => 150,
        EventKind::SkippedTurn => 140,
        EventKind::Tick => 130,
        EventKind::Custom => 120,
        EventKind::TeamMessage => 110,
        EventKind::BotDeath => 100,
        EventKind::BulletHitWall => 90,
        EventKind::BulletHitBullet => 80,
        EventKind::BulletHitBot => 70,
        EventKind::BulletFired => 60,
        EventKind::HitByBullet => 50,
        EventKind::HitWall => 40,
        EventKind::HitBot => 30,
        EventKind::ScannedBot => 20,
        EventKind::Death => 10,
    }
}

/// 单个实例的分发策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPolicy {
    priorities: [i32; EventKind::COUNT],
    interruptible: [bool; EventKind::COUNT],
}

impl Default for EventPolicy {
    fn default() -> Self {
        let mut priorities = [0; EventKind::COUNT];
        for kind in EventKind::ALL {
            priorities[kind.index()] = default_priority(kind);
        }
        Self {
            priorities,
            interruptible: [false; EventKind::COUNT],
        }
    }
}

impl EventPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn priority(&self, kind: EventKind) -> i32 {
        self.priorities[kind.index()]
    }

    pub fn set_priority(&mut self, kind: EventKind, priority: i32) {
        self.priorities[kind.index()] = priority;
    }

    pub fn is_interruptible(&self, kind: EventKind) -> bool {
        self.interruptible[kind.index()]
    }

    pub fn set_interruptible(&mut self, kind: EventKind, interruptible: bool) {
        self.interruptible[kind.index()] = interruptible;
    }

    /// 清除所有可中断标志（优先级保留）
    pub fn reset_interruptible(&mut self) {
        self.interruptible = [false; EventKind::COUNT];
    }
}
