//! 待分发事件队列
//!
//! 有界：队列满时丢弃新事件（不阻塞 IO 线程）。

use super::event::BotEvent;
use super::policy::EventPolicy;
use smallvec::SmallVec;
use tracing::{trace, warn};

/// 单个 tick 产生的事件批（栈上预留 8 个位置，通常足够）
pub type EventBatch = SmallVec<[BotEvent; 8]>;

/// 默认队列容量
pub const MAX_QUEUE_SIZE: usize = 256;

/// 默认最大事件年龄（回合）
pub const MAX_EVENT_AGE: u32 = 2;

/// 待分发事件队列
#[derive(Debug)]
pub struct EventQueue {
    pending: Vec<BotEvent>,
    max_size: usize,
    max_age: u32,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(MAX_QUEUE_SIZE, MAX_EVENT_AGE)
    }
}

impl EventQueue {
    pub fn new(max_size: usize, max_age: u32) -> Self {
        Self {
            pending: Vec::with_capacity(max_size.min(MAX_QUEUE_SIZE)),
            max_size,
            max_age,
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// 加入一个事件；队列已满时丢弃并返回 `false`
    pub fn push(&mut self, event: BotEvent) -> bool {
        if self.pending.len() >= self.max_size {
            warn!(
                "Event queue full ({} events), dropping {:?} event for turn {}",
                self.max_size,
                event.kind(),
                event.turn()
            );
            return false;
        }
        self.pending.push(event);
        true
    }

    /// 加入一批事件，返回 (接受数, 丢弃数)
    pub fn push_batch(&mut self, batch: EventBatch) -> (usize, usize) {
        let mut accepted = 0;
        let mut shed = 0;
        for event in batch {
            if self.push(event) {
                accepted += 1;
            } else {
                shed += 1;
            }
        }
        (accepted, shed)
    }

    /// 移除过期的非关键事件（`turn + max_age < current_turn`），返回移除数量
    pub fn evict_stale(&mut self, current_turn: u32) -> usize {
        let max_age = self.max_age;
        let before = self.pending.len();
        self.pending.retain(|event| {
            let stale = event.turn().saturating_add(max_age) < current_turn;
            if stale && !event.is_critical() {
                trace!(
                    "Evicting stale {:?} event from turn {} (now {})",
                    event.kind(),
                    event.turn(),
                    current_turn
                );
                false
            } else {
                true
            }
        });
        before - self.pending.len()
    }

    /// 按 (回合升序, 优先级降序) 排序；稳定排序保持同级事件的到达顺序
    pub fn sort(&mut self, policy: &EventPolicy) {
        self.pending
            .sort_by_key(|event| (event.turn(), std::cmp::Reverse(policy.priority(event.kind()))));
    }

    /// 队首事件（排序后）
    pub fn peek(&self) -> Option<&BotEvent> {
        self.pending.first()
    }

    /// 取出队首事件
    pub fn pop_front(&mut self) -> Option<BotEvent> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// 当前所有事件（调试用）
    pub fn iter(&self) -> impl Iterator<Item = &BotEvent> {
        self.pending.iter()
    }
}
