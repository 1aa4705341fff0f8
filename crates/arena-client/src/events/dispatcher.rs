//! 事件分发器
//!
//! 分发在调用 `go()` 的工作线程上同步执行，处理器运行期间不持有任何锁，
//! 因此处理器内部可以再次调用阻塞原语（嵌套分发）。
//!
//! # 抢占
//!
//! 分发器记录"当前活动事件"（类别 + 优先级）。嵌套分发时：
//!
//! - 待分发事件优先级低于活动事件：本轮停止
//! - 与活动事件同类：如果活动处理器已标记可中断，清除标志并返回
//!   [`Halt::Interrupted`]，让活动处理器尽快返回；否则本轮停止
//! - 否则（更高优先级，或优先级相同但类别不同）：嵌套执行该事件的处理器

use super::condition::{Condition, ConditionSet};
use super::event::{BotEvent, EventKind};
use super::policy::EventPolicy;
use super::queue::{EventBatch, EventQueue};
use crate::types::{BotError, Halt};
use arena_driver::RuntimeMetrics;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::Ordering;
use tracing::{trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveEvent {
    kind: EventKind,
    priority: i32,
}

/// 事件分发器
#[derive(Debug)]
pub struct EventDispatcher {
    queue: Mutex<EventQueue>,
    policy: Mutex<EventPolicy>,
    active: Mutex<Option<ActiveEvent>>,
    conditions: Mutex<ConditionSet>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(EventQueue::default(), EventPolicy::default())
    }
}

impl EventDispatcher {
    pub fn new(queue: EventQueue, policy: EventPolicy) -> Self {
        Self {
            queue: Mutex::new(queue),
            policy: Mutex::new(policy),
            active: Mutex::new(None),
            conditions: Mutex::new(ConditionSet::default()),
        }
    }

    /// 加入一批事件（IO 线程调用）
    pub fn enqueue(&self, batch: EventBatch, metrics: &RuntimeMetrics) {
        if batch.is_empty() {
            return;
        }
        let (accepted, shed) = self.queue.lock().push_batch(batch);
        metrics
            .events_queued
            .fetch_add(accepted as u64, Ordering::Relaxed);
        if shed > 0 {
            metrics.events_shed.fetch_add(shed as u64, Ordering::Relaxed);
        }
    }

    /// 待分发事件数
    pub fn pending_len(&self) -> usize {
        self.queue.lock().len()
    }

    /// 新一轮开始：清空队列、条件、活动事件和可中断标志（优先级保留）
    pub fn reset_round(&self) {
        self.queue.lock().clear();
        self.conditions.lock().clear();
        *self.active.lock() = None;
        self.policy.lock().reset_interruptible();
    }

    pub fn priority(&self, kind: EventKind) -> i32 {
        self.policy.lock().priority(kind)
    }

    pub fn set_priority(&self, kind: EventKind, priority: i32) {
        self.policy.lock().set_priority(kind, priority);
    }

    /// 当前正在执行的处理器对应的事件类别
    pub fn current_kind(&self) -> Option<EventKind> {
        self.active.lock().map(|active| active.kind)
    }

    /// 设置当前活动事件类别的可中断标志
    ///
    /// 只能在处理器执行期间设置；没有活动事件时返回 `false`。
    pub fn set_interruptible(&self, interruptible: bool) -> bool {
        let Some(kind) = self.current_kind() else {
            return false;
        };
        self.policy.lock().set_interruptible(kind, interruptible);
        true
    }

    pub fn is_interruptible(&self, kind: EventKind) -> bool {
        self.policy.lock().is_interruptible(kind)
    }

    pub fn add_condition(&self, condition: Condition) -> bool {
        self.conditions.lock().add(condition)
    }

    pub fn remove_condition(&self, name: &str) -> bool {
        self.conditions.lock().remove(name)
    }

    /// 评估条件并生成本回合的 `Custom` 事件
    pub fn evaluate_conditions(&self, tick: &arena_protocol::TickSnapshot) -> EventBatch {
        self.conditions
            .lock()
            .evaluate(tick)
            .into_iter()
            .map(|name| BotEvent::Custom {
                turn: tick.turn,
                name,
            })
            .collect()
    }

    /// 执行一轮分发
    ///
    /// `handler` 的普通错误和 panic 被记录后丢弃；`Interrupted` 表示处理器被要求
    /// 提前返回，同样被吸收。`Canceled`/`ForeignThread` 立即向上返回。
    pub fn dispatch<F>(
        &self,
        current_turn: u32,
        metrics: &RuntimeMetrics,
        mut handler: F,
    ) -> Result<(), Halt>
    where
        F: FnMut(&BotEvent) -> Result<(), BotError>,
    {
        let evicted = self.queue.lock().evict_stale(current_turn);
        if evicted > 0 {
            metrics
                .events_evicted
                .fetch_add(evicted as u64, Ordering::Relaxed);
        }

        loop {
            let (event, kind, priority) = {
                let mut queue = self.queue.lock();
                let mut policy = self.policy.lock();
                queue.sort(&policy);

                let Some(next) = queue.peek() else {
                    break;
                };
                let kind = next.kind();
                let priority = policy.priority(kind);

                if let Some(active) = *self.active.lock() {
                    if priority < active.priority {
                        break;
                    }
                    if kind == active.kind {
                        if policy.is_interruptible(kind) {
                            policy.set_interruptible(kind, false);
                            trace!("Interrupting {:?} handler", kind);
                            return Err(Halt::Interrupted);
                        }
                        break;
                    }
                }

                let Some(event) = queue.pop_front() else {
                    break;
                };
                (event, kind, priority)
            };

            let previous = self.active.lock().replace(ActiveEvent { kind, priority });
            let outcome = catch_unwind(AssertUnwindSafe(|| handler(&event)));
            self.policy.lock().set_interruptible(kind, false);
            *self.active.lock() = previous;

            match outcome {
                Ok(Ok(())) => {},
                Ok(Err(err)) => match err.halt() {
                    Some(Halt::Interrupted) => {
                        trace!("{:?} handler yielded after interrupt", kind);
                    },
                    Some(halt) => return Err(halt),
                    None => {
                        warn!("{:?} handler failed: {}", kind, err);
                        metrics.handler_failures.fetch_add(1, Ordering::Relaxed);
                    },
                },
                Err(payload) => {
                    warn!("{:?} handler panicked: {}", kind, panic_message(payload.as_ref()));
                    metrics.handler_failures.fetch_add(1, Ordering::Relaxed);
                },
            }
        }

        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}
