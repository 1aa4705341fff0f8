//! 运行时指标
//!
//! 原子计数器，可以在任何线程读取，不引入锁竞争。

use std::sync::atomic::{AtomicU64, Ordering};

/// 运行时实时指标
///
/// # 使用示例
///
/// ```rust
/// use arena_driver::RuntimeMetrics;
/// use std::sync::atomic::Ordering;
///
/// let metrics = RuntimeMetrics::new();
/// metrics.ticks_received.fetch_add(1, Ordering::Relaxed);
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.ticks_received, 1);
/// ```
#[derive(Debug, Default)]
pub struct RuntimeMetrics {
    /// 接受的 tick 总数
    pub ticks_received: AtomicU64,

    /// 因乱序或过期被丢弃的 tick 数
    pub ticks_rejected: AtomicU64,

    /// 成功发送的意图数
    pub intents_sent: AtomicU64,

    /// 同一回合重复提交被抑制的次数
    pub duplicate_sends_suppressed: AtomicU64,

    /// 意图发送失败次数
    pub send_failures: AtomicU64,

    /// 进入事件队列的事件数
    pub events_queued: AtomicU64,

    /// 队列已满时被丢弃的新事件数
    ///
    /// 如果这个值持续增长，说明事件处理器跟不上事件产生的速度。
    pub events_shed: AtomicU64,

    /// 因过期被移除的事件数
    pub events_evicted: AtomicU64,

    /// 事件处理器返回错误或 panic 的次数
    pub handler_failures: AtomicU64,

    /// 服务器报告的错过回合数
    pub skipped_turns: AtomicU64,
}

impl RuntimeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取指标快照
    ///
    /// 各计数器分别读取，不同计数器之间可能有微小的时间差。
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ticks_received: self.ticks_received.load(Ordering::Relaxed),
            ticks_rejected: self.ticks_rejected.load(Ordering::Relaxed),
            intents_sent: self.intents_sent.load(Ordering::Relaxed),
            duplicate_sends_suppressed: self.duplicate_sends_suppressed.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            events_queued: self.events_queued.load(Ordering::Relaxed),
            events_shed: self.events_shed.load(Ordering::Relaxed),
            events_evicted: self.events_evicted.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
            skipped_turns: self.skipped_turns.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器
    pub fn reset(&self) {
        self.ticks_received.store(0, Ordering::Relaxed);
        self.ticks_rejected.store(0, Ordering::Relaxed);
        self.intents_sent.store(0, Ordering::Relaxed);
        self.duplicate_sends_suppressed.store(0, Ordering::Relaxed);
        self.send_failures.store(0, Ordering::Relaxed);
        self.events_queued.store(0, Ordering::Relaxed);
        self.events_shed.store(0, Ordering::Relaxed);
        self.events_evicted.store(0, Ordering::Relaxed);
        self.handler_failures.store(0, Ordering::Relaxed);
        self.skipped_turns.store(0, Ordering::Relaxed);
    }
}

/// 指标快照（不可变）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub ticks_received: u64,
    pub ticks_rejected: u64,
    pub intents_sent: u64,
    pub duplicate_sends_suppressed: u64,
    pub send_failures: u64,
    pub events_queued: u64,
    pub events_shed: u64,
    pub events_evicted: u64,
    pub handler_failures: u64,
    pub skipped_turns: u64,
}

impl MetricsSnapshot {
    /// 事件丢弃率（百分比）
    ///
    /// 返回 0.0 到 100.0 之间的值。如果没有任何事件，返回 0.0。
    pub fn shed_rate(&self) -> f64 {
        let total = self.events_queued + self.events_shed;
        if total == 0 {
            return 0.0;
        }
        (self.events_shed as f64 / total as f64) * 100.0
    }

    /// 错过回合率（百分比，相对于接受的 tick 数）
    pub fn skipped_turn_rate(&self) -> f64 {
        if self.ticks_received == 0 {
            return 0.0;
        }
        (self.skipped_turns as f64 / self.ticks_received as f64) * 100.0
    }
}
