//! 回合钩子
//!
//! 在 tick 到达和意图发送成功时触发自定义回调，用于录制对局或外部监控。
//!
//! 回调在 IO 线程（tick）或工作线程（意图发送）上同步执行，
//! 实现应尽快返回；耗时处理请通过 channel 转交给其他线程。
//!
//! # 使用示例
//!
//! ```rust
//! use arena_driver::hooks::{HookManager, TurnCallback};
//! use arena_protocol::TickSnapshot;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! #[derive(Default)]
//! struct LastTurn(AtomicU32);
//!
//! impl TurnCallback for LastTurn {
//!     fn on_tick_received(&self, tick: &TickSnapshot) {
//!         self.0.store(tick.turn, Ordering::Relaxed);
//!     }
//! }
//!
//! let last = Arc::new(LastTurn::default());
//! let mut hooks = HookManager::new();
//! hooks.add_callback(last.clone());
//!
//! let mut tick = TickSnapshot::default();
//! tick.turn = 42;
//! hooks.trigger_tick(&tick);
//! assert_eq!(last.0.load(Ordering::Relaxed), 42);
//! ```

use arena_protocol::{BotIntent, TickSnapshot};
use std::sync::Arc;

/// 回合回调 Trait
pub trait TurnCallback: Send + Sync {
    /// 当 tick 被接受并记录为当前快照后调用
    fn on_tick_received(&self, tick: &TickSnapshot);

    /// 当某回合的意图发送成功后调用（可选）
    ///
    /// 仅在 [`ServerLink::send_intent`](crate::ServerLink::send_intent) 成功后触发，
    /// 此时瞬态字段（队伍消息、输出）尚未清空。
    fn on_intent_sent(&self, turn: u32, intent: &BotIntent) {
        let _ = (turn, intent);
    }
}

/// 钩子管理器
///
/// 回调列表本身不是线程安全的，需要外部同步（通常通过 `RwLock<HookManager>`）。
#[derive(Default)]
pub struct HookManager {
    callbacks: Vec<Arc<dyn TurnCallback>>,
}

impl HookManager {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// 添加回调
    pub fn add_callback(&mut self, callback: Arc<dyn TurnCallback>) {
        self.callbacks.push(callback);
    }

    /// 移除所有回调
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// 触发所有 tick 回调
    pub fn trigger_tick(&self, tick: &TickSnapshot) {
        for callback in self.callbacks.iter() {
            callback.on_tick_received(tick);
        }
    }

    /// 触发所有发送回调
    pub fn trigger_sent(&self, turn: u32, intent: &BotIntent) {
        for callback in self.callbacks.iter() {
            callback.on_intent_sent(turn, intent);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{Sender, bounded};
    use std::sync::atomic::{AtomicU64, Ordering};

    struct TestCallback {
        tx: Sender<u32>,
        count: Arc<AtomicU64>,
    }

    impl TurnCallback for TestCallback {
        fn on_tick_received(&self, tick: &TickSnapshot) {
            let _ = self.tx.try_send(tick.turn);
            self.count.fetch_add(1, Ordering::Relaxed);
        }

        fn on_intent_sent(&self, turn: u32, _intent: &BotIntent) {
            let _ = self.tx.try_send(turn);
            self.count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// 只实现必需方法的回调，发送回调走默认实现
    struct TickOnly(Arc<AtomicU64>);

    impl TurnCallback for TickOnly {
        fn on_tick_received(&self, _tick: &TickSnapshot) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_hook_manager_add_and_clear() {
        let mut hooks = HookManager::new();
        assert!(hooks.is_empty());

        let (tx, _rx) = bounded(10);
        let count = Arc::new(AtomicU64::new(0));
        hooks.add_callback(Arc::new(TestCallback { tx, count }));
        assert_eq!(hooks.len(), 1);

        hooks.clear();
        assert!(hooks.is_empty());
    }

    #[test]
    fn test_hook_manager_trigger_tick() {
        let mut hooks = HookManager::new();
        let (tx, rx) = bounded::<u32>(10);
        let count = Arc::new(AtomicU64::new(0));
        hooks.add_callback(Arc::new(TestCallback {
            tx,
            count: count.clone(),
        }));

        let tick = TickSnapshot {
            round: 1,
            turn: 17,
            ..Default::default()
        };
        hooks.trigger_tick(&tick);

        assert_eq!(count.load(Ordering::Relaxed), 1);
        assert_eq!(rx.try_recv(), Ok(17));
    }

    #[test]
    fn test_hook_manager_trigger_sent_default_noop() {
        let mut hooks = HookManager::new();
        let (tx, rx) = bounded::<u32>(10);
        let count = Arc::new(AtomicU64::new(0));
        let tick_only = Arc::new(AtomicU64::new(0));
        hooks.add_callback(Arc::new(TestCallback {
            tx,
            count: count.clone(),
        }));
        hooks.add_callback(Arc::new(TickOnly(tick_only.clone())));

        hooks.trigger_sent(9, &BotIntent::default());

        assert_eq!(count.load(Ordering::Relaxed), 1);
        assert_eq!(rx.try_recv(), Ok(9));
        assert_eq!(tick_only.load(Ordering::Relaxed), 0);
    }
}
