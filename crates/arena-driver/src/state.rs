//! 共享回合上下文
//!
//! IO 线程写入最新快照，任意线程无锁读取（ArcSwap）。

use crate::hooks::HookManager;
use crate::metrics::RuntimeMetrics;
use arc_swap::ArcSwapOption;
use arena_protocol::{BotIntent, GameSetup, ProtocolError, TickSnapshot, check_turn_order};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::warn;

/// 共享回合上下文
///
/// # 写入者
///
/// 只有 IO 线程调用 [`TurnContext::accept_tick`]、[`TurnContext::begin_round`] 和
/// [`TurnContext::store_setup`]，读取可以来自任意线程。
#[derive(Default)]
pub struct TurnContext {
    tick: ArcSwapOption<TickSnapshot>,
    setup: ArcSwapOption<GameSetup>,
    /// 当前轮次（早于它的快照一律丢弃）
    round: AtomicU32,
    /// 运行时钩子
    pub hooks: RwLock<HookManager>,
    /// 运行时指标
    pub metrics: RuntimeMetrics,
}

impl TurnContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 最新快照
    pub fn current_tick(&self) -> Option<Arc<TickSnapshot>> {
        self.tick.load_full()
    }

    /// 对局配置
    pub fn setup(&self) -> Option<Arc<GameSetup>> {
        self.setup.load_full()
    }

    pub fn store_setup(&self, setup: GameSetup) {
        self.setup.store(Some(Arc::new(setup)));
    }

    /// 当前轮次
    pub fn round(&self) -> u32 {
        self.round.load(Ordering::Acquire)
    }

    /// 进入新的一轮：记录轮次并丢弃上一轮的快照
    pub fn begin_round(&self, round: u32) {
        self.round.store(round, Ordering::Release);
        self.tick.store(None);
    }

    /// 接受一个快照并记录为当前快照
    ///
    /// 拒绝以下快照（调用方应丢弃）：
    /// - 属于已经结束的轮次
    /// - 同一轮内回合号没有递增
    /// - 机器人状态包含 NaN/无穷
    pub fn accept_tick(&self, tick: TickSnapshot) -> Result<Arc<TickSnapshot>, ProtocolError> {
        let floor = self.round();
        if tick.round < floor {
            self.metrics.ticks_rejected.fetch_add(1, Ordering::Relaxed);
            return Err(ProtocolError::StaleRound {
                expected: floor,
                actual: tick.round,
            });
        }

        let last = self.tick.load_full().map(|t| (t.round, t.turn));
        if let Err(e) = check_turn_order(last, tick.round, tick.turn).and(tick.bot.validate()) {
            warn!("Rejecting tick {}/{}: {}", tick.round, tick.turn, e);
            self.metrics.ticks_rejected.fetch_add(1, Ordering::Relaxed);
            return Err(e);
        }

        if tick.round > floor {
            self.round.store(tick.round, Ordering::Release);
        }
        let tick = Arc::new(tick);
        self.tick.store(Some(tick.clone()));
        self.metrics.ticks_received.fetch_add(1, Ordering::Relaxed);
        Ok(tick)
    }

    /// 触发 tick 钩子
    ///
    /// 使用 `try_read`：如果钩子列表正在被修改，本次跳过，IO 线程不等待。
    pub fn trigger_tick_hooks(&self, tick: &TickSnapshot) {
        if let Some(hooks) = self.hooks.try_read() {
            hooks.trigger_tick(tick);
        }
    }

    /// 触发发送钩子
    pub fn trigger_sent_hooks(&self, turn: u32, intent: &BotIntent) {
        if let Some(hooks) = self.hooks.try_read() {
            hooks.trigger_sent(turn, intent);
        }
    }
}
