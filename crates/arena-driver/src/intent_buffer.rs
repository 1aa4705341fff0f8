//! 意图缓冲区
//!
//! 工作线程上的用户代码通过 setter 修改意图，`commit` 在同一把锁内完成
//! 去重检查、发送和瞬态字段清理。同一回合最多发送一次。
//!
//! `on_sent` 回调在锁释放之后执行，拿到的是已发送意图的副本，
//! 因此回调内部可以再次读写缓冲区。

use crate::error::DriverError;
use crate::link::ServerLink;
use arena_protocol::BotIntent;
use parking_lot::Mutex;
use tracing::{trace, warn};

/// 提交结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// 本回合的意图已发送
    Sent,
    /// 本回合已经发送过，本次提交被忽略
    AlreadySent,
}

#[derive(Debug, Default)]
struct IntentSlot {
    intent: BotIntent,
    /// 最后一次发送对应的 (轮次, 回合)
    last_sent: Option<(u32, u32)>,
}

/// 线程安全的意图缓冲区
#[derive(Debug, Default)]
pub struct IntentBuffer {
    slot: Mutex<IntentSlot>,
}

impl IntentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在锁内修改意图
    pub fn update<R>(&self, f: impl FnOnce(&mut BotIntent) -> R) -> R {
        f(&mut self.slot.lock().intent)
    }

    /// 在锁内读取意图
    pub fn read<R>(&self, f: impl FnOnce(&BotIntent) -> R) -> R {
        f(&self.slot.lock().intent)
    }

    /// 当前意图的副本
    pub fn snapshot(&self) -> BotIntent {
        self.slot.lock().intent.clone()
    }

    /// 最后一次发送的 (轮次, 回合)
    pub fn last_sent(&self) -> Option<(u32, u32)> {
        self.slot.lock().last_sent
    }

    /// 重置为中性意图并清除发送记录（新一轮开始时调用）
    pub fn reset(&self) {
        let mut slot = self.slot.lock();
        slot.intent.reset();
        slot.last_sent = None;
    }

    /// 发送指定回合的意图
    ///
    /// - 如果该回合已经发送过，返回 `AlreadySent`，不访问连接
    /// - 发送成功后清空瞬态字段，释放锁，再用已发送内容的副本调用 `on_sent`
    /// - 发送失败时不记录发送，同一回合可以重试
    pub fn commit<F>(
        &self,
        round: u32,
        turn: u32,
        link: &dyn ServerLink,
        on_sent: F,
    ) -> Result<CommitOutcome, DriverError>
    where
        F: FnOnce(&BotIntent),
    {
        let sent = {
            let mut slot = self.slot.lock();
            if slot.last_sent == Some((round, turn)) {
                trace!("Intent for round {} turn {} already sent", round, turn);
                return Ok(CommitOutcome::AlreadySent);
            }

            if let Err(e) = link.send_intent(turn, &slot.intent) {
                warn!("Failed to send intent for turn {}: {}", turn, e);
                return Err(e.into());
            }

            slot.last_sent = Some((round, turn));
            let sent = slot.intent.clone();
            slot.intent.clear_transient();
            sent
        };

        on_sent(&sent);
        Ok(CommitOutcome::Sent)
    }
}
