//! 服务器连接抽象
//!
//! 运行时只通过 [`ServerLink`] 向服务器发送数据，WebSocket 和 JSON 编码由实现方负责。

use crate::error::LinkError;
use arena_protocol::BotIntent;

/// 出站服务器连接
///
/// 两个方法都可能在不同线程上调用（ready 在 IO 线程，意图在工作线程），
/// 因此要求 `Send + Sync`。
pub trait ServerLink: Send + Sync {
    /// 发送某回合的意图
    fn send_intent(&self, turn: u32, intent: &BotIntent) -> Result<(), LinkError>;

    /// 通知服务器机器人已准备好（收到 GameStarted 后调用）
    fn send_ready(&self) -> Result<(), LinkError>;
}

#[cfg(any(test, feature = "mock"))]
pub use mock::MockLink;

#[cfg(any(test, feature = "mock"))]
mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    /// 记录所有发送内容的内存连接（测试用）
    #[derive(Debug, Default)]
    pub struct MockLink {
        sent: Mutex<Vec<(u32, BotIntent)>>,
        ready_count: AtomicU64,
        should_fail: AtomicBool,
    }

    impl MockLink {
        pub fn new() -> Self {
            Self::default()
        }

        /// 让后续发送返回 `LinkError::Closed`
        pub fn set_should_fail(&self, fail: bool) {
            self.should_fail.store(fail, Ordering::Relaxed);
        }

        /// 已发送的 (回合, 意图) 列表
        pub fn sent(&self) -> Vec<(u32, BotIntent)> {
            self.sent.lock().clone()
        }

        /// 已发送的回合号列表
        pub fn sent_turns(&self) -> Vec<u32> {
            self.sent.lock().iter().map(|(turn, _)| *turn).collect()
        }

        pub fn last_sent(&self) -> Option<(u32, BotIntent)> {
            self.sent.lock().last().cloned()
        }

        pub fn sent_count(&self) -> usize {
            self.sent.lock().len()
        }

        pub fn ready_count(&self) -> u64 {
            self.ready_count.load(Ordering::Relaxed)
        }
    }

    impl ServerLink for MockLink {
        fn send_intent(&self, turn: u32, intent: &BotIntent) -> Result<(), LinkError> {
            if self.should_fail.load(Ordering::Relaxed) {
                return Err(LinkError::Closed);
            }
            self.sent.lock().push((turn, intent.clone()));
            Ok(())
        }

        fn send_ready(&self) -> Result<(), LinkError> {
            if self.should_fail.load(Ordering::Relaxed) {
                return Err(LinkError::Closed);
            }
            self.ready_count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_mock_link_records() {
            let link = MockLink::new();
            link.send_ready().unwrap();
            link.send_intent(3, &BotIntent::default()).unwrap();
            link.send_intent(4, &BotIntent::default()).unwrap();

            assert_eq!(link.ready_count(), 1);
            assert_eq!(link.sent_turns(), vec![3, 4]);
            assert_eq!(link.last_sent().map(|(turn, _)| turn), Some(4));
        }

        #[test]
        fn test_mock_link_failure() {
            let link = MockLink::new();
            link.set_should_fail(true);
            assert_eq!(
                link.send_intent(1, &BotIntent::default()),
                Err(LinkError::Closed)
            );
            assert_eq!(link.send_ready(), Err(LinkError::Closed));
            assert_eq!(link.sent_count(), 0);
        }
    }
}
