//! IO 循环
//!
//! 传输层把解码后的 [`ServerMessage`] 推入 crossbeam channel，
//! `io_loop` 在 IO 线程上按到达顺序逐条交给 [`MessageHandler`]。

use arena_protocol::ServerMessage;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

/// IO 循环配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// 接收超时（毫秒），超时后检查运行标志
    pub receive_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            receive_timeout_ms: 50,
        }
    }
}

/// 服务器消息处理者（由运行时实现）
pub trait MessageHandler: Send + Sync {
    /// 处理一条服务器消息（在 IO 线程上调用）
    fn handle_message(&self, message: ServerMessage);
}

/// IO 循环退出原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// 运行标志被清除
    Stopped,
    /// 收到 `Disconnected` 消息
    Disconnected,
    /// 发送端全部断开
    ChannelClosed,
}

/// IO 线程循环
///
/// # 参数
/// - `rx`: 服务器消息接收通道
/// - `handler`: 消息处理者
/// - `is_running`: 运行标志，清除后循环在下一次超时内退出
/// - `config`: 循环配置
///
/// 发送端断开时，向处理者合成一条 `Disconnected` 消息后退出。
pub fn io_loop<H>(
    rx: Receiver<ServerMessage>,
    handler: &H,
    is_running: &AtomicBool,
    config: PipelineConfig,
) -> LoopExit
where
    H: MessageHandler + ?Sized,
{
    let timeout = Duration::from_millis(config.receive_timeout_ms);

    loop {
        // Acquire: 看到 false 时也能看到其他线程的清理写入
        if !is_running.load(Ordering::Acquire) {
            trace!("IO thread: is_running flag is false, exiting");
            return LoopExit::Stopped;
        }

        match rx.recv_timeout(timeout) {
            Ok(message) => {
                let terminal = message.is_terminal();
                handler.handle_message(message);
                if terminal {
                    debug!("IO thread: server disconnected");
                    return LoopExit::Disconnected;
                }
            },
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                debug!("IO thread: message channel disconnected");
                handler.handle_message(ServerMessage::Disconnected {
                    reason: Some("message channel closed".to_string()),
                });
                return LoopExit::ChannelClosed;
            },
        }
    }
}
