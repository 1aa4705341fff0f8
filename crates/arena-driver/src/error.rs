//! 驱动层错误类型定义

use arena_protocol::ProtocolError;
use thiserror::Error;

/// 服务器连接错误
///
/// 由 [`ServerLink`](crate::ServerLink) 的实现返回。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// 连接已关闭
    #[error("Server link closed")]
    Closed,

    /// 底层传输错误
    #[error("Transport error: {0}")]
    Transport(String),
}

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 服务器连接错误
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// 协议错误（乱序快照等）
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 工作线程已被取消（本轮结束、机器人死亡或运行时停止）
    #[error("Worker canceled")]
    Canceled,

    /// 阻塞调用来自非工作线程
    #[error("Blocking call issued from a thread other than the bot worker")]
    ForeignThread,

    /// 工作线程创建失败
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(String),

    /// 操作超时
    #[error("Operation timeout")]
    Timeout,
}

impl DriverError {
    /// 是否为控制流信号（而非真正的故障）
    ///
    /// `Canceled` 只是通知工作线程尽快退出，调用方不应把它当作错误记录。
    pub fn is_control_signal(&self) -> bool {
        matches!(self, DriverError::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_display() {
        let msg = format!("{}", DriverError::Link(LinkError::Closed));
        assert_eq!(msg, "Link error: Server link closed");

        let msg = format!("{}", DriverError::Canceled);
        assert_eq!(msg, "Worker canceled");

        let msg = format!("{}", DriverError::Spawn("no threads".to_string()));
        assert!(msg.contains("spawn") && msg.contains("no threads"));

        let msg = format!("{}", DriverError::Timeout);
        assert_eq!(msg, "Operation timeout");
    }

    #[test]
    fn test_from_link_error() {
        let err: DriverError = LinkError::Transport("broken pipe".into()).into();
        match err {
            DriverError::Link(LinkError::Transport(reason)) => assert_eq!(reason, "broken pipe"),
            other => panic!("Expected Link variant, got {:?}", other),
        }
    }

    #[test]
    fn test_from_protocol_error() {
        let err: DriverError = ProtocolError::NonMonotonicTurn {
            round: 1,
            last: 5,
            got: 5,
        }
        .into();
        match err {
            DriverError::Protocol(ProtocolError::NonMonotonicTurn { last, got, .. }) => {
                assert_eq!((last, got), (5, 5));
            },
            other => panic!("Expected Protocol variant, got {:?}", other),
        }
    }

    #[test]
    fn test_control_signal() {
        assert!(DriverError::Canceled.is_control_signal());
        assert!(!DriverError::ForeignThread.is_control_signal());
        assert!(!DriverError::Timeout.is_control_signal());
    }
}
