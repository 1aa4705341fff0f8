//! 解码后的服务器消息
//!
//! 传输层把每条服务器消息解码为 `ServerMessage`，通过通道交给运行时的 IO 循环。

use crate::setup::GameSetup;
use crate::snapshot::TickSnapshot;

/// 服务器消息
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ServerMessage {
    /// 对局开始（运行时收到后回复 ready）
    GameStarted(GameSetup),
    /// 新一轮开始
    RoundStarted { round: u32 },
    /// 每回合快照
    Tick(TickSnapshot),
    /// 服务器通知本机器人错过了某个回合（意图未及时送达）
    SkippedTurn { turn: u32 },
    /// 本轮结束
    RoundEnded { round: u32, turn: u32 },
    /// 对局结束
    GameEnded { rounds: u32 },
    /// 对局被中止
    GameAborted,
    /// 连接断开（传输层合成）
    Disconnected { reason: Option<String> },
}

impl ServerMessage {
    /// 是否为终止 IO 循环的消息
    pub fn is_terminal(&self) -> bool {
        matches!(self, ServerMessage::Disconnected { .. })
    }
}
