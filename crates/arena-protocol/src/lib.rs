//! # Arena Protocol
//!
//! 竞技场机器人协议层的数据模型（无传输依赖）
//!
//! ## 模块
//!
//! - `constants`: 物理常量（速度、加速度、转向速率、火力范围）
//! - `snapshot`: 每回合快照（机器人状态、子弹列表、子事件）
//! - `events`: 服务器下发的原始子事件
//! - `setup`: 对局配置（竞技场尺寸、回合数、队友）
//! - `message`: 解码后的服务器消息
//! - `intent`: 每回合的指令缓冲区数据
//!
//! ## 边界
//!
//! JSON 编解码和 WebSocket 连接由外部传输层负责。本 crate 只定义
//! 传输层解码后交给运行时的类型，以及运行时交回给传输层的 `BotIntent`。
//! 启用 `serde` feature 后，所有类型都实现 `Serialize`/`Deserialize`。

pub mod constants;
pub mod events;
pub mod intent;
pub mod message;
pub mod setup;
pub mod snapshot;

// 重新导出常用类型
pub use constants::*;
pub use events::RawEvent;
pub use intent::{BotIntent, Color, TeamMessage};
pub use message::ServerMessage;
pub use setup::GameSetup;
pub use snapshot::{BotState, BulletState, TickSnapshot};

use thiserror::Error;

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// 回合号没有单调递增（同一轮内）
    #[error("Turn order violated in round {round}: turn {got} after turn {last}")]
    NonMonotonicTurn { round: u32, last: u32, got: u32 },

    /// 快照属于已经结束的轮次
    #[error("Stale round: expected round {expected}, got {actual}")]
    StaleRound { expected: u32, actual: u32 },

    /// 字段值无效（如 NaN 坐标）
    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },
}

/// 检查新快照相对于上一快照的顺序
///
/// 同一轮内回合号必须严格递增；新的一轮从任意回合号重新开始。
/// 返回 `Err` 时，调用方应丢弃该快照。
///
/// # 示例
///
/// ```rust
/// use arena_protocol::check_turn_order;
///
/// assert!(check_turn_order(Some((1, 4)), 1, 5).is_ok());
/// assert!(check_turn_order(Some((1, 4)), 1, 4).is_err());
/// assert!(check_turn_order(Some((1, 40)), 2, 1).is_ok());
/// ```
pub fn check_turn_order(
    last: Option<(u32, u32)>,
    round: u32,
    turn: u32,
) -> Result<(), ProtocolError> {
    match last {
        None => Ok(()),
        Some((last_round, _)) if round < last_round => Err(ProtocolError::StaleRound {
            expected: last_round,
            actual: round,
        }),
        Some((last_round, last_turn)) if round == last_round && turn <= last_turn => {
            Err(ProtocolError::NonMonotonicTurn {
                round,
                last: last_turn,
                got: turn,
            })
        },
        Some(_) => Ok(()),
    }
}
