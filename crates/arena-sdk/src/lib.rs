//! Arena SDK - 回合制竞技场机器人 Rust SDK
//!
//! 让用户用普通的阻塞式代码（"前进 100，左转 90，开火"）控制一个按服务器
//! 节拍推进的机器人。
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **协议层** (`protocol`): 快照、子事件、对局配置、意图数据
//! - **驱动层** (`driver`): 回合调度、意图缓冲、IO 循环、指标与钩子
//! - **客户端层** (`client`): `Bot` 句柄、运动规划、事件分发、运行时
//!
//! # 快速开始
//!
//! ```rust
//! use arena_sdk::prelude::*;
//!
//! struct Corners;
//!
//! impl BotBehavior for Corners {
//!     fn run(&self, bot: &Bot) -> Result<()> {
//!         while bot.is_running() {
//!             bot.forward(200.0)?;
//!             bot.turn_right(90.0)?;
//!         }
//!         Ok(())
//!     }
//! }
//! ```

pub use arena_client as client;
pub use arena_driver as driver;
pub use arena_protocol as protocol;

pub mod prelude;

mod logging;

pub use logging::{init_logger, init_logger_with};

// --- 用户以此为界 ---

pub use client::{
    Bot, BotBehavior, BotConfig, BotError, BotEvent, BotRuntime, Condition, ConfigError,
    EventKind, Halt,
};
pub use driver::{DriverError, LinkError, MetricsSnapshot, ServerLink, TurnCallback};
pub use protocol::{BotIntent, GameSetup, ProtocolError, ServerMessage, TickSnapshot};
