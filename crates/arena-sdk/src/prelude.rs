//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use arena_sdk::prelude::*;
//! ```

// 客户端层
pub use crate::client::{
    Axis, Bot, BotBehavior, BotConfig, BotEvent, BotRuntime, Condition, EventKind, Result,
};

// 协议层数据
pub use crate::protocol::{BotState, BulletState, Color, GameSetup, ServerMessage, TickSnapshot};

// 传输层接口
pub use crate::driver::ServerLink;

// 错误类型
pub use crate::client::{BotError, ConfigError, Halt};
pub use crate::driver::{DriverError, LinkError};
pub use crate::protocol::ProtocolError;
