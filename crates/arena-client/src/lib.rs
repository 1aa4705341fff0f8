//! # Arena Client
//!
//! 竞技场机器人的用户接口层
//!
//! - [`Bot`]：查询、设置和阻塞原语（`go`、`forward`、`turn_left`、`fire` …）
//! - [`BotBehavior`]：用户实现的 `run()` 和事件处理器
//! - [`BotRuntime`]：面向传输层的入口，驱动回合循环
//! - [`motion`]：运动学规划和运动状态
//! - [`events`]：事件类型、优先级、队列、自定义条件和分发器
//!
//! # 使用场景
//!
//! 传输层把解码后的 [`ServerMessage`](arena_protocol::ServerMessage) 推入 channel，
//! 运行时在 IO 线程上消费；用户代码在每轮的工作线程上运行，写法与普通的
//! 阻塞程序相同：
//!
//! ```rust,no_run
//! use arena_client::{Bot, BotBehavior, BotConfig, BotRuntime, Result};
//! use arena_driver::ServerLink;
//! use std::sync::Arc;
//!
//! struct Walker;
//!
//! impl BotBehavior for Walker {
//!     fn run(&self, bot: &Bot) -> Result<()> {
//!         while bot.is_running() {
//!             bot.forward(100.0)?;
//!             bot.turn_left(90.0)?;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # fn connect() -> (Arc<dyn ServerLink>, crossbeam_channel::Receiver<arena_protocol::ServerMessage>) { unimplemented!() }
//! let (link, rx) = connect();
//! let runtime = BotRuntime::new(Walker, link, BotConfig::default()).unwrap();
//! runtime.run_loop(rx);
//! ```

pub mod behavior;
pub mod bot;
pub mod config;
pub mod events;
pub mod motion;
pub mod runtime;
pub mod types;

pub use behavior::BotBehavior;
pub use bot::Bot;
pub use config::{BotConfig, ConfigError, EventsConfig, LimitsConfig, SchedulerConfig};
pub use events::{BotEvent, Condition, EventKind};
pub use motion::{Axis, MotionLimits};
pub use runtime::BotRuntime;
pub use types::*;
