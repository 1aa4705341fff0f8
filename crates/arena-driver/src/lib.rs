//! # Arena Driver
//!
//! 驱动层：回合调度、意图缓冲与 IO 循环
//!
//! - 回合调度（工作线程生命周期、等待下一回合、取消）
//! - 意图缓冲（每回合最多发送一次）
//! - 共享状态（ArcSwap 无锁读取最新快照）
//! - 钩子系统与运行时指标
//!
//! 大多数用户应该使用 `arena-client` 提供的 `Bot` 接口。

mod error;
pub mod hooks;
pub mod intent_buffer;
pub mod link;
pub mod metrics;
pub mod mode;
pub mod pipeline;
pub mod scheduler;
pub mod state;

pub use error::{DriverError, LinkError};
pub use hooks::{HookManager, TurnCallback};
pub use intent_buffer::{CommitOutcome, IntentBuffer};
#[cfg(any(test, feature = "mock"))]
pub use link::MockLink;
pub use link::ServerLink;
pub use metrics::{MetricsSnapshot, RuntimeMetrics};
pub use mode::{AtomicSchedulerState, SchedulerState};
pub use pipeline::{LoopExit, MessageHandler, PipelineConfig, io_loop};
pub use scheduler::{CancelToken, TurnScheduler, TurnStamp};
pub use state::TurnContext;
