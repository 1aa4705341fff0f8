//! 事件系统
//!
//! - [`event`]：事件类型
//! - [`policy`]：优先级和可中断标志
//! - [`queue`]：待分发事件队列
//! - [`condition`]：自定义条件
//! - [`dispatcher`]：按优先级在工作线程上同步分发

pub mod condition;
pub mod dispatcher;
pub mod event;
pub mod policy;
pub mod queue;

pub use condition::{Condition, ConditionSet};
pub use dispatcher::EventDispatcher;
pub use event::{BotEvent, EventKind};
pub use policy::{EventPolicy, default_priority};
pub use queue::{EventBatch, EventQueue, MAX_EVENT_AGE, MAX_QUEUE_SIZE};
