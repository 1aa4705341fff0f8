//! 调度器状态
//!
//! 回合调度器在三种状态之间切换，用原子变量在 IO 线程和工作线程之间共享。

use std::sync::atomic::{AtomicU8, Ordering};

/// 调度器状态
///
/// # 状态转换
///
/// - `Idle` → `Running`：本轮第一个 tick 到达，工作线程启动
/// - `Running` → `Canceled`：本轮结束、机器人死亡或运行时停止
/// - `Canceled` → `Running`：下一轮的工作线程启动
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SchedulerState {
    /// 尚未启动任何工作线程
    #[default]
    Idle = 0,

    /// 工作线程正在运行，阻塞调用可以等待下一回合
    Running = 1,

    /// 工作线程已被取消，所有阻塞调用立即返回取消信号
    Canceled = 2,
}

impl SchedulerState {
    /// 从 u8 转换
    ///
    /// 如果值无效，返回 `Idle`。
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Canceled,
            _ => Self::Idle,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_running(self) -> bool {
        self == Self::Running
    }

    pub fn is_canceled(self) -> bool {
        self == Self::Canceled
    }
}

/// 调度器状态（原子版本，用于线程间共享）
///
/// # 示例
///
/// ```rust
/// use arena_driver::mode::{AtomicSchedulerState, SchedulerState};
/// use std::sync::atomic::Ordering;
///
/// let state = AtomicSchedulerState::new(SchedulerState::Idle);
/// state.set(SchedulerState::Running, Ordering::Release);
/// assert!(state.get(Ordering::Acquire).is_running());
/// ```
#[derive(Debug)]
pub struct AtomicSchedulerState {
    inner: AtomicU8,
}

impl AtomicSchedulerState {
    pub fn new(state: SchedulerState) -> Self {
        Self {
            inner: AtomicU8::new(state.as_u8()),
        }
    }

    /// 获取当前状态
    pub fn get(&self, ordering: Ordering) -> SchedulerState {
        SchedulerState::from_u8(self.inner.load(ordering))
    }

    /// 设置状态
    pub fn set(&self, state: SchedulerState, ordering: Ordering) {
        self.inner.store(state.as_u8(), ordering);
    }

    /// 设置新状态并返回旧状态
    pub fn swap(&self, state: SchedulerState, ordering: Ordering) -> SchedulerState {
        SchedulerState::from_u8(self.inner.swap(state.as_u8(), ordering))
    }

    /// 比较并交换（Compare-and-Swap）
    ///
    /// 如果当前状态等于 `current`，则设置为 `new`。
    /// 返回 `Ok(旧状态)` 表示成功，`Err(实际状态)` 表示失败。
    pub fn compare_exchange(
        &self,
        current: SchedulerState,
        new: SchedulerState,
        success: Ordering,
        failure: Ordering,
    ) -> Result<SchedulerState, SchedulerState> {
        self.inner
            .compare_exchange(current.as_u8(), new.as_u8(), success, failure)
            .map(SchedulerState::from_u8)
            .map_err(SchedulerState::from_u8)
    }
}

impl Default for AtomicSchedulerState {
    fn default() -> Self {
        Self::new(SchedulerState::Idle)
    }
}
