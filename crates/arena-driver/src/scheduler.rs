//! 回合调度器
//!
//! 负责工作线程的生命周期和"等待下一回合"的阻塞原语：
//!
//! - IO 线程每接受一个 tick 调用 [`TurnScheduler::publish_turn`]，唤醒所有等待者
//! - 工作线程在 [`TurnScheduler::await_next_turn`] 上阻塞，直到回合推进或被取消
//! - 每轮一个工作线程，每个工作线程一个 [`CancelToken`]；新一轮开始前旧线程必须被取消并回收
//!
//! 阻塞调用只允许在当前注册的工作线程上执行，其他线程调用返回
//! [`DriverError::ForeignThread`]。

use crate::error::DriverError;
use crate::mode::{AtomicSchedulerState, SchedulerState};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle, ThreadId, spawn};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// 带超时的线程 join
///
/// 标准库的 `JoinHandle::join` 没有超时；这里用一个看门狗线程执行 join，
/// 调用方在 channel 上带超时等待。超时后看门狗线程继续运行，直到目标线程退出。
trait JoinTimeout {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()>;
}

impl<T: Send + 'static> JoinTimeout for JoinHandle<T> {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()> {
        let (tx, rx) = crossbeam_channel::bounded(1);

        spawn(move || {
            let result = self.join();
            // 接收端可能已经超时退出
            let _ = tx.send(result);
        });

        match rx.recv_timeout(timeout) {
            Ok(join_result) => join_result.map(|_| ()),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => Err(Box::new(
                std::io::Error::new(std::io::ErrorKind::TimedOut, "Thread join timeout"),
            )),
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => Err(Box::new(
                std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "Thread panicked during join",
                ),
            )),
        }
    }
}

/// 工作线程取消令牌
///
/// 克隆共享同一个标志；取消后不可恢复，下一轮使用新的令牌。
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    canceled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        // Release: 取消前的所有写入对看到 true 的线程可见
        self.canceled.store(true, Ordering::Release);
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }
}

/// 回合标识（轮次 + 回合号）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TurnStamp {
    pub round: u32,
    pub turn: u32,
}

impl TurnStamp {
    pub const fn new(round: u32, turn: u32) -> Self {
        Self { round, turn }
    }
}

#[derive(Debug)]
struct WorkerSlot {
    thread_id: ThreadId,
    token: CancelToken,
}

/// 回合调度器
pub struct TurnScheduler {
    clock: Mutex<Option<TurnStamp>>,
    turn_changed: Condvar,
    state: AtomicSchedulerState,
    worker: Mutex<Option<WorkerSlot>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    stop_timeout: Duration,
}

impl TurnScheduler {
    /// 创建调度器
    ///
    /// `stop_timeout` 是取消工作线程后等待其退出的最长时间，超时后放弃等待并记录警告。
    pub fn new(stop_timeout: Duration) -> Self {
        Self {
            clock: Mutex::new(None),
            turn_changed: Condvar::new(),
            state: AtomicSchedulerState::default(),
            worker: Mutex::new(None),
            handle: Mutex::new(None),
            stop_timeout,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state.get(Ordering::Acquire)
    }

    /// 调度器处于运行状态且当前工作线程未被取消
    pub fn is_running(&self) -> bool {
        self.state().is_running()
            && self
                .worker
                .lock()
                .as_ref()
                .is_some_and(|slot| !slot.token.is_canceled())
    }

    /// 最近发布的回合
    pub fn current_stamp(&self) -> Option<TurnStamp> {
        *self.clock.lock()
    }

    /// 发布新回合并唤醒所有等待者
    pub fn publish_turn(&self, stamp: TurnStamp) {
        let mut clock = self.clock.lock();
        *clock = Some(stamp);
        self.turn_changed.notify_all();
        trace!("Published round {} turn {}", stamp.round, stamp.turn);
    }

    /// 清除回合时钟（新一轮开始时调用）
    pub fn reset_clock(&self) {
        *self.clock.lock() = None;
    }

    /// 当前线程是否为注册的工作线程
    pub fn is_worker_thread(&self) -> bool {
        let current = thread::current().id();
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|slot| slot.thread_id == current)
    }

    /// 检查调用线程是否可以执行阻塞调用
    ///
    /// - 非工作线程：`ForeignThread`
    /// - 工作线程已被取消或调度器未运行：`Canceled`
    pub fn check_worker(&self) -> Result<CancelToken, DriverError> {
        let current = thread::current().id();
        let token = match self.worker.lock().as_ref() {
            Some(slot) if slot.thread_id == current => slot.token.clone(),
            _ => return Err(DriverError::ForeignThread),
        };
        if token.is_canceled() || !self.state().is_running() {
            return Err(DriverError::Canceled);
        }
        Ok(token)
    }

    /// 阻塞直到回合不再是 `seen`，或者工作线程被取消
    ///
    /// 只能在工作线程上调用。
    pub fn await_next_turn(&self, seen: TurnStamp) -> Result<TurnStamp, DriverError> {
        let token = self.check_worker()?;
        let mut clock = self.clock.lock();
        loop {
            if token.is_canceled() || !self.state().is_running() {
                return Err(DriverError::Canceled);
            }
            match *clock {
                Some(stamp) if stamp != seen => return Ok(stamp),
                _ => self.turn_changed.wait(&mut clock),
            }
        }
    }

    /// 启动新的工作线程
    ///
    /// 如果还有旧的工作线程，先取消并回收。`body` 收到本线程的取消令牌。
    /// 工作线程在注册完成后才开始执行 `body`，因此 `body` 内的阻塞调用
    /// 总能通过线程检查。
    pub fn start_worker<F>(&self, name: &str, body: F) -> Result<CancelToken, DriverError>
    where
        F: FnOnce(CancelToken) + Send + 'static,
    {
        self.stop_worker();

        let token = CancelToken::new();
        let worker_token = token.clone();
        let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(1);

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                if gate_rx.recv().is_err() {
                    return;
                }
                body(worker_token);
            })
            .map_err(|e| DriverError::Spawn(e.to_string()))?;

        *self.worker.lock() = Some(WorkerSlot {
            thread_id: handle.thread().id(),
            token: token.clone(),
        });
        *self.handle.lock() = Some(handle);
        self.state.set(SchedulerState::Running, Ordering::Release);

        // 发送失败说明线程已退出，join 时会处理
        let _ = gate_tx.send(());
        debug!("Worker thread '{}' started", name);
        Ok(token)
    }

    /// 取消当前工作线程并等待其退出（最多 `stop_timeout`）
    ///
    /// 幂等：没有工作线程时直接返回。返回工作线程是否已确认退出。
    pub fn stop_worker(&self) -> bool {
        self.cancel_worker();
        self.join_worker()
    }

    /// 只发出取消信号，不等待
    pub fn cancel_worker(&self) {
        if let Some(slot) = self.worker.lock().as_ref() {
            slot.token.cancel();
        }
        if self.state() == SchedulerState::Running {
            self.state.set(SchedulerState::Canceled, Ordering::Release);
        }
        // 在持有时钟锁时通知，避免等待者错过唤醒
        let _clock = self.clock.lock();
        self.turn_changed.notify_all();
    }

    fn join_worker(&self) -> bool {
        let Some(handle) = self.handle.lock().take() else {
            return true;
        };

        if handle.thread().id() == thread::current().id() {
            // 工作线程取消自己：不能 join 自己
            return false;
        }

        let name = handle.thread().name().unwrap_or("worker").to_string();
        match handle.join_timeout(self.stop_timeout) {
            Ok(()) => {
                debug!("Worker thread '{}' exited", name);
                true
            },
            Err(_) => {
                warn!(
                    "Worker thread '{}' did not exit within {:?}, abandoning it",
                    name, self.stop_timeout
                );
                false
            },
        }
    }
}

impl Drop for TurnScheduler {
    fn drop(&mut self) {
        // 只发信号：最后一个引用可能就在工作线程上释放
        self.cancel_worker();
    }
}
