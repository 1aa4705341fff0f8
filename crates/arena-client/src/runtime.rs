//! 机器人运行时
//!
//! [`BotRuntime`] 是面向传输层的入口：传输层把解码后的服务器消息交给它
//! （直接调用 `on_*` 方法，或通过 [`BotRuntime::run_loop`] 从 channel 消费），
//! 运行时负责：
//!
//! - 接受快照、更新运动状态、把事件放入队列、发布新回合
//! - 每轮第一个 tick 到达时启动工作线程，轮次结束时取消
//! - 对局开始时保存对局配置并发送 ready 信号
//!
//! # 线程模型
//!
//! ```text
//! IO 线程                         工作线程（每轮一个）
//! ───────                         ───────────────────
//! on_tick
//!   accept_tick
//!   运动状态更新
//!   事件入队
//!   publish_turn ───────────────▶ await_next_turn 返回
//!                                 go(): 分发事件 → 提交意图 → 等待
//! ```

use crate::behavior::BotBehavior;
use crate::bot::Bot;
use crate::config::{BotConfig, ConfigError};
use crate::events::{BotEvent, EventBatch};
use crate::motion::MotionState;
use crate::types::Result;
use arena_driver::{
    CancelToken, LoopExit, MessageHandler, PipelineConfig, ServerLink, TurnStamp, io_loop,
};
use arena_protocol::{GameSetup, RawEvent, ServerMessage, TickSnapshot};
use crossbeam_channel::Receiver;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

/// 运行时内部信号（不会作为事件交给用户处理器）
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Signal {
    /// 新回合已就绪
    NextTurn(TurnStamp),
    /// 对局被中止
    GameAborted,
    /// 连接断开
    Disconnected(Option<String>),
}

/// 机器人运行时
pub struct BotRuntime {
    bot: Bot,
    /// IO 循环运行标志
    running: AtomicBool,
    /// 本局是否已发送 ready
    game_active: AtomicBool,
    pipeline: PipelineConfig,
}

impl BotRuntime {
    /// 创建运行时
    ///
    /// # 参数
    /// - `behavior`: 用户行为
    /// - `link`: 传输层的发送端
    /// - `config`: 机器人配置
    pub fn new<B>(
        behavior: B,
        link: Arc<dyn ServerLink>,
        config: BotConfig,
    ) -> std::result::Result<Self, ConfigError>
    where
        B: BotBehavior,
    {
        let bot = Bot::new(Arc::new(behavior), link, &config)?;
        Ok(Self {
            bot,
            running: AtomicBool::new(true),
            game_active: AtomicBool::new(false),
            pipeline: config.scheduler.pipeline(),
        })
    }

    /// 机器人句柄
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// 在当前线程上运行 IO 循环，直到断线、channel 关闭或 [`BotRuntime::shutdown`]
    ///
    /// 每次进入时重新置位运行标志，`shutdown` 之后可以用新的 channel 再次运行。
    pub fn run_loop(&self, rx: Receiver<ServerMessage>) -> LoopExit {
        self.running.store(true, Ordering::Release);
        let exit = io_loop(rx, self, &self.running, self.pipeline);
        info!("IO loop exited: {:?}", exit);
        exit
    }

    /// 停止 IO 循环并取消工作线程
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::Release);
        self.bot.inner.scheduler.stop_worker();
    }

    // ==================== 生命周期 ====================

    /// 对局开始：保存对局配置，通知用户，然后发送 ready
    pub fn on_game_started(&self, setup: GameSetup) {
        let inner = &self.bot.inner;
        info!(
            "Game started: bot {} in {}x{} arena, {} rounds",
            setup.my_id, setup.arena_width, setup.arena_height, setup.number_of_rounds
        );
        inner.ctx.store_setup(setup);

        if self.game_active.swap(true, Ordering::AcqRel) {
            warn!("Duplicate game start, ready already sent");
            return;
        }

        if let Some(setup) = inner.ctx.setup() {
            self.notify("game_started", |behavior, bot| {
                behavior.on_game_started(bot, &setup)
            });
        }

        if let Err(e) = inner.link.send_ready() {
            error!("Failed to send ready signal: {}", e);
        }
    }

    /// 新一轮开始
    pub fn on_round_started(&self, round: u32) {
        debug!("Round {} started", round);
        self.start_round(round);
        self.notify("round_started", |behavior, bot| {
            behavior.on_round_started(bot, round)
        });
    }

    /// 本轮结束
    pub fn on_round_ended(&self, round: u32, turn: u32) {
        debug!("Round {} ended at turn {}", round, turn);
        self.bot.inner.scheduler.stop_worker();
        self.notify("round_ended", |behavior, bot| {
            behavior.on_round_ended(bot, round, turn)
        });
    }

    /// 对局结束
    pub fn on_game_ended(&self, rounds: u32) {
        info!("Game ended after {} rounds", rounds);
        self.game_active.store(false, Ordering::Release);
        self.bot.inner.scheduler.stop_worker();
        self.notify("game_ended", |behavior, bot| {
            behavior.on_game_ended(bot, rounds)
        });
    }

    pub fn on_game_aborted(&self) {
        self.signal(Signal::GameAborted);
    }

    pub fn on_disconnected(&self, reason: Option<String>) {
        self.signal(Signal::Disconnected(reason));
    }

    /// 服务器报告本机器人错过了一个回合
    pub fn on_skipped_turn(&self, turn: u32) {
        let inner = &self.bot.inner;
        debug!("Skipped turn {}", turn);
        inner.ctx.metrics.skipped_turns.fetch_add(1, Ordering::Relaxed);
        let mut batch = EventBatch::new();
        batch.push(BotEvent::SkippedTurn { turn });
        inner.dispatcher.enqueue(batch, &inner.ctx.metrics);
    }

    /// 新的回合快照
    ///
    /// 运动状态在事件入队和发布回合之前更新，因此用户处理器看到的
    /// 剩余量和速度指令总是对应这一回合。
    pub fn on_tick(&self, tick: TickSnapshot) {
        let inner = &self.bot.inner;

        if tick.round > inner.ctx.round() {
            debug!("Round {} started implicitly by tick", tick.round);
            self.start_round(tick.round);
        }

        let tick = match inner.ctx.accept_tick(tick) {
            Ok(tick) => tick,
            Err(e) => {
                debug!("Dropping tick: {}", e);
                return;
            },
        };
        let first_of_round = inner
            .scheduler
            .current_stamp()
            .is_none_or(|stamp| stamp.round != tick.round);

        self.update_motion(&tick, first_of_round);

        let my_id = inner.ctx.setup().map(|setup| setup.my_id).unwrap_or_default();
        let mut batch = EventBatch::new();
        batch.push(BotEvent::Tick(tick.clone()));
        batch.extend(
            tick.events
                .iter()
                .cloned()
                .map(|raw| BotEvent::from_raw(raw, my_id)),
        );
        batch.extend(inner.dispatcher.evaluate_conditions(&tick));
        inner.dispatcher.enqueue(batch, &inner.ctx.metrics);

        self.signal(Signal::NextTurn(TurnStamp::new(tick.round, tick.turn)));
        if first_of_round {
            self.spawn_worker(tick.round);
        }
        inner.ctx.trigger_tick_hooks(&tick);
    }

    fn update_motion(&self, tick: &TickSnapshot, first_of_round: bool) {
        let inner = &self.bot.inner;
        let limits = *inner.limits.lock();
        let mut motion = inner.motion.lock();

        if first_of_round {
            motion.reset(&tick.bot);
        } else {
            for event in &tick.events {
                match event {
                    RawEvent::HitWall { .. } | RawEvent::HitBot { rammed: true, .. } => {
                        motion.distance_remaining = 0.0;
                    },
                    _ => {},
                }
            }
        }

        let bullet_fired = tick.has_bullet_fired();
        inner.intent.update(|intent| {
            if !first_of_round {
                motion.update(&tick.bot, intent, &limits);
            }
            if bullet_fired {
                intent.firepower = None;
            }
        });
    }

    fn start_round(&self, round: u32) {
        let inner = &self.bot.inner;
        inner.scheduler.stop_worker();
        inner.ctx.begin_round(round);
        inner.scheduler.reset_clock();
        inner.intent.reset();
        inner.dispatcher.reset_round();
        *inner.motion.lock() = MotionState::default();
    }

    fn spawn_worker(&self, round: u32) {
        let bot = self.bot.clone();
        let name = format!("arena-bot-round-{}", round);
        if let Err(e) = self
            .bot
            .inner
            .scheduler
            .start_worker(&name, move |token| run_worker(bot, token))
        {
            error!("Failed to start worker for round {}: {}", round, e);
        }
    }

    pub(crate) fn signal(&self, signal: Signal) {
        let inner = &self.bot.inner;
        match signal {
            Signal::NextTurn(stamp) => inner.scheduler.publish_turn(stamp),
            Signal::GameAborted => {
                info!("Game aborted");
                self.game_active.store(false, Ordering::Release);
                inner.scheduler.stop_worker();
            },
            Signal::Disconnected(reason) => {
                info!(
                    "Disconnected: {}",
                    reason.as_deref().unwrap_or("no reason given")
                );
                self.game_active.store(false, Ordering::Release);
                inner.scheduler.stop_worker();
            },
        }
    }

    /// 在 IO 线程上调用生命周期方法；错误和 panic 只记录
    fn notify<F>(&self, what: &'static str, f: F)
    where
        F: FnOnce(&dyn BotBehavior, &Bot) -> Result<()>,
    {
        let behavior = self.bot.inner.behavior.clone();
        let outcome = catch_unwind(AssertUnwindSafe(|| f(behavior.as_ref(), &self.bot)));
        let failed = match outcome {
            Ok(Ok(())) => false,
            Ok(Err(e)) => {
                warn!("{} handler failed: {}", what, e);
                true
            },
            Err(_) => {
                warn!("{} handler panicked", what);
                true
            },
        };
        if failed {
            self.bot
                .inner
                .ctx
                .metrics
                .handler_failures
                .fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl MessageHandler for BotRuntime {
    fn handle_message(&self, message: ServerMessage) {
        match message {
            ServerMessage::GameStarted(setup) => self.on_game_started(setup),
            ServerMessage::RoundStarted { round } => self.on_round_started(round),
            ServerMessage::Tick(tick) => self.on_tick(tick),
            ServerMessage::SkippedTurn { turn } => self.on_skipped_turn(turn),
            ServerMessage::RoundEnded { round, turn } => self.on_round_ended(round, turn),
            ServerMessage::GameEnded { rounds } => self.on_game_ended(rounds),
            ServerMessage::GameAborted => self.on_game_aborted(),
            ServerMessage::Disconnected { reason } => self.on_disconnected(reason),
        }
    }
}

impl Drop for BotRuntime {
    fn drop(&mut self) {
        self.bot.inner.scheduler.stop_worker();
    }
}

/// 工作线程主体：先执行用户的 `run()`，返回后继续每回合 `go()` 直到被取消
fn run_worker(bot: Bot, token: CancelToken) {
    let behavior = bot.inner.behavior.clone();
    match catch_unwind(AssertUnwindSafe(|| behavior.run(&bot))) {
        Ok(Ok(())) => debug!("run() returned"),
        Ok(Err(e)) if e.is_halt() => debug!("run() halted: {}", e),
        Ok(Err(e)) => warn!("run() failed: {}", e),
        Err(_) => warn!("run() panicked"),
    }

    while !token.is_canceled() {
        if let Err(e) = bot.go() {
            if !e.is_halt() {
                warn!("Worker stopped: {}", e);
            }
            break;
        }
    }
    debug!("Worker thread exiting");
}
