//! 用户侧机器人句柄
//!
//! [`Bot`] 是可克隆的句柄，提供三类接口：
//!
//! - **查询**：读取最新快照和对局配置；数据尚未到达时返回 [`BotError::NotAvailable`]
//! - **设置**（`set_*`）：只修改本回合意图，不阻塞；NaN 参数被拒绝，超范围参数被限幅
//! - **阻塞原语**（`go`、`forward`、`turn_left`、`fire`、`wait_for` …）：
//!   只能在工作线程上调用，提交本回合意图后等待下一回合
//!
//! # 阻塞原语的执行顺序
//!
//! `go()` 依次执行：
//!
//! 1. 检查调用线程（非工作线程返回 `ForeignThread`，已取消返回 `Canceled`）
//! 2. 分发待处理事件（处理器在当前线程上同步执行）
//! 3. 提交本回合意图（每回合最多发送一次）
//! 4. 等待下一回合
//!
//! # 锁顺序
//!
//! `limits` → `motion` → `intent`。事件分发器的锁从不与它们同时持有，
//! 用户处理器执行期间不持有任何锁。

use crate::behavior::BotBehavior;
use crate::config::{BotConfig, ConfigError};
use crate::events::{Condition, EventDispatcher, EventKind, EventPolicy, EventQueue};
use crate::motion::{self, Axis, MotionLimits, MotionState};
use crate::types::{BotError, Halt, Result, check_finite, check_finite_or_inf};
use arena_driver::{
    CommitOutcome, IntentBuffer, MetricsSnapshot, ServerLink, TurnCallback, TurnContext,
    TurnScheduler, TurnStamp,
};
use arena_protocol::{
    BulletState, Color, GameSetup, MAX_FIREPOWER, MAX_GUN_TURN_RATE, MAX_RADAR_TURN_RATE,
    MAX_SPEED, MAX_TEAM_MESSAGES_PER_TURN, MAX_TURN_RATE, MIN_FIREPOWER, TeamMessage,
    TickSnapshot,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing::{debug, error, trace};

pub(crate) struct BotInner {
    pub(crate) link: Arc<dyn ServerLink>,
    pub(crate) ctx: TurnContext,
    pub(crate) scheduler: TurnScheduler,
    pub(crate) intent: IntentBuffer,
    pub(crate) motion: Mutex<MotionState>,
    pub(crate) limits: Mutex<MotionLimits>,
    pub(crate) dispatcher: EventDispatcher,
    pub(crate) behavior: Arc<dyn BotBehavior>,
}

/// 机器人句柄
#[derive(Clone)]
pub struct Bot {
    pub(crate) inner: Arc<BotInner>,
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("round", &self.inner.ctx.round())
            .field("scheduler", &self.inner.scheduler.state())
            .finish_non_exhaustive()
    }
}

impl Bot {
    pub(crate) fn new(
        behavior: Arc<dyn BotBehavior>,
        link: Arc<dyn ServerLink>,
        config: &BotConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let mut policy = EventPolicy::new();
        for (kind, priority) in config.events.priority_overrides()? {
            policy.set_priority(kind, priority);
        }
        let queue = EventQueue::new(config.events.max_queue_size, config.events.max_event_age);

        Ok(Self {
            inner: Arc::new(BotInner {
                link,
                ctx: TurnContext::new(),
                scheduler: TurnScheduler::new(config.scheduler.stop_timeout()),
                intent: IntentBuffer::new(),
                motion: Mutex::new(MotionState::default()),
                limits: Mutex::new(config.limits.to_limits()),
                dispatcher: EventDispatcher::new(queue, policy),
                behavior,
            }),
        })
    }

    // ==================== 阻塞原语 ====================

    /// 提交本回合意图并等待下一回合
    pub fn go(&self) -> Result<()> {
        let inner = &self.inner;
        inner.scheduler.check_worker()?;
        let stamp = inner
            .scheduler
            .current_stamp()
            .ok_or(BotError::NotAvailable("turn"))?;

        self.dispatch_events(stamp.turn)?;

        // 处理器内部可能已经等过若干回合，按最新回合提交
        let stamp = inner.scheduler.current_stamp().unwrap_or(stamp);
        self.commit(stamp);
        inner.scheduler.await_next_turn(stamp)?;
        Ok(())
    }

    /// 前进指定距离（负值后退），直到走完并停稳
    pub fn forward(&self, distance: f64) -> Result<()> {
        self.inner.scheduler.check_worker()?;
        if self.is_stopped() {
            return self.go();
        }
        self.set_forward(distance)?;
        self.wait_for(|bot| {
            bot.distance_remaining() == 0.0 && bot.speed().unwrap_or(0.0) == 0.0
        })
    }

    /// 后退指定距离
    pub fn back(&self, distance: f64) -> Result<()> {
        self.forward(-check_finite_or_inf("distance", distance)?)
    }

    /// 车身左转指定角度（度），直到转完
    pub fn turn_left(&self, degrees: f64) -> Result<()> {
        self.turn_axis(Axis::Body, degrees)
    }

    pub fn turn_right(&self, degrees: f64) -> Result<()> {
        self.turn_axis(Axis::Body, -check_finite_or_inf("degrees", degrees)?)
    }

    pub fn turn_gun_left(&self, degrees: f64) -> Result<()> {
        self.turn_axis(Axis::Gun, degrees)
    }

    pub fn turn_gun_right(&self, degrees: f64) -> Result<()> {
        self.turn_axis(Axis::Gun, -check_finite_or_inf("degrees", degrees)?)
    }

    pub fn turn_radar_left(&self, degrees: f64) -> Result<()> {
        self.turn_axis(Axis::Radar, degrees)
    }

    pub fn turn_radar_right(&self, degrees: f64) -> Result<()> {
        self.turn_axis(Axis::Radar, -check_finite_or_inf("degrees", degrees)?)
    }

    /// 开火并等待下一回合，返回是否真的开了火
    pub fn fire(&self, firepower: f64) -> Result<bool> {
        let queued = self.set_fire(firepower)?;
        self.go()?;
        Ok(queued)
    }

    /// 请求重新扫描并等待下一回合
    pub fn rescan(&self) -> Result<()> {
        self.set_rescan();
        self.go()
    }

    /// 每回合 `go()` 一次，直到 `condition` 为真
    pub fn wait_for<F>(&self, mut condition: F) -> Result<()>
    where
        F: FnMut(&Bot) -> bool,
    {
        loop {
            self.go()?;
            if condition(self) {
                return Ok(());
            }
        }
    }

    /// 停止所有运动并等待下一回合
    pub fn stop(&self) -> Result<()> {
        self.stop_with(false)
    }

    /// 停止；`overwrite` 为 true 时用当前状态替换已保存的快照
    pub fn stop_with(&self, overwrite: bool) -> Result<()> {
        self.set_stop(overwrite);
        self.go()
    }

    /// 恢复 `stop()` 之前的运动并等待下一回合
    pub fn resume(&self) -> Result<()> {
        self.set_resume();
        self.go()
    }

    fn turn_axis(&self, axis: Axis, degrees: f64) -> Result<()> {
        self.inner.scheduler.check_worker()?;
        if self.is_stopped() {
            return self.go();
        }
        self.set_turn(axis, degrees)?;
        self.wait_for(|bot| {
            let remaining = bot.inner.motion.lock().remaining(axis);
            let rate = bot.inner.intent.read(|intent| axis.rate(intent));
            remaining == 0.0 && rate.is_none_or(|r| r == 0.0)
        })
    }

    fn dispatch_events(&self, current_turn: u32) -> Result<()> {
        let inner = &self.inner;
        let mut died = false;
        let outcome = inner
            .dispatcher
            .dispatch(current_turn, &inner.ctx.metrics, |event| {
                if event.kind() == EventKind::Death {
                    died = true;
                }
                inner.behavior.on_event(self, event)
            });

        if died {
            debug!("Bot died in round {}, canceling worker", inner.ctx.round());
            inner.scheduler.cancel_worker();
            return Err(Halt::Canceled.into());
        }
        outcome.map_err(BotError::from)
    }

    fn commit(&self, stamp: TurnStamp) {
        let inner = &self.inner;
        let metrics = &inner.ctx.metrics;
        let result = inner
            .intent
            .commit(stamp.round, stamp.turn, inner.link.as_ref(), |intent| {
                inner.ctx.trigger_sent_hooks(stamp.turn, intent)
            });
        match result {
            Ok(CommitOutcome::Sent) => {
                metrics.intents_sent.fetch_add(1, Ordering::Relaxed);
                trace!("Sent intent for round {} turn {}", stamp.round, stamp.turn);
            },
            Ok(CommitOutcome::AlreadySent) => {
                metrics.duplicate_sends_suppressed.fetch_add(1, Ordering::Relaxed);
            },
            Err(e) => {
                metrics.send_failures.fetch_add(1, Ordering::Relaxed);
                error!("Failed to send intent for turn {}: {}", stamp.turn, e);
            },
        }
    }

    // ==================== 运动设置 ====================

    /// 设置前进距离（负值后退，`±∞` 表示一直走）
    pub fn set_forward(&self, distance: f64) -> Result<()> {
        let distance = check_finite_or_inf("distance", distance)?;
        let speed = self.speed().unwrap_or(0.0);
        let limits = self.limits();
        let mut motion = self.inner.motion.lock();
        self.inner
            .intent
            .update(|intent| motion.set_distance(distance, speed, intent, &limits));
        Ok(())
    }

    pub fn set_back(&self, distance: f64) -> Result<()> {
        self.set_forward(-check_finite_or_inf("distance", distance)?)
    }

    /// 设置目标速度（持续行驶，直到被改变）
    pub fn set_target_speed(&self, speed: f64) -> Result<()> {
        let speed = check_finite_or_inf("target_speed", speed)?;
        let limits = self.limits();
        let mut motion = self.inner.motion.lock();
        self.inner
            .intent
            .update(|intent| motion.set_target_speed(speed, intent, &limits));
        Ok(())
    }

    pub fn set_turn_left(&self, degrees: f64) -> Result<()> {
        self.set_turn(Axis::Body, degrees)
    }

    pub fn set_turn_right(&self, degrees: f64) -> Result<()> {
        self.set_turn(Axis::Body, -check_finite_or_inf("degrees", degrees)?)
    }

    pub fn set_gun_turn_left(&self, degrees: f64) -> Result<()> {
        self.set_turn(Axis::Gun, degrees)
    }

    pub fn set_gun_turn_right(&self, degrees: f64) -> Result<()> {
        self.set_turn(Axis::Gun, -check_finite_or_inf("degrees", degrees)?)
    }

    pub fn set_radar_turn_left(&self, degrees: f64) -> Result<()> {
        self.set_turn(Axis::Radar, degrees)
    }

    pub fn set_radar_turn_right(&self, degrees: f64) -> Result<()> {
        self.set_turn(Axis::Radar, -check_finite_or_inf("degrees", degrees)?)
    }

    /// 车身持续转动（度/回合，正值左转）
    pub fn set_turn_rate(&self, rate: f64) -> Result<()> {
        self.set_rate(Axis::Body, rate)
    }

    pub fn set_gun_turn_rate(&self, rate: f64) -> Result<()> {
        self.set_rate(Axis::Gun, rate)
    }

    pub fn set_radar_turn_rate(&self, rate: f64) -> Result<()> {
        self.set_rate(Axis::Radar, rate)
    }

    fn set_turn(&self, axis: Axis, degrees: f64) -> Result<()> {
        let degrees = check_finite_or_inf("degrees", degrees)?;
        let limits = self.limits();
        let mut motion = self.inner.motion.lock();
        self.inner
            .intent
            .update(|intent| motion.set_turn(axis, degrees, intent, &limits));
        Ok(())
    }

    fn set_rate(&self, axis: Axis, rate: f64) -> Result<()> {
        let rate = check_finite_or_inf("turn_rate", rate)?;
        let limits = self.limits();
        let mut motion = self.inner.motion.lock();
        self.inner
            .intent
            .update(|intent| motion.set_turn_rate(axis, rate, intent, &limits));
        Ok(())
    }

    /// 停止（不阻塞），返回是否保存了新的快照
    pub fn set_stop(&self, overwrite: bool) -> bool {
        let mut motion = self.inner.motion.lock();
        self.inner.intent.update(|intent| motion.stop(intent, overwrite))
    }

    /// 恢复（不阻塞），未停止时返回 false
    pub fn set_resume(&self) -> bool {
        let mut motion = self.inner.motion.lock();
        self.inner.intent.update(|intent| motion.resume(intent))
    }

    pub fn set_max_speed(&self, max_speed: f64) -> Result<()> {
        let value = check_finite_or_inf("max_speed", max_speed)?.clamp(0.0, MAX_SPEED);
        self.inner.limits.lock().max_speed = value;
        Ok(())
    }

    pub fn set_max_turn_rate(&self, rate: f64) -> Result<()> {
        let value = check_finite_or_inf("max_turn_rate", rate)?.clamp(0.0, MAX_TURN_RATE);
        self.inner.limits.lock().max_turn_rate = value;
        Ok(())
    }

    pub fn set_max_gun_turn_rate(&self, rate: f64) -> Result<()> {
        let value = check_finite_or_inf("max_gun_turn_rate", rate)?.clamp(0.0, MAX_GUN_TURN_RATE);
        self.inner.limits.lock().max_gun_turn_rate = value;
        Ok(())
    }

    pub fn set_max_radar_turn_rate(&self, rate: f64) -> Result<()> {
        let value =
            check_finite_or_inf("max_radar_turn_rate", rate)?.clamp(0.0, MAX_RADAR_TURN_RATE);
        self.inner.limits.lock().max_radar_turn_rate = value;
        Ok(())
    }

    /// 当前运动限制
    pub fn limits(&self) -> MotionLimits {
        *self.inner.limits.lock()
    }

    // ==================== 武器和杂项设置 ====================

    /// 设置本回合火力
    ///
    /// 返回 `false`（不开火）的情况：火力低于 [`MIN_FIREPOWER`]、炮管过热、能量不足。
    /// 低于最小火力视为取消本回合之前设置的开火。
    /// 超过 [`MAX_FIREPOWER`] 的火力被限幅。
    pub fn set_fire(&self, firepower: f64) -> Result<bool> {
        let firepower = check_finite_or_inf("firepower", firepower)?;
        if firepower < MIN_FIREPOWER {
            self.inner.intent.update(|intent| intent.firepower = None);
            return Ok(false);
        }
        let firepower = firepower.min(MAX_FIREPOWER);

        let tick = self.tick()?;
        if tick.bot.gun_heat > 0.0 || tick.bot.energy < firepower {
            return Ok(false);
        }
        self.inner
            .intent
            .update(|intent| intent.firepower = Some(firepower));
        Ok(true)
    }

    /// 本回合已设置的火力
    pub fn firepower(&self) -> Option<f64> {
        self.inner.intent.read(|intent| intent.firepower)
    }

    pub fn set_rescan(&self) {
        self.inner.intent.update(|intent| intent.rescan = true);
    }

    pub fn set_fire_assist(&self, enable: bool) {
        self.inner.intent.update(|intent| intent.fire_assist = enable);
    }

    pub fn set_adjust_gun_for_body_turn(&self, adjust: bool) {
        self.inner
            .intent
            .update(|intent| intent.adjust_gun_for_body_turn = adjust);
    }

    pub fn set_adjust_radar_for_gun_turn(&self, adjust: bool) {
        self.inner
            .intent
            .update(|intent| intent.adjust_radar_for_gun_turn = adjust);
    }

    pub fn set_body_color(&self, color: Option<Color>) {
        self.inner.intent.update(|intent| intent.body_color = color);
    }

    pub fn set_turret_color(&self, color: Option<Color>) {
        self.inner.intent.update(|intent| intent.turret_color = color);
    }

    pub fn set_radar_color(&self, color: Option<Color>) {
        self.inner.intent.update(|intent| intent.radar_color = color);
    }

    pub fn set_bullet_color(&self, color: Option<Color>) {
        self.inner.intent.update(|intent| intent.bullet_color = color);
    }

    pub fn set_scan_color(&self, color: Option<Color>) {
        self.inner.intent.update(|intent| intent.scan_color = color);
    }

    pub fn set_tracks_color(&self, color: Option<Color>) {
        self.inner.intent.update(|intent| intent.tracks_color = color);
    }

    pub fn set_gun_color(&self, color: Option<Color>) {
        self.inner.intent.update(|intent| intent.gun_color = color);
    }

    /// 发送队伍消息（随本回合意图发出）
    ///
    /// `receiver` 为 `None` 时广播给所有队友。
    pub fn send_team_message(&self, receiver: Option<u32>, payload: impl Into<String>) -> Result<()> {
        if let Some(id) = receiver {
            if !self.game_setup()?.is_teammate(id) {
                return Err(BotError::UnknownTeammate(id));
            }
        }
        let message = TeamMessage {
            receiver_id: receiver,
            payload: payload.into(),
        };
        self.inner.intent.update(|intent| {
            if intent.team_messages.len() >= MAX_TEAM_MESSAGES_PER_TURN {
                return Err(BotError::TooManyTeamMessages {
                    max: MAX_TEAM_MESSAGES_PER_TURN,
                });
            }
            intent.team_messages.push(message);
            Ok(())
        })
    }

    /// 追加到本回合捕获的标准输出
    pub fn print(&self, text: &str) {
        self.inner.intent.update(|intent| intent.append_std_out(text));
    }

    /// 追加到本回合捕获的标准错误
    pub fn eprint(&self, text: &str) {
        self.inner.intent.update(|intent| intent.append_std_err(text));
    }

    pub fn set_debug_graphics(&self, payload: impl Into<String>) {
        let payload = payload.into();
        self.inner
            .intent
            .update(|intent| intent.debug_graphics = Some(payload));
    }

    /// 本回合意图的副本
    pub fn intent(&self) -> arena_protocol::BotIntent {
        self.inner.intent.snapshot()
    }

    // ==================== 事件 ====================

    /// 把当前正在处理的事件类别标记为可中断
    ///
    /// 只在事件处理器内部有效；没有活动处理器时返回 false。
    pub fn set_interruptible(&self, interruptible: bool) -> bool {
        self.inner.dispatcher.set_interruptible(interruptible)
    }

    pub fn event_priority(&self, kind: EventKind) -> i32 {
        self.inner.dispatcher.priority(kind)
    }

    pub fn set_event_priority(&self, kind: EventKind, priority: i32) {
        self.inner.dispatcher.set_priority(kind, priority);
    }

    /// 注册自定义条件；同名条件已存在时返回 false
    pub fn add_custom_event(&self, condition: Condition) -> bool {
        self.inner.dispatcher.add_condition(condition)
    }

    pub fn remove_custom_event(&self, name: &str) -> bool {
        self.inner.dispatcher.remove_condition(name)
    }

    /// 待分发事件（调试用）
    pub fn pending_event_count(&self) -> usize {
        self.inner.dispatcher.pending_len()
    }

    // ==================== 运行时 ====================

    /// 当前线程是否为本轮的工作线程，且未被取消
    pub fn is_running(&self) -> bool {
        self.inner.scheduler.is_running()
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.motion.lock().is_stopped()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.ctx.metrics.snapshot()
    }

    /// 注册回合钩子
    pub fn add_turn_callback(&self, callback: Arc<dyn TurnCallback>) {
        self.inner.ctx.hooks.write().add_callback(callback);
    }

    // ==================== 查询 ====================

    /// 最新快照
    pub fn tick(&self) -> Result<Arc<TickSnapshot>> {
        self.inner
            .ctx
            .current_tick()
            .ok_or(BotError::NotAvailable("tick"))
    }

    /// 对局配置
    pub fn game_setup(&self) -> Result<Arc<GameSetup>> {
        self.inner
            .ctx
            .setup()
            .ok_or(BotError::NotAvailable("game setup"))
    }

    fn with_tick<R>(&self, f: impl FnOnce(&TickSnapshot) -> R) -> Result<R> {
        let tick = self.tick()?;
        Ok(f(&tick))
    }

    pub fn round(&self) -> Result<u32> {
        self.with_tick(|t| t.round)
    }

    pub fn turn(&self) -> Result<u32> {
        self.with_tick(|t| t.turn)
    }

    pub fn energy(&self) -> Result<f64> {
        self.with_tick(|t| t.bot.energy)
    }

    pub fn x(&self) -> Result<f64> {
        self.with_tick(|t| t.bot.x)
    }

    pub fn y(&self) -> Result<f64> {
        self.with_tick(|t| t.bot.y)
    }

    pub fn direction(&self) -> Result<f64> {
        self.with_tick(|t| t.bot.direction)
    }

    pub fn gun_direction(&self) -> Result<f64> {
        self.with_tick(|t| t.bot.gun_direction)
    }

    pub fn radar_direction(&self) -> Result<f64> {
        self.with_tick(|t| t.bot.radar_direction)
    }

    pub fn speed(&self) -> Result<f64> {
        self.with_tick(|t| t.bot.speed)
    }

    pub fn gun_heat(&self) -> Result<f64> {
        self.with_tick(|t| t.bot.gun_heat)
    }

    pub fn enemy_count(&self) -> Result<u32> {
        self.with_tick(|t| t.bot.enemy_count)
    }

    pub fn bullets(&self) -> Result<Vec<BulletState>> {
        self.with_tick(|t| t.bullets.clone())
    }

    /// 能量耗尽，不能移动也不能开火
    pub fn is_disabled(&self) -> Result<bool> {
        self.with_tick(|t| t.bot.is_disabled())
    }

    pub fn my_id(&self) -> Result<u32> {
        Ok(self.game_setup()?.my_id)
    }

    pub fn arena_width(&self) -> Result<u32> {
        Ok(self.game_setup()?.arena_width)
    }

    pub fn arena_height(&self) -> Result<u32> {
        Ok(self.game_setup()?.arena_height)
    }

    pub fn number_of_rounds(&self) -> Result<u32> {
        Ok(self.game_setup()?.number_of_rounds)
    }

    pub fn is_teammate(&self, bot_id: u32) -> Result<bool> {
        Ok(self.game_setup()?.is_teammate(bot_id))
    }

    pub fn distance_remaining(&self) -> f64 {
        self.inner.motion.lock().distance_remaining
    }

    pub fn turn_remaining(&self) -> f64 {
        self.inner.motion.lock().remaining(Axis::Body)
    }

    pub fn gun_turn_remaining(&self) -> f64 {
        self.inner.motion.lock().remaining(Axis::Gun)
    }

    pub fn radar_turn_remaining(&self) -> f64 {
        self.inner.motion.lock().remaining(Axis::Radar)
    }

    // ==================== 几何辅助 ====================

    pub fn normalize_absolute_angle(&self, angle: f64) -> f64 {
        motion::normalize_absolute_angle(angle)
    }

    pub fn normalize_relative_angle(&self, angle: f64) -> f64 {
        motion::normalize_relative_angle(angle)
    }

    pub fn calc_delta_angle(&self, target: f64, source: f64) -> f64 {
        motion::calc_delta_angle(target, source)
    }

    /// 从当前位置指向 `(x, y)` 的绝对方向（度）
    pub fn direction_to(&self, x: f64, y: f64) -> Result<f64> {
        let (x, y) = (check_finite("x", x)?, check_finite("y", y)?);
        self.with_tick(|t| {
            motion::normalize_absolute_angle((y - t.bot.y).atan2(x - t.bot.x).to_degrees())
        })
    }

    /// 车身朝向到 `(x, y)` 的相对角度（正值在左侧）
    pub fn bearing_to(&self, x: f64, y: f64) -> Result<f64> {
        let direction = self.direction_to(x, y)?;
        Ok(motion::normalize_relative_angle(direction - self.direction()?))
    }

    pub fn gun_bearing_to(&self, x: f64, y: f64) -> Result<f64> {
        let direction = self.direction_to(x, y)?;
        Ok(motion::normalize_relative_angle(direction - self.gun_direction()?))
    }

    pub fn radar_bearing_to(&self, x: f64, y: f64) -> Result<f64> {
        let direction = self.direction_to(x, y)?;
        Ok(motion::normalize_relative_angle(direction - self.radar_direction()?))
    }

    pub fn distance_to(&self, x: f64, y: f64) -> Result<f64> {
        let (x, y) = (check_finite("x", x)?, check_finite("y", y)?);
        self.with_tick(|t| (x - t.bot.x).hypot(y - t.bot.y))
    }

    pub fn calc_bullet_speed(&self, firepower: f64) -> f64 {
        arena_protocol::bullet_speed(firepower)
    }

    pub fn calc_gun_heat(&self, firepower: f64) -> f64 {
        arena_protocol::gun_heat(firepower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_driver::MockLink;
    use arena_protocol::BotState;

    struct Idle;
    impl BotBehavior for Idle {}

    fn bot() -> (Bot, Arc<MockLink>) {
        let link = Arc::new(MockLink::new());
        let bot = Bot::new(Arc::new(Idle), link.clone(), &BotConfig::default()).unwrap();
        (bot, link)
    }

    fn feed(bot: &Bot, tick: TickSnapshot) {
        bot.inner.ctx.accept_tick(tick).unwrap();
    }

    fn state(energy: f64, gun_heat: f64) -> BotState {
        BotState {
            energy,
            gun_heat,
            x: 100.0,
            y: 100.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_queries_before_data() {
        let (bot, _) = bot();
        assert!(matches!(bot.energy(), Err(BotError::NotAvailable(_))));
        assert!(matches!(bot.arena_width(), Err(BotError::NotAvailable(_))));
        assert!(bot.energy().unwrap_err().is_retryable());

        feed(&bot, TickSnapshot::new(1, 1, state(100.0, 0.0)));
        assert_eq!(bot.energy().unwrap(), 100.0);
        assert_eq!(bot.turn().unwrap(), 1);
    }

    #[test]
    fn test_blocking_call_from_foreign_thread() {
        let (bot, link) = bot();
        feed(&bot, TickSnapshot::new(1, 1, state(100.0, 0.0)));
        let err = bot.go().unwrap_err();
        assert_eq!(err.halt(), Some(Halt::ForeignThread));
        let err = bot.forward(10.0).unwrap_err();
        assert_eq!(err.halt(), Some(Halt::ForeignThread));
        assert_eq!(link.sent_count(), 0);
    }

    #[test]
    fn test_setters_reject_nan() {
        let (bot, _) = bot();
        for result in [
            bot.set_forward(f64::NAN),
            bot.set_turn_left(f64::NAN),
            bot.set_gun_turn_rate(f64::NAN),
            bot.set_target_speed(f64::NAN),
            bot.set_max_speed(f64::NAN),
        ] {
            assert!(matches!(result, Err(BotError::InvalidArgument { .. })));
        }
        assert!(matches!(
            bot.set_fire(f64::NAN),
            Err(BotError::InvalidArgument {
                param: "firepower",
                ..
            })
        ));
        // 被拒绝的调用不改变意图
        assert_eq!(bot.intent(), arena_protocol::BotIntent::default());
    }

    #[test]
    fn test_rates_clamped() {
        let (bot, _) = bot();
        bot.set_turn_rate(100.0).unwrap();
        bot.set_gun_turn_rate(-100.0).unwrap();
        bot.set_radar_turn_left(1000.0).unwrap();
        bot.set_target_speed(20.0).unwrap();
        let intent = bot.intent();
        assert_eq!(intent.turn_rate, Some(MAX_TURN_RATE));
        assert_eq!(intent.gun_turn_rate, Some(-MAX_GUN_TURN_RATE));
        assert_eq!(intent.radar_turn_rate, Some(MAX_RADAR_TURN_RATE));
        assert_eq!(intent.target_speed, Some(MAX_SPEED));

        bot.set_max_turn_rate(4.0).unwrap();
        bot.set_turn_left(90.0).unwrap();
        assert_eq!(bot.intent().turn_rate, Some(4.0));
        assert_eq!(bot.turn_remaining(), 90.0);

        bot.set_max_speed(100.0).unwrap();
        assert_eq!(bot.limits().max_speed, MAX_SPEED);
    }

    #[test]
    fn test_set_fire_rules() {
        let (bot, _) = bot();
        assert!(matches!(bot.set_fire(1.0), Err(BotError::NotAvailable(_))));

        feed(&bot, TickSnapshot::new(1, 1, state(100.0, 0.5)));
        // 炮管过热
        assert!(!bot.set_fire(1.0).unwrap());

        feed(&bot, TickSnapshot::new(1, 2, state(2.0, 0.0)));
        // 火力过低
        assert!(!bot.set_fire(0.05).unwrap());
        // 能量不足
        assert!(!bot.set_fire(2.5).unwrap());
        assert_eq!(bot.firepower(), None);

        feed(&bot, TickSnapshot::new(1, 3, state(100.0, 0.0)));
        assert!(bot.set_fire(10.0).unwrap());
        assert_eq!(bot.firepower(), Some(MAX_FIREPOWER));
    }

    #[test]
    fn test_set_fire_below_minimum_cancels_shot() {
        let (bot, _) = bot();
        feed(&bot, TickSnapshot::new(1, 1, state(100.0, 0.0)));
        assert!(bot.set_fire(2.0).unwrap());
        assert_eq!(bot.firepower(), Some(2.0));

        assert!(!bot.set_fire(0.05).unwrap());
        assert_eq!(bot.firepower(), None);
        assert_eq!(bot.intent().firepower, None);
    }

    #[test]
    fn test_team_messages() {
        let (bot, _) = bot();
        assert!(matches!(
            bot.send_team_message(Some(2), "hi"),
            Err(BotError::NotAvailable(_))
        ));

        bot.inner.ctx.store_setup(GameSetup {
            teammate_ids: [2].into_iter().collect(),
            ..Default::default()
        });
        bot.send_team_message(Some(2), "hi").unwrap();
        assert!(matches!(
            bot.send_team_message(Some(3), "hi"),
            Err(BotError::UnknownTeammate(3))
        ));
        for _ in 1..MAX_TEAM_MESSAGES_PER_TURN {
            bot.send_team_message(None, "all").unwrap();
        }
        assert!(matches!(
            bot.send_team_message(None, "one too many"),
            Err(BotError::TooManyTeamMessages { max: 10 })
        ));
        let intent = bot.intent();
        assert_eq!(intent.team_messages.len(), MAX_TEAM_MESSAGES_PER_TURN);
        assert_eq!(intent.team_messages[0].receiver_id, Some(2));
    }

    #[test]
    fn test_stop_twice_keeps_first_snapshot() {
        let (bot, _) = bot();
        bot.set_forward(100.0).unwrap();
        bot.set_turn_left(45.0).unwrap();
        assert!(bot.set_stop(false));
        let first = bot.inner.motion.lock().saved().cloned();

        bot.set_forward(5.0).unwrap();
        assert!(!bot.set_stop(false));
        assert_eq!(bot.inner.motion.lock().saved().cloned(), first);

        assert!(bot.set_resume());
        assert!(!bot.set_resume());
        assert_eq!(bot.turn_remaining(), 45.0);
    }

    #[test]
    fn test_geometry_helpers() {
        let (bot, _) = bot();
        feed(&bot, TickSnapshot::new(1, 1, state(100.0, 0.0)));
        assert!((bot.direction_to(200.0, 100.0).unwrap() - 0.0).abs() < 1e-9);
        assert!((bot.direction_to(100.0, 200.0).unwrap() - 90.0).abs() < 1e-9);
        assert!((bot.direction_to(0.0, 100.0).unwrap() - 180.0).abs() < 1e-9);
        assert!((bot.bearing_to(100.0, 0.0).unwrap() + 90.0).abs() < 1e-9);
        assert!((bot.distance_to(103.0, 104.0).unwrap() - 5.0).abs() < 1e-9);
        assert_eq!(bot.calc_bullet_speed(1.0), 17.0);
        assert_eq!(bot.normalize_relative_angle(270.0), -90.0);
    }

    #[test]
    fn test_output_capture() {
        let (bot, _) = bot();
        bot.print("hello ");
        bot.print("world");
        bot.eprint("oops");
        bot.set_debug_graphics("<svg/>");
        let intent = bot.intent();
        assert_eq!(intent.std_out.as_deref(), Some("hello world"));
        assert_eq!(intent.std_err.as_deref(), Some("oops"));
        assert_eq!(intent.debug_graphics.as_deref(), Some("<svg/>"));
    }
}
