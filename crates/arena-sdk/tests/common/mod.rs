//! 集成测试辅助：一个极简的服务器模拟器
//!
//! 测试线程扮演 IO 线程：逐回合把快照交给运行时，等待工作线程发送本回合意图，
//! 再把意图应用到模拟的机器人状态上生成下一回合快照。

#![allow(dead_code)]

use arena_driver::MockLink;
use arena_sdk::prelude::*;
use arena_sdk::protocol::{BotIntent, RawEvent, gun_heat};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const STEP_TIMEOUT: Duration = Duration::from_secs(2);
pub const MY_ID: u32 = 1;

/// 轮询直到条件成立或超时
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    condition()
}

/// 线程安全的记录器
#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.0.lock().iter().any(|e| e == entry)
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.lock().iter().position(|e| e == entry)
    }
}

type RunFn = dyn Fn(&Bot) -> Result<()> + Send + Sync;
type EventFn = dyn Fn(&Bot, &BotEvent) -> Result<()> + Send + Sync;

/// 用闭包拼出来的机器人行为
#[derive(Default)]
pub struct Script {
    run: Option<Box<RunFn>>,
    event: Option<Box<EventFn>>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_run(mut self, f: impl Fn(&Bot) -> Result<()> + Send + Sync + 'static) -> Self {
        self.run = Some(Box::new(f));
        self
    }

    pub fn on_event(
        mut self,
        f: impl Fn(&Bot, &BotEvent) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.event = Some(Box::new(f));
        self
    }
}

impl BotBehavior for Script {
    fn run(&self, bot: &Bot) -> Result<()> {
        match &self.run {
            Some(run) => run(bot),
            None => Ok(()),
        }
    }

    fn on_event(&self, bot: &Bot, event: &BotEvent) -> Result<()> {
        match &self.event {
            Some(handler) => handler(bot, event),
            None => Ok(()),
        }
    }
}

/// 模拟服务器
pub struct Arena {
    pub round: u32,
    pub turn: u32,
    pub state: BotState,
    target_speed: f64,
    turn_rate: f64,
    gun_turn_rate: f64,
    radar_turn_rate: f64,
    pending: Vec<RawEvent>,
}

impl Arena {
    pub fn new(round: u32) -> Self {
        Self {
            round,
            turn: 0,
            state: BotState {
                energy: 100.0,
                x: 400.0,
                y: 300.0,
                ..Default::default()
            },
            target_speed: 0.0,
            turn_rate: 0.0,
            gun_turn_rate: 0.0,
            radar_turn_rate: 0.0,
            pending: Vec::new(),
        }
    }

    /// 下一个快照的回合号
    pub fn next_turn(&self) -> u32 {
        self.turn + 1
    }

    /// 在下一个快照中附带子事件
    pub fn push_event(&mut self, event: RawEvent) {
        self.pending.push(event);
    }

    pub fn next_tick(&mut self) -> TickSnapshot {
        self.turn += 1;
        let mut tick = TickSnapshot::new(self.round, self.turn, self.state.clone());
        tick.events = std::mem::take(&mut self.pending);
        tick
    }

    /// 按意图推进一回合（速度规划已满足加减速约束，这里直接采用目标速度）
    pub fn apply(&mut self, intent: &BotIntent) {
        if let Some(speed) = intent.target_speed {
            self.target_speed = speed;
        }
        if let Some(rate) = intent.turn_rate {
            self.turn_rate = rate;
        }
        if let Some(rate) = intent.gun_turn_rate {
            self.gun_turn_rate = rate;
        }
        if let Some(rate) = intent.radar_turn_rate {
            self.radar_turn_rate = rate;
        }

        let state = &mut self.state;
        state.speed = self.target_speed;
        state.direction += self.turn_rate;
        state.gun_direction += self.gun_turn_rate;
        state.radar_direction += self.radar_turn_rate;
        let radians = state.direction.to_radians();
        state.x += state.speed * radians.cos();
        state.y += state.speed * radians.sin();
        state.gun_heat = (state.gun_heat - 0.1).max(0.0);

        if let Some(power) = intent.firepower {
            if state.gun_heat == 0.0 && state.energy >= power {
                state.gun_heat = gun_heat(power);
                state.energy -= power;
                let bullet = BulletState {
                    bullet_id: self.turn,
                    owner_id: MY_ID,
                    power,
                    x: state.x,
                    y: state.y,
                    direction: state.gun_direction,
                    color: None,
                };
                let turn = self.turn + 1;
                self.pending.push(RawEvent::BulletFired { turn, bullet });
            }
        }
    }
}

/// 运行时 + 模拟服务器
pub struct Harness {
    pub runtime: Arc<BotRuntime>,
    pub link: Arc<MockLink>,
    pub arena: Arena,
}

impl Harness {
    /// 开始对局和第一轮
    pub fn start<B: BotBehavior>(behavior: B) -> Self {
        Self::start_with(behavior, BotConfig::default())
    }

    pub fn start_with<B: BotBehavior>(behavior: B, config: BotConfig) -> Self {
        let link = Arc::new(MockLink::new());
        let runtime = Arc::new(BotRuntime::new(behavior, link.clone(), config).unwrap());
        runtime.on_game_started(GameSetup {
            my_id: MY_ID,
            teammate_ids: [2].into_iter().collect(),
            ..Default::default()
        });
        runtime.on_round_started(1);
        Self {
            runtime,
            link,
            arena: Arena::new(1),
        }
    }

    pub fn bot(&self) -> &Bot {
        self.runtime.bot()
    }

    /// 下发下一回合快照，等待该回合的意图并应用；返回是否收到意图
    pub fn step(&mut self) -> bool {
        let before = self.link.sent_count();
        let tick = self.arena.next_tick();
        self.runtime.on_tick(tick);

        let link = self.link.clone();
        if !wait_until(STEP_TIMEOUT, || link.sent_count() > before) {
            return false;
        }
        if let Some((turn, intent)) = self.link.last_sent() {
            assert_eq!(turn, self.arena.turn, "intent sent for an unexpected turn");
            self.arena.apply(&intent);
        }
        true
    }

    /// 只下发快照，不等待意图（用于本回合不会发送意图的场景）
    pub fn feed(&mut self) -> u32 {
        let tick = self.arena.next_tick();
        let turn = tick.turn;
        self.runtime.on_tick(tick);
        turn
    }

    /// 附带子事件推进一回合
    pub fn step_with(&mut self, events: impl IntoIterator<Item = RawEvent>) -> bool {
        for event in events {
            self.arena.push_event(event);
        }
        self.step()
    }

    /// 推进直到条件成立，最多 `max_turns` 回合
    pub fn run_until(&mut self, max_turns: u32, mut done: impl FnMut(&Self) -> bool) -> bool {
        for _ in 0..max_turns {
            if !self.step() {
                return false;
            }
            if done(self) {
                return true;
            }
        }
        false
    }

    /// 开始新的一轮
    pub fn next_round(&mut self) {
        let round = self.arena.round + 1;
        self.runtime.on_round_ended(self.arena.round, self.arena.turn);
        self.runtime.on_round_started(round);
        self.arena = Arena::new(round);
    }

    pub fn sent_intents(&self) -> Vec<BotIntent> {
        self.link.sent().into_iter().map(|(_, intent)| intent).collect()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.runtime.shutdown();
    }
}
