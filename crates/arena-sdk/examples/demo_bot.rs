//! 演示机器人
//!
//! 在进程内模拟服务器：IO 线程运行 `run_loop`，主线程扮演服务器，
//! 每回合生成快照、等待机器人的意图，再把意图应用到机器人状态上。
//!
//! ```bash
//! RUST_LOG=debug cargo run -p arena-sdk --example demo_bot --features mock
//! ```

use anyhow::{Context, bail};
use arena_sdk::driver::MockLink;
use arena_sdk::prelude::*;
use arena_sdk::protocol::RawEvent;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// 沿正方形行驶，每条边结束时开一炮
struct SquareBot;

impl BotBehavior for SquareBot {
    fn run(&self, bot: &Bot) -> Result<()> {
        bot.set_body_color(Some(Color::rgb(0x20, 0x80, 0xff)));
        while bot.is_running() {
            bot.forward(60.0)?;
            bot.turn_left(90.0)?;
            if bot.fire(1.0)? {
                bot.print("fired\n");
            }
        }
        Ok(())
    }

    fn on_event(&self, bot: &Bot, event: &BotEvent) -> Result<()> {
        if let BotEvent::BulletFired { bullet, .. } = event {
            println!(
                "   💥 turn {}: bullet {} power {:.1}",
                bot.turn()?,
                bullet.bullet_id,
                bullet.power
            );
        }
        Ok(())
    }

    fn on_round_started(&self, _bot: &Bot, round: u32) -> Result<()> {
        println!("   🏁 round {} started", round);
        Ok(())
    }
}

const TURNS: u32 = 80;

fn main() -> anyhow::Result<()> {
    arena_sdk::init_logger();

    println!("🤖 Arena SDK - 演示机器人");
    println!("=========================\n");

    let link = Arc::new(MockLink::new());
    let runtime = Arc::new(BotRuntime::new(
        SquareBot,
        link.clone(),
        BotConfig::default(),
    )?);

    // ==================== IO 线程 ====================
    let (tx, rx) = crossbeam_channel::unbounded();
    let io = {
        let runtime = runtime.clone();
        thread::Builder::new()
            .name("arena-io".to_string())
            .spawn(move || runtime.run_loop(rx))
            .context("failed to spawn IO thread")?
    };

    tx.send(ServerMessage::GameStarted(GameSetup::default()))?;
    tx.send(ServerMessage::RoundStarted { round: 1 })?;

    // ==================== 模拟服务器 ====================
    let mut state = BotState {
        energy: 100.0,
        x: 400.0,
        y: 300.0,
        ..Default::default()
    };
    let mut pending = Vec::new();

    for turn in 1..=TURNS {
        let mut tick = TickSnapshot::new(1, turn, state.clone());
        tick.events = std::mem::take(&mut pending);
        tx.send(ServerMessage::Tick(tick))?;

        let deadline = Instant::now() + Duration::from_secs(1);
        let intent = loop {
            match link.last_sent() {
                Some((sent_turn, intent)) if sent_turn == turn => break intent,
                _ if Instant::now() > deadline => bail!("no intent for turn {}", turn),
                _ => thread::sleep(Duration::from_millis(1)),
            }
        };

        state.speed = intent.target_speed.unwrap_or(state.speed);
        state.direction += intent.turn_rate.unwrap_or(0.0);
        let radians = state.direction.to_radians();
        state.x += state.speed * radians.cos();
        state.y += state.speed * radians.sin();
        state.gun_heat = (state.gun_heat - 0.1).max(0.0);

        if let Some(power) = intent.firepower {
            state.gun_heat = arena_sdk::protocol::gun_heat(power);
            state.energy -= power;
            pending.push(RawEvent::BulletFired {
                turn: turn + 1,
                bullet: BulletState {
                    bullet_id: turn,
                    owner_id: 1,
                    power,
                    x: state.x,
                    y: state.y,
                    direction: state.gun_direction,
                    color: None,
                },
            });
        }
    }

    tx.send(ServerMessage::RoundEnded {
        round: 1,
        turn: TURNS,
    })?;
    tx.send(ServerMessage::GameEnded { rounds: 1 })?;
    drop(tx);

    let exit = io
        .join()
        .map_err(|_| anyhow::anyhow!("IO thread panicked"))?;

    // ==================== 统计 ====================
    let metrics = runtime.bot().metrics();
    println!("\n📊 IO loop exit: {:?}", exit);
    println!("   ticks received:   {}", metrics.ticks_received);
    println!("   intents sent:     {}", metrics.intents_sent);
    println!("   events queued:    {}", metrics.events_queued);
    println!("   handler failures: {}", metrics.handler_failures);
    println!(
        "   final position:   ({:.1}, {:.1}), energy {:.1}",
        state.x, state.y, state.energy
    );
    Ok(())
}
