//! 用户行为接口
//!
//! 用户实现 [`BotBehavior`]：`run()` 是工作线程的入口，`on_event()` 接收按优先级
//! 分发的回合事件，生命周期方法在 IO 线程上直接调用。
//!
//! # 示例
//!
//! ```rust
//! use arena_client::{Bot, BotBehavior, BotEvent, Result};
//!
//! struct Spinner;
//!
//! impl BotBehavior for Spinner {
//!     fn run(&self, bot: &Bot) -> Result<()> {
//!         while bot.is_running() {
//!             bot.set_turn_rate(10.0)?;
//!             bot.forward(100.0)?;
//!             bot.back(100.0)?;
//!         }
//!         Ok(())
//!     }
//!
//!     fn on_event(&self, bot: &Bot, event: &BotEvent) -> Result<()> {
//!         if let BotEvent::ScannedBot { .. } = event {
//!             bot.fire(1.0)?;
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use crate::bot::Bot;
use crate::events::BotEvent;
use crate::types::Result;
use arena_protocol::GameSetup;

/// 机器人行为
///
/// 所有方法都有默认实现（什么也不做）。
///
/// # 线程
///
/// - `run()` 和 `on_event()` 在本轮的工作线程上执行，可以调用阻塞原语
/// - 生命周期方法在 IO 线程上执行，不能调用阻塞原语（会返回 `ForeignThread`）
///
/// 返回的错误和 panic 只会被记录，不会中断回合循环。
pub trait BotBehavior: Send + Sync + 'static {
    /// 工作线程入口（每轮调用一次）
    ///
    /// 返回后，只要本轮仍在进行，运行时会继续每回合调用 `go()`，
    /// 事件处理器照常执行，意图照常发送。
    fn run(&self, bot: &Bot) -> Result<()> {
        let _ = bot;
        Ok(())
    }

    /// 回合事件处理器
    fn on_event(&self, bot: &Bot, event: &BotEvent) -> Result<()> {
        let _ = (bot, event);
        Ok(())
    }

    /// 对局开始（ready 信号在此之后发送）
    fn on_game_started(&self, bot: &Bot, setup: &GameSetup) -> Result<()> {
        let _ = (bot, setup);
        Ok(())
    }

    /// 新一轮开始
    fn on_round_started(&self, bot: &Bot, round: u32) -> Result<()> {
        let _ = (bot, round);
        Ok(())
    }

    /// 本轮结束（工作线程已被取消）
    fn on_round_ended(&self, bot: &Bot, round: u32, turn: u32) -> Result<()> {
        let _ = (bot, round, turn);
        Ok(())
    }

    /// 对局结束
    fn on_game_ended(&self, bot: &Bot, rounds: u32) -> Result<()> {
        let _ = (bot, rounds);
        Ok(())
    }
}
