//! 错误类型体系
//!
//! 区分应用错误（[`BotError`] 的普通变体）和控制信号（[`Halt`]）。
//!
//! 控制信号不是故障：它们只是要求当前调用栈尽快返回。所有阻塞调用都返回
//! `Result<_, BotError>`，用户代码用 `?` 传播即可，信号会一路回到分发器或
//! 工作线程的顶层。
//!
//! # 示例
//!
//! ```rust
//! use arena_client::{BotError, Halt};
//!
//! fn report(err: &BotError) -> &'static str {
//!     match err.halt() {
//!         Some(Halt::Canceled) => "round over",
//!         Some(_) => "yielded",
//!         None if err.is_retryable() => "try again next turn",
//!         None => "failed",
//!     }
//! }
//!
//! assert_eq!(report(&BotError::NotAvailable("tick")), "try again next turn");
//! assert_eq!(report(&Halt::Canceled.into()), "round over");
//! ```

use arena_driver::DriverError;
use thiserror::Error;

/// 控制信号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Halt {
    /// 工作线程已被取消（本轮结束、死亡、断线）
    ///
    /// 取消是粘性的：之后该线程上的每个阻塞调用都立即返回此信号。
    #[error("worker canceled")]
    Canceled,

    /// 当前事件处理器被同类事件抢占，应尽快返回
    #[error("event handler interrupted")]
    Interrupted,

    /// 阻塞调用来自非工作线程
    #[error("blocking call from a thread that is not the bot worker")]
    ForeignThread,
}

/// 客户端错误类型
#[derive(Debug, Error)]
pub enum BotError {
    /// 参数无效（NaN 等）
    #[error("Invalid argument '{param}': {reason}")]
    InvalidArgument {
        /// 参数名
        param: &'static str,
        /// 原因
        reason: String,
    },

    /// 数据尚不可用（第一个 tick 之前查询回合状态，或对局开始前查询对局配置）
    #[error("Not available yet: {0}")]
    NotAvailable(&'static str),

    /// 本回合的队伍消息已达上限
    #[error("Too many team messages this turn (max {max})")]
    TooManyTeamMessages {
        /// 每回合上限
        max: usize,
    },

    /// 接收者不是队友
    #[error("Bot {0} is not a teammate")]
    UnknownTeammate(u32),

    /// 驱动层错误
    #[error("Driver error: {0}")]
    Driver(DriverError),

    /// 控制信号
    #[error("Halted: {0}")]
    Halted(#[from] Halt),
}

impl From<DriverError> for BotError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::Canceled => BotError::Halted(Halt::Canceled),
            DriverError::ForeignThread => BotError::Halted(Halt::ForeignThread),
            other => BotError::Driver(other),
        }
    }
}

impl BotError {
    /// 创建参数无效错误
    pub fn invalid_argument(param: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            param,
            reason: reason.into(),
        }
    }

    /// 控制信号（如果是）
    pub fn halt(&self) -> Option<Halt> {
        match self {
            Self::Halted(halt) => Some(*halt),
            _ => None,
        }
    }

    /// 是否为控制信号
    pub fn is_halt(&self) -> bool {
        self.halt().is_some()
    }

    /// 是否可重试
    ///
    /// 数据尚不可用时，等待相应的生命周期事件之后重试可能成功。
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotAvailable(_))
    }
}

/// 客户端层的 Result 别名
pub type Result<T> = std::result::Result<T, BotError>;

/// 拒绝 NaN 参数
pub(crate) fn check_finite_or_inf(param: &'static str, value: f64) -> Result<f64> {
    if value.is_nan() {
        return Err(BotError::invalid_argument(param, "must not be NaN"));
    }
    Ok(value)
}

/// 拒绝 NaN 和无穷参数
pub(crate) fn check_finite(param: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(BotError::invalid_argument(
            param,
            format!("must be a finite number, got {}", value),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_driver::LinkError;

    #[test]
    fn test_driver_error_mapping() {
        let err: BotError = DriverError::Canceled.into();
        assert_eq!(err.halt(), Some(Halt::Canceled));

        let err: BotError = DriverError::ForeignThread.into();
        assert_eq!(err.halt(), Some(Halt::ForeignThread));

        let err: BotError = DriverError::Link(LinkError::Closed).into();
        assert!(matches!(err, BotError::Driver(DriverError::Link(_))));
        assert!(!err.is_halt());
    }

    #[test]
    fn test_error_display() {
        let err = BotError::invalid_argument("distance", "must not be NaN");
        assert_eq!(
            err.to_string(),
            "Invalid argument 'distance': must not be NaN"
        );

        let err = BotError::TooManyTeamMessages { max: 10 };
        assert!(err.to_string().contains("max 10"));

        let err: BotError = Halt::Interrupted.into();
        assert_eq!(err.to_string(), "Halted: event handler interrupted");
    }

    #[test]
    fn test_retryable() {
        assert!(BotError::NotAvailable("tick").is_retryable());
        assert!(!BotError::UnknownTeammate(3).is_retryable());
        assert!(!BotError::Halted(Halt::Canceled).is_retryable());
    }

    #[test]
    fn test_argument_checks() {
        assert!(check_finite_or_inf("d", f64::INFINITY).is_ok());
        assert!(check_finite_or_inf("d", f64::NAN).is_err());
        assert!(check_finite("fp", f64::INFINITY).is_err());
        assert_eq!(check_finite("fp", 2.5).unwrap(), 2.5);
    }
}
