//! 基础类型
//!
//! 客户端层的错误类型和控制信号。

pub mod error;

pub use error::*;
