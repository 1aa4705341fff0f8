//! 运动规划器
//!
//! - [`planner`]: 纯运动学函数（目标速度、刹车距离、角度归一化）
//! - [`state`]: 每个机器人的运动状态（剩余量、上一回合朝向、停止/恢复快照）

pub mod planner;
pub mod state;

pub use planner::{
    calc_delta_angle, distance_until_stop, is_near_zero, new_target_speed,
    normalize_absolute_angle, normalize_relative_angle,
};
pub use state::{Axis, MotionLimits, MotionState, SavedMotion};
