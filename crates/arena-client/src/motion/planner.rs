//! 运动学规划（纯函数）
//!
//! 速度规划遵循离散刹车模型：每回合最多加速 [`ACCELERATION`]、最多减速
//! [`ABS_DECELERATION`]。给定当前速度和剩余距离，求出下一回合的目标速度，
//! 使机器人恰好停在目标点上，既不提前停下也不冲过头。

use arena_protocol::{ABS_DECELERATION, ACCELERATION, MAX_SPEED};

/// 小于此值的剩余量视为 0
pub const EPSILON: f64 = 1e-5;

/// 是否接近 0
#[inline]
pub fn is_near_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// 不会 panic 的限幅（`f64::clamp` 在 min > max 时 panic）
#[inline]
fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// 计算下一回合的目标速度
///
/// # 参数
///
/// - `speed`: 当前速度（负值表示倒车）
/// - `distance`: 剩余距离（带符号，`±∞` 表示一直走）
/// - `max_speed`: 速度上限（用户可配置，不超过 [`MAX_SPEED`]）
///
/// 负距离通过对称性求解：`f(s, d) = -f(-s, -d)`。
pub fn new_target_speed(speed: f64, distance: f64, max_speed: f64) -> f64 {
    if distance < 0.0 {
        return -new_target_speed(-speed, -distance, max_speed);
    }

    let target = if distance == f64::INFINITY {
        max_speed
    } else {
        max_speed_for_distance(distance).min(max_speed)
    };

    if speed >= 0.0 {
        clamp(target, speed - ABS_DECELERATION, speed + ACCELERATION)
    } else {
        // 倒车时向前"加速"实际上是在减速，且不能冲过 0
        clamp(target, speed - ACCELERATION, speed + max_deceleration(-speed))
    }
}

/// 能在 `distance` 内刹停的最大速度
///
/// 求最少的整数刹车回合数 `T`，使离散刹车距离之和覆盖 `distance`，
/// 再把剩余的零头距离平摊到 `T` 个回合上。
fn max_speed_for_distance(distance: f64) -> f64 {
    let decel_time = ((((4.0 * 2.0 / ABS_DECELERATION) * distance + 1.0).sqrt() - 1.0) / 2.0)
        .ceil()
        .max(1.0);
    if decel_time.is_infinite() {
        return MAX_SPEED;
    }

    let decel_distance = (decel_time / 2.0) * (decel_time - 1.0) * ABS_DECELERATION;
    (decel_time - 1.0) * ABS_DECELERATION + (distance - decel_distance) / decel_time
}

/// 从速度 `speed`（≥ 0）开始一个回合内的最大减速量
///
/// 如果一个回合内就能减到 0，剩余时间按加速度反向加速。
fn max_deceleration(speed: f64) -> f64 {
    let decel_time = speed / ABS_DECELERATION;
    let accel_time = 1.0 - decel_time;
    decel_time.min(1.0) * ABS_DECELERATION + accel_time.max(0.0) * ACCELERATION
}

/// 以最大减速从 `speed` 刹停需要行驶的距离
pub fn distance_until_stop(speed: f64, max_speed: f64) -> f64 {
    let mut speed = speed.abs();
    let mut distance = 0.0;
    while speed > 0.0 {
        speed = new_target_speed(speed, 0.0, max_speed);
        distance += speed;
    }
    distance
}

/// 把角度归一化到 [0, 360)
pub fn normalize_absolute_angle(angle: f64) -> f64 {
    let angle = angle % 360.0;
    if angle >= 0.0 { angle } else { angle + 360.0 }
}

/// 把角度归一化到 [-180, 180)
pub fn normalize_relative_angle(angle: f64) -> f64 {
    let angle = angle % 360.0;
    if angle >= 0.0 {
        if angle < 180.0 { angle } else { angle - 360.0 }
    } else if angle >= -180.0 {
        angle
    } else {
        angle + 360.0
    }
}

/// 从 `source` 转到 `target` 的最小带符号角度（正值为左转）
pub fn calc_delta_angle(target: f64, source: f64) -> f64 {
    normalize_relative_angle(target - source)
}
