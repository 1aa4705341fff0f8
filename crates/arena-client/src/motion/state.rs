//! 运动状态
//!
//! 剩余量每回合更新一次：新快照到达之后、任何用户处理器运行之前。
//! 转向剩余量按服务器实际执行的朝向变化扣减（服务器对运动有最终决定权），
//! 距离剩余量按本回合下达的目标速度扣减。

use super::planner::{calc_delta_angle, distance_until_stop, is_near_zero, new_target_speed};
use arena_protocol::{
    BotIntent, BotState, MAX_GUN_TURN_RATE, MAX_RADAR_TURN_RATE, MAX_SPEED, MAX_TURN_RATE,
};

/// 转向轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// 车身
    Body,
    /// 炮塔
    Gun,
    /// 雷达
    Radar,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Body, Axis::Gun, Axis::Radar];

    /// 本轴在快照中的朝向
    pub fn heading(self, bot: &BotState) -> f64 {
        match self {
            Axis::Body => bot.direction,
            Axis::Gun => bot.gun_direction,
            Axis::Radar => bot.radar_direction,
        }
    }

    /// 本轴在意图中的转向速率字段
    pub fn rate_mut(self, intent: &mut BotIntent) -> &mut Option<f64> {
        match self {
            Axis::Body => &mut intent.turn_rate,
            Axis::Gun => &mut intent.gun_turn_rate,
            Axis::Radar => &mut intent.radar_turn_rate,
        }
    }

    pub fn rate(self, intent: &BotIntent) -> Option<f64> {
        match self {
            Axis::Body => intent.turn_rate,
            Axis::Gun => intent.gun_turn_rate,
            Axis::Radar => intent.radar_turn_rate,
        }
    }
}

/// 运动限制（用户可调，但不超过物理常量）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionLimits {
    pub max_speed: f64,
    pub max_turn_rate: f64,
    pub max_gun_turn_rate: f64,
    pub max_radar_turn_rate: f64,
}

impl Default for MotionLimits {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED,
            max_turn_rate: MAX_TURN_RATE,
            max_gun_turn_rate: MAX_GUN_TURN_RATE,
            max_radar_turn_rate: MAX_RADAR_TURN_RATE,
        }
    }
}

impl MotionLimits {
    /// 把每个限制收敛到 [0, 物理上限]，NaN 取物理上限
    pub fn sanitized(self) -> Self {
        fn bound(value: f64, physical: f64) -> f64 {
            if value.is_nan() {
                physical
            } else {
                value.clamp(0.0, physical)
            }
        }
        Self {
            max_speed: bound(self.max_speed, MAX_SPEED),
            max_turn_rate: bound(self.max_turn_rate, MAX_TURN_RATE),
            max_gun_turn_rate: bound(self.max_gun_turn_rate, MAX_GUN_TURN_RATE),
            max_radar_turn_rate: bound(self.max_radar_turn_rate, MAX_RADAR_TURN_RATE),
        }
    }

    pub fn max_rate(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Body => self.max_turn_rate,
            Axis::Gun => self.max_gun_turn_rate,
            Axis::Radar => self.max_radar_turn_rate,
        }
    }

    /// 限制转向速率
    pub fn clamp_rate(&self, axis: Axis, rate: f64) -> f64 {
        let max = self.max_rate(axis);
        rate.clamp(-max, max)
    }

    /// 限制目标速度
    pub fn clamp_speed(&self, speed: f64) -> f64 {
        speed.clamp(-self.max_speed, self.max_speed)
    }
}

/// `stop()` 时保存的快照
#[derive(Debug, Clone, PartialEq)]
pub struct SavedMotion {
    pub distance_remaining: f64,
    pub turn_remaining: f64,
    pub gun_turn_remaining: f64,
    pub radar_turn_remaining: f64,
    pub previous_direction: f64,
    pub previous_gun_direction: f64,
    pub previous_radar_direction: f64,
    pub target_speed: Option<f64>,
    pub turn_rate: Option<f64>,
    pub gun_turn_rate: Option<f64>,
    pub radar_turn_rate: Option<f64>,
}

/// 运动状态
///
/// 剩余量带符号，`±∞` 表示一直执行直到被改变。
#[derive(Debug, Clone, Default)]
pub struct MotionState {
    pub distance_remaining: f64,
    pub turn_remaining: f64,
    pub gun_turn_remaining: f64,
    pub radar_turn_remaining: f64,
    previous_direction: f64,
    previous_gun_direction: f64,
    previous_radar_direction: f64,
    overdrive: bool,
    saved: Option<SavedMotion>,
}

impl MotionState {
    /// 新一轮开始：清空剩余量和停止快照，朝向基准取当前快照
    pub fn reset(&mut self, bot: &BotState) {
        *self = Self::default();
        for axis in Axis::ALL {
            *self.previous_mut(axis) = axis.heading(bot);
        }
    }

    /// 清空所有剩余量
    pub fn clear_remaining(&mut self) {
        self.distance_remaining = 0.0;
        self.turn_remaining = 0.0;
        self.gun_turn_remaining = 0.0;
        self.radar_turn_remaining = 0.0;
        self.overdrive = false;
    }

    pub fn remaining(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Body => self.turn_remaining,
            Axis::Gun => self.gun_turn_remaining,
            Axis::Radar => self.radar_turn_remaining,
        }
    }

    fn remaining_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::Body => &mut self.turn_remaining,
            Axis::Gun => &mut self.gun_turn_remaining,
            Axis::Radar => &mut self.radar_turn_remaining,
        }
    }

    fn previous_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::Body => &mut self.previous_direction,
            Axis::Gun => &mut self.previous_gun_direction,
            Axis::Radar => &mut self.previous_radar_direction,
        }
    }

    pub fn is_overdrive(&self) -> bool {
        self.overdrive
    }

    pub fn is_stopped(&self) -> bool {
        self.saved.is_some()
    }

    /// 停止时保存的快照
    pub fn saved(&self) -> Option<&SavedMotion> {
        self.saved.as_ref()
    }

    /// 每回合更新（新快照到达后调用一次）
    ///
    /// - 已停止：不更新
    /// - 已失能：清空所有剩余量
    /// - 否则：按实际朝向变化扣减转向剩余量，重新计算三个转向速率和目标速度
    pub fn update(&mut self, bot: &BotState, intent: &mut BotIntent, limits: &MotionLimits) {
        if self.is_stopped() {
            return;
        }

        if bot.is_disabled() {
            for axis in Axis::ALL {
                *self.previous_mut(axis) = axis.heading(bot);
            }
            self.clear_remaining();
            return;
        }

        for axis in Axis::ALL {
            self.update_axis(axis, axis.heading(bot), intent, limits);
        }

        match self.update_distance(bot.speed, limits.max_speed) {
            Some(speed) => intent.target_speed = Some(speed),
            None => {
                // 无限距离：保持已下达的目标速度，只按当前上限重新限幅
                let fallback = self.distance_remaining.signum() * limits.max_speed;
                intent.target_speed =
                    Some(limits.clamp_speed(intent.target_speed.unwrap_or(fallback)));
            },
        }
    }

    fn update_axis(
        &mut self,
        axis: Axis,
        heading: f64,
        intent: &mut BotIntent,
        limits: &MotionLimits,
    ) {
        let previous = std::mem::replace(self.previous_mut(axis), heading);
        let delta = calc_delta_angle(heading, previous);

        let remaining = self.remaining_mut(axis);
        if remaining.abs() <= delta.abs() {
            *remaining = 0.0;
        } else {
            *remaining -= delta;
            if is_near_zero(*remaining) {
                *remaining = 0.0;
            }
        }

        let remaining = *remaining;
        let rate = axis.rate_mut(intent);
        if remaining.is_infinite() {
            *rate = rate.map(|r| limits.clamp_rate(axis, r));
        } else {
            *rate = Some(limits.clamp_rate(axis, remaining));
        }
    }

    /// 距离更新：返回本回合的目标速度，剩余距离为无穷时返回 `None`
    ///
    /// 过冲（overdrive）检测：如果按新速度刹车会冲过剩余距离，置位；
    /// 置位状态下速度降到 0 时，把剩余距离强制归零，避免在目标点附近来回修正。
    pub(crate) fn update_distance(&mut self, speed: f64, max_speed: f64) -> Option<f64> {
        if self.distance_remaining.is_infinite() {
            return None;
        }

        let mut distance = self.distance_remaining;
        let new_speed = new_target_speed(speed, distance, max_speed);

        if is_near_zero(new_speed) && self.overdrive {
            distance = 0.0;
            self.overdrive = false;
        }

        if distance * new_speed >= 0.0 {
            self.overdrive = distance_until_stop(new_speed, max_speed) > distance.abs();
        }

        self.distance_remaining = distance - new_speed;
        if is_near_zero(self.distance_remaining) {
            self.distance_remaining = 0.0;
        }
        Some(new_speed)
    }

    /// 设置剩余距离，并立即下达本回合的目标速度
    pub fn set_distance(
        &mut self,
        distance: f64,
        current_speed: f64,
        intent: &mut BotIntent,
        limits: &MotionLimits,
    ) {
        self.distance_remaining = distance;
        self.overdrive = false;
        intent.target_speed = match self.update_distance(current_speed, limits.max_speed) {
            Some(speed) => Some(speed),
            None => Some(distance.signum() * limits.max_speed),
        };
    }

    /// 设置目标速度（持续行驶，直到被改变）
    pub fn set_target_speed(&mut self, speed: f64, intent: &mut BotIntent, limits: &MotionLimits) {
        self.distance_remaining = to_infinite(speed);
        self.overdrive = false;
        intent.target_speed = Some(limits.clamp_speed(speed));
    }

    /// 设置某轴的剩余转向角度
    pub fn set_turn(&mut self, axis: Axis, degrees: f64, intent: &mut BotIntent, limits: &MotionLimits) {
        *self.remaining_mut(axis) = degrees;
        *axis.rate_mut(intent) = Some(limits.clamp_rate(axis, degrees));
    }

    /// 设置某轴的转向速率（持续转动，直到被改变）
    pub fn set_turn_rate(&mut self, axis: Axis, rate: f64, intent: &mut BotIntent, limits: &MotionLimits) {
        *self.remaining_mut(axis) = to_infinite(rate);
        *axis.rate_mut(intent) = Some(limits.clamp_rate(axis, rate));
    }

    /// 停止：保存当前运动状态并把本回合的速度和转向速率清零
    ///
    /// 已停止时重复调用不做任何事，除非 `overwrite` 为 true（用当前状态替换快照）。
    /// 返回是否保存了新的快照。
    pub fn stop(&mut self, intent: &mut BotIntent, overwrite: bool) -> bool {
        if self.is_stopped() && !overwrite {
            return false;
        }

        self.saved = Some(SavedMotion {
            distance_remaining: self.distance_remaining,
            turn_remaining: self.turn_remaining,
            gun_turn_remaining: self.gun_turn_remaining,
            radar_turn_remaining: self.radar_turn_remaining,
            previous_direction: self.previous_direction,
            previous_gun_direction: self.previous_gun_direction,
            previous_radar_direction: self.previous_radar_direction,
            target_speed: intent.target_speed,
            turn_rate: intent.turn_rate,
            gun_turn_rate: intent.gun_turn_rate,
            radar_turn_rate: intent.radar_turn_rate,
        });

        intent.target_speed = Some(0.0);
        intent.turn_rate = Some(0.0);
        intent.gun_turn_rate = Some(0.0);
        intent.radar_turn_rate = Some(0.0);
        true
    }

    /// 恢复 `stop()` 保存的运动状态；未停止时不做任何事
    pub fn resume(&mut self, intent: &mut BotIntent) -> bool {
        let Some(saved) = self.saved.take() else {
            return false;
        };

        self.distance_remaining = saved.distance_remaining;
        self.turn_remaining = saved.turn_remaining;
        self.gun_turn_remaining = saved.gun_turn_remaining;
        self.radar_turn_remaining = saved.radar_turn_remaining;
        self.previous_direction = saved.previous_direction;
        self.previous_gun_direction = saved.previous_gun_direction;
        self.previous_radar_direction = saved.previous_radar_direction;
        intent.target_speed = saved.target_speed;
        intent.turn_rate = saved.turn_rate;
        intent.gun_turn_rate = saved.gun_turn_rate;
        intent.radar_turn_rate = saved.radar_turn_rate;
        true
    }
}

/// 速率转为剩余量：正值 → +∞，负值 → -∞，0 → 0
fn to_infinite(value: f64) -> f64 {
    if value > 0.0 {
        f64::INFINITY
    } else if value < 0.0 {
        f64::NEG_INFINITY
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bot_at(direction: f64, gun: f64, radar: f64) -> BotState {
        BotState {
            energy: 100.0,
            direction,
            gun_direction: gun,
            radar_direction: radar,
            ..Default::default()
        }
    }

    #[test]
    fn test_turn_completes_exactly() {
        let limits = MotionLimits::default();
        let mut intent = BotIntent::default();
        let mut state = MotionState::default();
        state.reset(&bot_at(0.0, 0.0, 0.0));

        state.set_turn(Axis::Body, 25.0, &mut intent, &limits);
        assert_eq!(intent.turn_rate, Some(10.0));

        let mut heading = 0.0;
        for (delta, expected_rate) in [(10.0, 10.0), (10.0, 5.0), (5.0, 0.0)] {
            heading += delta;
            state.update(&bot_at(heading, 0.0, 0.0), &mut intent, &limits);
            assert_eq!(intent.turn_rate, Some(expected_rate));
        }
        assert_eq!(state.turn_remaining, 0.0);
    }

    #[test]
    fn test_turn_across_wraparound() {
        let limits = MotionLimits::default();
        let mut intent = BotIntent::default();
        let mut state = MotionState::default();
        state.reset(&bot_at(355.0, 0.0, 0.0));

        state.set_turn(Axis::Body, 15.0, &mut intent, &limits);
        state.update(&bot_at(5.0, 0.0, 0.0), &mut intent, &limits);
        assert_eq!(state.turn_remaining, 5.0);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let limits = MotionLimits::default();
        let mut intent = BotIntent::default();
        let mut state = MotionState::default();
        state.reset(&bot_at(90.0, 45.0, 10.0));
        state.set_distance(100.0, 0.0, &mut intent, &limits);
        state.set_turn(Axis::Gun, -30.0, &mut intent, &limits);

        assert!(state.stop(&mut intent, false));
        let first = state.saved().cloned();
        assert_eq!(intent.target_speed, Some(0.0));
        assert_eq!(intent.gun_turn_rate, Some(0.0));

        assert!(!state.stop(&mut intent, false));
        assert_eq!(state.saved().cloned(), first);

        // overwrite 用当前（已清零的）指令替换快照
        assert!(state.stop(&mut intent, true));
        assert_eq!(state.saved().and_then(|s| s.target_speed), Some(0.0));
    }

    #[test]
    fn test_resume_restores_saved() {
        let limits = MotionLimits::default();
        let mut intent = BotIntent::default();
        let mut state = MotionState::default();
        state.reset(&bot_at(0.0, 0.0, 0.0));

        assert!(!state.resume(&mut intent));

        state.set_turn(Axis::Radar, 90.0, &mut intent, &limits);
        state.stop(&mut intent, false);
        assert!(state.is_stopped());

        // 停止期间不更新
        state.update(&bot_at(0.0, 0.0, 20.0), &mut intent, &limits);
        assert_eq!(state.radar_turn_remaining, 90.0);

        assert!(state.resume(&mut intent));
        assert!(!state.is_stopped());
        assert_eq!(state.radar_turn_remaining, 90.0);
        assert_eq!(intent.radar_turn_rate, Some(45.0));
    }

    #[test]
    fn test_disabled_clears_remaining() {
        let limits = MotionLimits::default();
        let mut intent = BotIntent::default();
        let mut state = MotionState::default();
        state.reset(&bot_at(0.0, 0.0, 0.0));
        state.set_distance(f64::INFINITY, 0.0, &mut intent, &limits);
        state.set_turn(Axis::Body, 45.0, &mut intent, &limits);

        let mut disabled = bot_at(0.0, 0.0, 0.0);
        disabled.energy = 0.0;
        state.update(&disabled, &mut intent, &limits);
        assert_eq!(state.distance_remaining, 0.0);
        assert_eq!(state.turn_remaining, 0.0);
    }

    #[test]
    fn test_infinite_rate_keeps_command() {
        let limits = MotionLimits::default();
        let mut intent = BotIntent::default();
        let mut state = MotionState::default();
        state.reset(&bot_at(0.0, 0.0, 0.0));

        state.set_turn_rate(Axis::Body, 4.0, &mut intent, &limits);
        state.set_target_speed(-3.0, &mut intent, &limits);
        state.update(&bot_at(4.0, 0.0, 0.0), &mut intent, &limits);

        assert_eq!(state.turn_remaining, f64::INFINITY);
        assert_eq!(intent.turn_rate, Some(4.0));
        assert_eq!(state.distance_remaining, f64::NEG_INFINITY);
        assert_eq!(intent.target_speed, Some(-3.0));

        // 降低上限后重新限幅
        let slower = MotionLimits {
            max_turn_rate: 2.0,
            max_speed: 1.0,
            ..limits
        };
        state.update(&bot_at(8.0, 0.0, 0.0), &mut intent, &slower);
        assert_eq!(intent.turn_rate, Some(2.0));
        assert_eq!(intent.target_speed, Some(-1.0));
    }

    #[test]
    fn test_limits_sanitized() {
        let limits = MotionLimits {
            max_speed: 20.0,
            max_turn_rate: -1.0,
            max_gun_turn_rate: f64::NAN,
            max_radar_turn_rate: 30.0,
        }
        .sanitized();
        assert_eq!(limits.max_speed, MAX_SPEED);
        assert_eq!(limits.max_turn_rate, 0.0);
        assert_eq!(limits.max_gun_turn_rate, MAX_GUN_TURN_RATE);
        assert_eq!(limits.max_radar_turn_rate, 30.0);
    }

    proptest! {
        /// 下达的转向速率永远不超过上限
        #[test]
        fn prop_rates_clamped(
            goal in -1000.0f64..1000.0,
            rate in -1000.0f64..1000.0,
            headings in proptest::collection::vec(0.0f64..360.0, 1..20),
            max_turn in 0.0f64..=10.0,
        ) {
            let limits = MotionLimits { max_turn_rate: max_turn, ..Default::default() };
            let mut intent = BotIntent::default();
            let mut state = MotionState::default();
            state.reset(&bot_at(0.0, 0.0, 0.0));
            state.set_turn(Axis::Body, goal, &mut intent, &limits);
            state.set_turn_rate(Axis::Gun, rate, &mut intent, &limits);
            state.set_turn(Axis::Radar, -goal, &mut intent, &limits);

            for heading in headings {
                state.update(&bot_at(heading, heading, heading), &mut intent, &limits);
                prop_assert!(intent.turn_rate.unwrap().abs() <= limits.max_turn_rate);
                prop_assert!(intent.gun_turn_rate.unwrap().abs() <= limits.max_gun_turn_rate);
                prop_assert!(intent.radar_turn_rate.unwrap().abs() <= limits.max_radar_turn_rate);
            }
        }

        /// 实际转过的角度之和等于目标角度时，剩余量恰好为 0
        #[test]
        fn prop_turn_completion_exact(
            deltas in proptest::collection::vec(0.1f64..10.0, 1..30),
            left in any::<bool>(),
        ) {
            let sign = if left { 1.0 } else { -1.0 };
            let goal: f64 = sign * deltas.iter().sum::<f64>();
            let limits = MotionLimits::default();
            let mut intent = BotIntent::default();
            let mut state = MotionState::default();
            state.reset(&bot_at(0.0, 0.0, 0.0));
            state.set_turn(Axis::Body, goal, &mut intent, &limits);

            let mut heading = 0.0;
            for (i, delta) in deltas.iter().enumerate() {
                heading = normalize(heading + sign * delta);
                state.update(&bot_at(heading, 0.0, 0.0), &mut intent, &limits);
                if i + 1 < deltas.len() {
                    prop_assert!(state.turn_remaining != 0.0 || deltas[i + 1..].iter().sum::<f64>() < 1e-5);
                }
            }
            prop_assert_eq!(state.turn_remaining, 0.0);
        }
    }

    fn normalize(angle: f64) -> f64 {
        crate::motion::normalize_absolute_angle(angle)
    }
}
