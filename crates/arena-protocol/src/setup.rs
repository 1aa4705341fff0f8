//! 对局配置
//!
//! 游戏开始时由服务器下发一次，整个对局期间不变。

use std::collections::BTreeSet;

/// 对局配置
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameSetup {
    /// 本机器人在对局中的 ID
    pub my_id: u32,
    /// 竞技场宽度
    pub arena_width: u32,
    /// 竞技场高度
    pub arena_height: u32,
    /// 总轮数
    pub number_of_rounds: u32,
    /// 炮管冷却速率（每回合）
    pub gun_cooling_rate: f64,
    /// 连续无伤害回合上限（超过后开始扣能量）
    pub max_inactivity_turns: u32,
    /// 单回合超时（微秒）
    pub turn_timeout_us: u64,
    /// 队友 ID 集合（不含自己）
    pub teammate_ids: BTreeSet<u32>,
}

impl Default for GameSetup {
    fn default() -> Self {
        Self {
            my_id: 1,
            arena_width: 800,
            arena_height: 600,
            number_of_rounds: 10,
            gun_cooling_rate: 0.1,
            max_inactivity_turns: 450,
            turn_timeout_us: 30_000,
            teammate_ids: BTreeSet::new(),
        }
    }
}

impl GameSetup {
    /// 指定 ID 是否为队友
    pub fn is_teammate(&self, bot_id: u32) -> bool {
        self.teammate_ids.contains(&bot_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teammates() {
        let setup = GameSetup {
            teammate_ids: [4, 7].into_iter().collect(),
            ..Default::default()
        };
        assert!(setup.is_teammate(4));
        assert!(setup.is_teammate(7));
        assert!(!setup.is_teammate(setup.my_id));
    }
}
