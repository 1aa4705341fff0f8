//! 指令缓冲区数据（Intent）
//!
//! `BotIntent` 是每回合发送给服务器的指令集合。`None` 表示"不变/使用服务器默认值"。
//! 本模块只定义数据；加锁、校验、限幅和发送去重在驱动层和客户端层完成。

/// RGB 颜色
///
/// 颜色字符串的解析和校验由外部工具负责，这里只保存分量。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// 发给队友的消息
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamMessage {
    /// 接收者 ID，`None` 表示广播给所有队友
    pub receiver_id: Option<u32>,
    /// 已序列化的消息负载
    pub payload: String,
}

/// 每回合的指令缓冲区
///
/// # 生命周期
///
/// - 机器人启动时创建一次
/// - 每轮开始时重置为中性状态（[`BotIntent::reset`]）
/// - 每次发送后清空瞬态字段（[`BotIntent::clear_transient`]）
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BotIntent {
    /// 车身转向速率（度/回合，正值左转）
    pub turn_rate: Option<f64>,
    /// 炮塔转向速率
    pub gun_turn_rate: Option<f64>,
    /// 雷达转向速率
    pub radar_turn_rate: Option<f64>,
    /// 目标速度
    pub target_speed: Option<f64>,
    /// 火力，`None` 表示不开火
    pub firepower: Option<f64>,

    /// 请求本回合重新扫描
    pub rescan: bool,
    /// 开启服务器端瞄准辅助
    pub fire_assist: bool,
    /// 车身转向时炮塔反向补偿
    pub adjust_gun_for_body_turn: bool,
    /// 炮塔转向时雷达反向补偿
    pub adjust_radar_for_gun_turn: bool,

    pub body_color: Option<Color>,
    pub turret_color: Option<Color>,
    pub radar_color: Option<Color>,
    pub bullet_color: Option<Color>,
    pub scan_color: Option<Color>,
    pub tracks_color: Option<Color>,
    pub gun_color: Option<Color>,

    /// 本回合发出的队伍消息（保持顺序）
    pub team_messages: Vec<TeamMessage>,
    /// 捕获的标准输出
    pub std_out: Option<String>,
    /// 捕获的标准错误
    pub std_err: Option<String>,
    /// 调试图形负载
    pub debug_graphics: Option<String>,
}

impl BotIntent {
    /// 重置为中性状态（"没有任何意图"）
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 清空发送后不再保留的瞬态字段
    ///
    /// 队伍消息、捕获的输出和调试图形只属于发送它们的那个回合。
    pub fn clear_transient(&mut self) {
        self.team_messages.clear();
        self.std_out = None;
        self.std_err = None;
        self.debug_graphics = None;
    }

    /// 追加捕获的输出文本
    pub fn append_std_out(&mut self, text: &str) {
        self.std_out.get_or_insert_with(String::new).push_str(text);
    }

    /// 追加捕获的错误输出文本
    pub fn append_std_err(&mut self, text: &str) {
        self.std_err.get_or_insert_with(String::new).push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn busy_intent() -> BotIntent {
        BotIntent {
            turn_rate: Some(5.0),
            target_speed: Some(8.0),
            firepower: Some(1.5),
            rescan: true,
            body_color: Some(Color::rgb(255, 0, 0)),
            team_messages: vec![TeamMessage {
                receiver_id: None,
                payload: "{}".to_string(),
            }],
            debug_graphics: Some("<svg/>".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_reset_is_neutral() {
        let mut intent = busy_intent();
        intent.reset();
        assert_eq!(intent, BotIntent::default());
        assert!(intent.firepower.is_none());
        assert!(intent.turn_rate.is_none());
    }

    #[test]
    fn test_clear_transient_keeps_commands() {
        let mut intent = busy_intent();
        intent.append_std_out("line 1\n");
        intent.append_std_out("line 2\n");
        assert_eq!(intent.std_out.as_deref(), Some("line 1\nline 2\n"));

        intent.clear_transient();
        assert!(intent.team_messages.is_empty());
        assert!(intent.debug_graphics.is_none());
        assert!(intent.std_out.is_none());
        // 持续性指令保留
        assert_eq!(intent.turn_rate, Some(5.0));
        assert_eq!(intent.firepower, Some(1.5));
        assert_eq!(intent.body_color, Some(Color::rgb(255, 0, 0)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_intent_serde() {
        let intent = busy_intent();
        let json = serde_json::to_string(&intent).unwrap();
        let decoded: BotIntent = serde_json::from_str(&json).unwrap();
        assert_eq!(intent, decoded);
    }
}
