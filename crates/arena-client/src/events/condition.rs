//! 自定义条件
//!
//! 条件每回合针对最新快照评估一次；从假变为真时产生一个 `Custom` 事件。

use arena_protocol::TickSnapshot;
use smallvec::SmallVec;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::warn;

type Predicate = dyn Fn(&TickSnapshot) -> bool + Send + Sync;

/// 命名条件
#[derive(Clone)]
pub struct Condition {
    name: Arc<str>,
    test: Arc<Predicate>,
}

impl Condition {
    /// 创建条件
    ///
    /// # 示例
    ///
    /// ```rust
    /// use arena_client::Condition;
    ///
    /// let low_energy = Condition::new("low-energy", |tick| tick.bot.energy < 20.0);
    /// assert_eq!(low_energy.name(), "low-energy");
    /// ```
    pub fn new<F>(name: impl Into<Arc<str>>, test: F) -> Self
    where
        F: Fn(&TickSnapshot) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            test: Arc::new(test),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 评估条件；谓词 panic 时视为假
    pub fn test(&self, tick: &TickSnapshot) -> bool {
        match catch_unwind(AssertUnwindSafe(|| (self.test)(tick))) {
            Ok(value) => value,
            Err(_) => {
                warn!("Condition '{}' panicked, treating as false", self.name);
                false
            },
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition").field("name", &self.name).finish()
    }
}

/// 已注册的条件及其上一次的值
#[derive(Debug, Default)]
pub struct ConditionSet {
    entries: Vec<(Condition, bool)>,
}

impl ConditionSet {
    /// 注册条件；同名条件已存在时返回 `false`
    pub fn add(&mut self, condition: Condition) -> bool {
        if self.entries.iter().any(|(c, _)| c.name == condition.name) {
            return false;
        }
        self.entries.push((condition, false));
        true
    }

    /// 移除条件，返回是否存在
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(c, _)| c.name() != name);
        before != self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 评估所有条件，返回本回合从假变为真的条件名
    pub fn evaluate(&mut self, tick: &TickSnapshot) -> SmallVec<[Arc<str>; 4]> {
        let mut fired = SmallVec::new();
        for (condition, last) in self.entries.iter_mut() {
            let value = condition.test(tick);
            if value && !*last {
                fired.push(condition.name.clone());
            }
            *last = value;
        }
        fired
    }
}
