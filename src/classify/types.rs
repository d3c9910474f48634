use serde::{Deserialize, Serialize};

/// 表情分类标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Sad,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单次分类结果，直接序列化为响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    /// 预测标签
    pub prediction: Mood,
    /// 置信度 (0.5 - 1.0)，即分数到决策边界的距离折叠到胜出侧
    pub probability: f32,
}
