pub mod classifier;

pub use classifier::OnnxMoodModel;

use crate::Result;
use ndarray::Array4;

/// 推理模型能力接口
///
/// 决策引擎只依赖这一个方法，生产实现由ONNX会话支撑，
/// 测试中可注入确定性的假模型。实现必须可被多个请求并发调用。
pub trait MoodModel: Send + Sync {
    /// 对单个归一化张量执行一次推理，返回[0, 1]内的sigmoid分数
    fn infer(&self, tensor: &Array4<f32>) -> Result<f32>;
}

/// 模型统计信息
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelStats {
    pub input_height: u32,
    pub input_width: u32,
    pub input_channels: usize,
    pub intra_threads: usize,
    pub optimization_level: i32,
}
