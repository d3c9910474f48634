use crate::classify::{Classification, Mood};
use crate::image::{ImageLoader, Preprocessor};
use crate::models::MoodModel;
use crate::utils::error::MoodError;
use crate::Result;
use ndarray::Array4;
use std::sync::Arc;
use std::time::Instant;

/// 决策边界，由模型训练时的sigmoid输出约定固定
pub const DECISION_THRESHOLD: f32 = 0.5;

/// 分类决策引擎
///
/// 持有进程启动时构造的只读模型句柄，每个请求调用模型恰好一次。
/// 引擎本身无状态，可被任意多个请求并发使用。
pub struct DecisionEngine {
    model: Arc<dyn MoodModel>,
}

impl DecisionEngine {
    pub fn new(model: Arc<dyn MoodModel>) -> Self {
        Self { model }
    }

    /// 完整流水线: 原始字节 → 解码 → 归一化 → 推理 → 标签
    pub fn classify_bytes(&self, bytes: &[u8]) -> Result<Classification> {
        let start_time = Instant::now();

        let tensor = Preprocessor::preprocess(bytes)?;
        let result = self.classify(&tensor)?;

        tracing::info!(
            "Classification completed: prediction={}, probability={:.4}, time={:.3}s",
            result.prediction,
            result.probability,
            start_time.elapsed().as_secs_f32()
        );

        Ok(result)
    }

    /// 完整流水线，base64输入
    pub fn classify_base64(&self, base64_data: &str) -> Result<Classification> {
        let start_time = Instant::now();

        let image = ImageLoader::from_base64(base64_data)?;
        let tensor = Preprocessor::to_tensor(&image)?;
        let result = self.classify(&tensor)?;

        tracing::info!(
            "Classification completed: prediction={}, probability={:.4}, time={:.3}s",
            result.prediction,
            result.probability,
            start_time.elapsed().as_secs_f32()
        );

        Ok(result)
    }

    /// 对归一化张量执行一次模型调用并映射到标签
    pub fn classify(&self, tensor: &Array4<f32>) -> Result<Classification> {
        let score = self.model.infer(tensor)?;

        if !(0.0..=1.0).contains(&score) {
            return Err(MoodError::ModelInvocation(format!(
                "Model returned score {} outside [0.0, 1.0]",
                score
            )));
        }

        // 严格小于比较：score恰好等于0.5时判为Sad。
        // 边界方向沿用训练侧的约定，不要改成<=。
        let (prediction, probability) = if score < DECISION_THRESHOLD {
            (Mood::Happy, 1.0 - score)
        } else {
            (Mood::Sad, score)
        };

        Ok(Classification {
            prediction,
            probability,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedScoreModel(f32);

    impl MoodModel for FixedScoreModel {
        fn infer(&self, _tensor: &Array4<f32>) -> Result<f32> {
            Ok(self.0)
        }
    }

    struct FailingModel;

    impl MoodModel for FailingModel {
        fn infer(&self, _tensor: &Array4<f32>) -> Result<f32> {
            Err(MoodError::ModelInvocation("session exploded".to_string()))
        }
    }

    fn engine_with_score(score: f32) -> DecisionEngine {
        DecisionEngine::new(Arc::new(FixedScoreModel(score)))
    }

    fn dummy_tensor() -> Array4<f32> {
        Array4::zeros((1, 256, 256, 3))
    }

    #[test]
    fn low_score_maps_to_happy() {
        let result = engine_with_score(0.2).classify(&dummy_tensor()).unwrap();
        assert_eq!(result.prediction, Mood::Happy);
        assert!((result.probability - 0.8).abs() < 1e-6);
    }

    #[test]
    fn high_score_maps_to_sad() {
        let result = engine_with_score(0.9).classify(&dummy_tensor()).unwrap();
        assert_eq!(result.prediction, Mood::Sad);
        assert!((result.probability - 0.9).abs() < 1e-6);
    }

    #[test]
    fn boundary_values_resolve_exactly() {
        let cases = [
            (0.0f32, Mood::Happy, 1.0f32),
            (0.49999, Mood::Happy, 0.50001),
            (0.5, Mood::Sad, 0.5),
            (0.50001, Mood::Sad, 0.50001),
            (1.0, Mood::Sad, 1.0),
        ];

        for (score, expected_label, expected_probability) in cases {
            let result = engine_with_score(score).classify(&dummy_tensor()).unwrap();
            assert_eq!(result.prediction, expected_label, "score={}", score);
            assert!(
                (result.probability - expected_probability).abs() < 1e-5,
                "score={}, probability={}",
                score,
                result.probability
            );
        }
    }

    #[test]
    fn exact_threshold_is_sad() {
        // 0.5精确落在边界上必须判为Sad（严格小于比较）
        let result = engine_with_score(0.5).classify(&dummy_tensor()).unwrap();
        assert_eq!(result.prediction, Mood::Sad);
        assert_eq!(result.probability, 0.5);
    }

    #[test]
    fn probability_never_below_half() {
        for i in 0..=100 {
            let score = i as f32 / 100.0;
            let result = engine_with_score(score).classify(&dummy_tensor()).unwrap();
            assert!(
                (0.5..=1.0).contains(&result.probability),
                "score={}, probability={}",
                score,
                result.probability
            );
        }
    }

    #[test]
    fn out_of_range_scores_are_rejected() {
        for score in [-0.1f32, 1.5, f32::INFINITY] {
            let err = engine_with_score(score)
                .classify(&dummy_tensor())
                .unwrap_err();
            assert!(matches!(err, MoodError::ModelInvocation(_)), "score={}", score);
        }
    }

    #[test]
    fn nan_score_is_rejected() {
        let err = engine_with_score(f32::NAN)
            .classify(&dummy_tensor())
            .unwrap_err();
        assert!(matches!(err, MoodError::ModelInvocation(_)));
    }

    #[test]
    fn model_failure_propagates() {
        let engine = DecisionEngine::new(Arc::new(FailingModel));
        let err = engine.classify(&dummy_tensor()).unwrap_err();
        assert!(matches!(err, MoodError::ModelInvocation(_)));
    }
}
