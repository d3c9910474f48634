use crate::models::MoodModel;
use crate::utils::error::MoodError;
use crate::{Config, Result};
use ndarray::Array4;
use ort::{
    inputs,
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// ONNX表情分类模型
///
/// 会话在进程启动时加载一次，之后只读共享。ONNX Runtime的
/// Session::run需要可变引用，因此推理通过互斥锁串行化。
pub struct OnnxMoodModel {
    session: Arc<Mutex<Session>>,
    input_name: String, // 动态发现的输入名称
    output_name: String, // 动态发现的输出名称
}

impl OnnxMoodModel {
    pub fn new(config: &Config) -> Result<Self> {
        let model_path = config.model_path();

        if !model_path.exists() {
            return Err(MoodError::ModelLoad(format!(
                "Classification model not found: {}",
                model_path.display()
            )));
        }

        tracing::info!("Loading classification model from: {}", model_path.display());

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(config.onnx_config.intra_threads)?
            .commit_from_file(&model_path)?;

        // 动态发现输入输出名称
        let input_name = match session.inputs.first() {
            Some(input) => {
                let input_name = input.name.clone();
                tracing::info!("Classification model input: '{}'", input_name);
                input_name
            }
            None => {
                return Err(MoodError::ModelLoad(
                    "Classification model has no inputs".to_string(),
                ));
            }
        };

        let output_name = if session.outputs.is_empty() {
            return Err(MoodError::ModelLoad(
                "Classification model has no outputs".to_string(),
            ));
        } else {
            let output_name = session.outputs[0].name.clone();
            tracing::info!("Classification model output: '{}'", output_name);

            // 记录所有可用输出用于调试
            for (i, output) in session.outputs.iter().enumerate() {
                tracing::debug!("Classification output[{}]: '{}'", i, output.name);
            }

            output_name
        };

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            output_name,
        })
    }
}

impl MoodModel for OnnxMoodModel {
    fn infer(&self, tensor: &Array4<f32>) -> Result<f32> {
        let input_tensor = Tensor::from_array(tensor.clone())?;

        let predictions = {
            let mut session = self.session.lock();
            let outputs = session.run(inputs![self.input_name.as_str() => input_tensor])?;

            match outputs.get(&self.output_name) {
                Some(output) => output.try_extract_array::<f32>()?.into_owned(),
                None => {
                    // 提供详细的错误诊断信息
                    let available_outputs: Vec<String> =
                        outputs.keys().map(|s| s.to_string()).collect();
                    return Err(MoodError::ModelInvocation(format!(
                        "Output '{}' not found. Available outputs: {:?}",
                        self.output_name, available_outputs
                    )));
                }
            }
        };

        // sigmoid二分类输出约定为 (1, 1)
        let pred_shape = predictions.shape();
        if pred_shape.len() != 2 || pred_shape[0] != 1 || pred_shape[1] != 1 {
            return Err(MoodError::ModelInvocation(format!(
                "Expected output shape [1, 1], got {:?}",
                pred_shape
            )));
        }

        Ok(predictions[[0, 0]])
    }
}
