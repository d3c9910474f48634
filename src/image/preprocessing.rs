use crate::image::ImageLoader;
use crate::Result;
use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

/// 模型输入高度
pub const INPUT_HEIGHT: u32 = 256;

/// 模型输入宽度
pub const INPUT_WIDTH: u32 = 256;

/// 模型输入通道数
pub const INPUT_CHANNELS: usize = 3;

pub struct Preprocessor;

impl Preprocessor {
    /// 完整预处理流水线: 原始字节 → (1, 256, 256, 3) 归一化张量
    pub fn preprocess(bytes: &[u8]) -> Result<Array4<f32>> {
        let image = ImageLoader::from_bytes(bytes)?;
        Self::to_tensor(&image)
    }

    /// 转换DynamicImage为归一化的NHWC张量
    ///
    /// 任意颜色模式先转为RGB（丢弃alpha通道），再拉伸到256x256
    /// （不保留宽高比，与模型训练时的预处理一致），每个通道值
    /// 除以255归一化到[0, 1]，最后添加batch维度。
    pub fn to_tensor(image: &DynamicImage) -> Result<Array4<f32>> {
        ImageLoader::validate_dimensions(image)?;

        let rgb_image = image.to_rgb8();
        let resized = image::imageops::resize(
            &rgb_image,
            INPUT_WIDTH,
            INPUT_HEIGHT,
            FilterType::Triangle,
        );

        let (width, height) = (INPUT_WIDTH as usize, INPUT_HEIGHT as usize);
        let raw_data = resized.into_raw();

        let mut tensor = Array4::<f32>::zeros((1, height, width, INPUT_CHANNELS));

        for (i, pixel_value) in raw_data.iter().enumerate() {
            let h = (i / INPUT_CHANNELS) / width;
            let w = (i / INPUT_CHANNELS) % width;
            let c = i % INPUT_CHANNELS;
            tensor[[0, h, w, c]] = *pixel_value as f32 / 255.0;
        }

        Ok(tensor)
    }
}
