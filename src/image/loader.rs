use crate::utils::error::MoodError;
use crate::Result;
use base64::Engine;
use image::{DynamicImage, GenericImageView, ImageFormat};

/// 最大接受的图像文件大小
pub const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024; // 50MB

/// 最大接受的图像边长
pub const MAX_DIMENSION: u32 = 8192;

pub struct ImageLoader;

impl ImageLoader {
    /// 从base64字符串加载图像
    pub fn from_base64(base64_data: &str) -> Result<DynamicImage> {
        // 检测并移除可能的数据URL前缀 (data:image/xxx;base64,)
        let base64_clean = if base64_data.starts_with("data:") {
            base64_data.split(',').nth(1).unwrap_or(base64_data)
        } else {
            base64_data
        };

        let image_bytes = base64::engine::general_purpose::STANDARD
            .decode(base64_clean)
            .map_err(MoodError::Base64)?;

        Self::from_bytes(&image_bytes)
    }

    /// 从原始字节加载图像
    pub fn from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        if bytes.is_empty() {
            return Err(MoodError::InvalidImage("Empty image data".to_string()));
        }

        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(MoodError::FileTooLarge(bytes.len(), MAX_IMAGE_BYTES));
        }

        // 容器格式可识别但不受支持时，给出明确错误
        if let Some(format) = Self::detect_format(bytes) {
            if !Self::is_supported_format(format) {
                return Err(MoodError::UnsupportedFormat(format!("{:?}", format)));
            }
        }

        let image = image::load_from_memory(bytes).map_err(MoodError::ImageDecode)?;

        Ok(image)
    }

    /// 检测图像格式
    pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }

    /// 验证图像格式是否支持
    pub fn is_supported_format(format: ImageFormat) -> bool {
        matches!(
            format,
            ImageFormat::Png
                | ImageFormat::Jpeg
                | ImageFormat::Bmp
                | ImageFormat::Tiff
                | ImageFormat::WebP
                | ImageFormat::Gif
        )
    }

    /// 验证图像尺寸
    pub fn validate_dimensions(image: &DynamicImage) -> Result<()> {
        let (width, height) = image.dimensions();

        // 零面积图像无法归一化
        if width == 0 || height == 0 {
            return Err(MoodError::InvalidImage(format!(
                "Degenerate image dimensions: {}x{}",
                width, height
            )));
        }

        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(MoodError::InvalidImage(format!(
                "Image too large: {}x{}, maximum {}x{}",
                width, height, MAX_DIMENSION, MAX_DIMENSION
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([10, 20, 30])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn loads_png_from_bytes() {
        let image = ImageLoader::from_bytes(&png_bytes(32, 16)).unwrap();
        assert_eq!(image.dimensions(), (32, 16));
    }

    #[test]
    fn empty_bytes_are_invalid() {
        let err = ImageLoader::from_bytes(&[]).unwrap_err();
        assert!(matches!(err, MoodError::InvalidImage(_)));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = ImageLoader::from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, MoodError::ImageDecode(_)));
    }

    #[test]
    fn truncated_png_fails_to_decode() {
        let bytes = png_bytes(64, 64);
        let err = ImageLoader::from_bytes(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, MoodError::ImageDecode(_)));
    }

    #[test]
    fn loads_base64_with_data_url_prefix() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(png_bytes(8, 8));
        let with_prefix = format!("data:image/png;base64,{}", encoded);

        assert!(ImageLoader::from_base64(&encoded).is_ok());
        assert!(ImageLoader::from_base64(&with_prefix).is_ok());
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let err = ImageLoader::from_base64("!!!not-base64!!!").unwrap_err();
        assert!(matches!(err, MoodError::Base64(_)));
    }

    #[test]
    fn zero_area_dimensions_are_rejected() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        let err = ImageLoader::validate_dimensions(&image).unwrap_err();
        assert!(matches!(err, MoodError::InvalidImage(_)));
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(MAX_DIMENSION + 1, 4));
        let err = ImageLoader::validate_dimensions(&image).unwrap_err();
        assert!(matches!(err, MoodError::InvalidImage(_)));
    }
}
