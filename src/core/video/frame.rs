use super::error::VideoError;
use image::RgbImage;
use std::time::Duration;

const RGB_CHANNELS: usize = 3;

/// 帧数据结构
///
/// 只在一次迭代内存活：检测、分类、计入统计后即丢弃。
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGB24 格式
    pub timestamp: Option<Duration>,
    pub frame_number: u64,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>, frame_number: u64) -> Result<Self, VideoError> {
        let expected = width as usize * height as usize * RGB_CHANNELS;
        if data.len() != expected {
            return Err(VideoError::InvalidBuffer {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
            timestamp: None,
            frame_number,
        })
    }

    pub fn from_rgb_image(image: RgbImage, frame_number: u64) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
            timestamp: None,
            frame_number,
        }
    }

    /// 根据帧率推算时间戳
    pub fn with_fps(mut self, fps: Option<f64>) -> Self {
        self.timestamp = fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .map(|fps| Duration::from_secs_f64(self.frame_number as f64 / fps));
        self
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let data = vec![255u8; 100 * 100 * 3];
        let frame = Frame::new(100, 100, data, 30).unwrap().with_fps(Some(30.0));

        assert_eq!(frame.width, 100);
        assert_eq!(frame.height, 100);
        assert_eq!(frame.pixel_count(), 10000);
        assert_eq!(frame.timestamp.unwrap().as_millis(), 1000);
        assert_eq!(frame.frame_number, 30);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_pixel_count_does_not_overflow_u32() {
        let frame = Frame {
            width: 70_000,
            height: 70_000,
            data: Vec::new(),
            timestamp: None,
            frame_number: 0,
        };
        assert_eq!(frame.pixel_count(), 4_900_000_000);
    }

    #[test]
    fn test_frame_rejects_short_buffer() {
        let result = Frame::new(10, 10, vec![0u8; 10], 0);
        assert!(matches!(
            result,
            Err(VideoError::InvalidBuffer {
                expected: 300,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_unknown_fps_has_no_timestamp() {
        let frame = Frame::new(2, 2, vec![0u8; 12], 7).unwrap().with_fps(None);
        assert!(frame.timestamp.is_none());

        let frame = frame.with_fps(Some(0.0));
        assert!(frame.timestamp.is_none());
    }
}
