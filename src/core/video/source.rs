//! 帧来源：ffmpeg 解码的视频、图片目录、内存帧
//!
//! 所有来源都是按序、有限的迭代器；资源在 Drop 时释放。

use super::error::VideoError;
use super::frame::Frame;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

const RGB_CHANNELS: usize = 3;
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// 视频元数据，任何字段都可能未知
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VideoMetadata {
    pub fps: Option<f64>,
    pub frame_count: Option<u64>,
    pub duration_secs: Option<f64>,
    pub width: u32,
    pub height: u32,
}

impl VideoMetadata {
    /// 优先使用容器时长，否则用 帧数 / 帧率 推算
    pub fn duration(&self) -> Option<f64> {
        if let Some(duration) = self.duration_secs.filter(|d| d.is_finite() && *d >= 0.0) {
            return Some(duration);
        }

        match (self.frame_count, self.fps) {
            (Some(count), Some(fps)) if fps > 0.0 => Some(count as f64 / fps),
            _ => None,
        }
    }
}

pub trait FrameSource: Iterator<Item = Result<Frame, VideoError>> {
    fn metadata(&self) -> &VideoMetadata;
}

/// ffmpeg / ffprobe 命令行参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegOptions {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// 解码时缩放到指定尺寸，降低检测开销
    pub scale: Option<(u32, u32)>,
}

impl Default for FfmpegOptions {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            scale: Some((320, 240)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// "30000/1001" -> 29.97，"0/0" -> None
fn parse_rate(rate: &str) -> Option<f64> {
    let (num, den) = match rate.split_once('/') {
        Some((num, den)) => (num.trim().parse::<f64>().ok()?, den.trim().parse::<f64>().ok()?),
        None => (rate.trim().parse::<f64>().ok()?, 1.0),
    };

    if den <= 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}

fn parse_probe_output(json: &str) -> Result<VideoMetadata, VideoError> {
    let probe: ProbeOutput =
        serde_json::from_str(json).map_err(|e| VideoError::Probe(format!("invalid ffprobe output: {}", e)))?;

    let stream = probe
        .streams
        .into_iter()
        .find(|s| s.width.is_some() && s.height.is_some())
        .ok_or_else(|| VideoError::Probe("no video stream".to_string()))?;

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_rate));
    let frame_count = stream.nb_frames.as_deref().and_then(|n| n.parse::<u64>().ok());
    let duration_secs = stream
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .or_else(|| {
            probe
                .format
                .and_then(|f| f.duration)
                .and_then(|d| d.parse::<f64>().ok())
        });

    Ok(VideoMetadata {
        fps,
        frame_count,
        duration_secs,
        width: stream.width.unwrap_or(0),
        height: stream.height.unwrap_or(0),
    })
}

/// 通过 ffmpeg 子进程解码为 rgb24 原始帧
pub struct FfmpegFrameSource {
    child: Child,
    stdout: ChildStdout,
    metadata: VideoMetadata,
    frame_width: u32,
    frame_height: u32,
    frame_index: u64,
    finished: bool,
}

impl FfmpegFrameSource {
    pub fn open(path: &Path, options: &FfmpegOptions) -> Result<Self, VideoError> {
        if !path.exists() {
            return Err(VideoError::Open(format!("file not found: {}", path.display())));
        }

        let metadata = Self::probe(path, options)?;
        info!(
            "🎥 Video probed: {}x{}, fps {:?}, frames {:?}, duration {:?}s",
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.frame_count,
            metadata.duration()
        );

        let (frame_width, frame_height) = options.scale.unwrap_or((metadata.width, metadata.height));
        if frame_width == 0 || frame_height == 0 {
            return Err(VideoError::Probe("video has zero dimensions".to_string()));
        }

        let mut command = Command::new(&options.ffmpeg_path);
        command.args(["-v", "error", "-nostdin", "-i"]).arg(path);
        if let Some((w, h)) = options.scale {
            command.arg("-vf").arg(format!("scale={}:{}", w, h));
        }
        command
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let mut child = command
            .spawn()
            .map_err(|e| VideoError::Open(format!("failed to spawn {}: {}", options.ffmpeg_path, e)))?;
        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(VideoError::Open("ffmpeg stdout unavailable".to_string()));
            }
        };

        Ok(Self {
            child,
            stdout,
            metadata,
            frame_width,
            frame_height,
            frame_index: 0,
            finished: false,
        })
    }

    fn probe(path: &Path, options: &FfmpegOptions) -> Result<VideoMetadata, VideoError> {
        let output = Command::new(&options.ffprobe_path)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height,avg_frame_rate,r_frame_rate,nb_frames,duration:format=duration",
                "-print_format",
                "json",
            ])
            .arg(path)
            .output()
            .map_err(|e| VideoError::Open(format!("failed to spawn {}: {}", options.ffprobe_path, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("❌ ffprobe failed: {}", stderr.trim());
            return Err(VideoError::Open(stderr.trim().to_string()));
        }

        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }

    /// 读满一帧；返回实际读取字节数（0 表示流结束）
    fn read_frame_bytes(&mut self, buffer: &mut [u8]) -> std::io::Result<usize> {
        let mut filled = 0;
        while filled < buffer.len() {
            match self.stdout.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    fn finish(&mut self) -> Option<VideoError> {
        self.finished = true;
        match self.child.wait() {
            Ok(status) if !status.success() => {
                error!("❌ ffmpeg exited with {} after {} frames", status, self.frame_index);
                Some(VideoError::Decode(format!(
                    "ffmpeg exited with {} after {} frames",
                    status, self.frame_index
                )))
            }
            Ok(_) => None,
            Err(e) => Some(VideoError::Io(e)),
        }
    }
}

impl Iterator for FfmpegFrameSource {
    type Item = Result<Frame, VideoError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let frame_size = self.frame_width as usize * self.frame_height as usize * RGB_CHANNELS;
        let mut buffer = vec![0u8; frame_size];

        match self.read_frame_bytes(&mut buffer) {
            Ok(0) => {
                debug!("📭 ffmpeg stream exhausted after {} frames", self.frame_index);
                self.finish().map(Err)
            }
            Ok(n) if n < frame_size => {
                warn!("⚠️ Truncated frame {} ({} of {} bytes)", self.frame_index, n, frame_size);
                self.finished = true;
                Some(Err(VideoError::Decode(format!(
                    "truncated frame {}: {} of {} bytes",
                    self.frame_index, n, frame_size
                ))))
            }
            Ok(_) => {
                let frame = Frame {
                    width: self.frame_width,
                    height: self.frame_height,
                    data: buffer,
                    timestamp: None,
                    frame_number: self.frame_index,
                }
                .with_fps(self.metadata.fps);
                self.frame_index += 1;
                Some(Ok(frame))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(VideoError::Io(e)))
            }
        }
    }
}

impl FrameSource for FfmpegFrameSource {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
        debug!("🗑️ FfmpegFrameSource: released after {} frames", self.frame_index);
    }
}

/// 图片目录来源（按文件名排序）
pub struct ImageDirSource {
    paths: std::vec::IntoIter<PathBuf>,
    metadata: VideoMetadata,
    frame_index: u64,
}

impl ImageDirSource {
    pub fn open(dir: &Path, fps: Option<f64>) -> Result<Self, VideoError> {
        if !dir.is_dir() {
            return Err(VideoError::Open(format!("not a directory: {}", dir.display())));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        info!("🖼️ ImageDirSource: {} images in {:?}", paths.len(), dir);

        let frame_count = paths.len() as u64;
        Ok(Self {
            paths: paths.into_iter(),
            metadata: VideoMetadata {
                fps,
                frame_count: Some(frame_count),
                ..Default::default()
            },
            frame_index: 0,
        })
    }
}

impl Iterator for ImageDirSource {
    type Item = Result<Frame, VideoError>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.paths.next()?;
        let index = self.frame_index;
        self.frame_index += 1;

        let result = image::open(&path)
            .map(|img| Frame::from_rgb_image(img.to_rgb8(), index).with_fps(self.metadata.fps))
            .map_err(VideoError::from);
        Some(result)
    }
}

impl FrameSource for ImageDirSource {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }
}

/// 内存帧来源
pub struct MemoryFrameSource {
    frames: std::vec::IntoIter<Frame>,
    metadata: VideoMetadata,
}

impl MemoryFrameSource {
    pub fn new(frames: Vec<Frame>, fps: Option<f64>) -> Self {
        let (width, height) = frames.first().map(|f| (f.width, f.height)).unwrap_or((0, 0));
        let metadata = VideoMetadata {
            fps,
            frame_count: Some(frames.len() as u64),
            duration_secs: None,
            width,
            height,
        };
        Self {
            frames: frames.into_iter(),
            metadata,
        }
    }
}

impl Iterator for MemoryFrameSource {
    type Item = Result<Frame, VideoError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.frames.next().map(Ok)
    }
}

impl FrameSource for MemoryFrameSource {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }
}
