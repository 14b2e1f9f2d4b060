use super::error::AudioError;
use log::{error, info};
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType};
use std::path::Path;

pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// 读取 WAV 并转换为 16 kHz 单声道 f32，多声道取平均
pub fn load_wav_mono_f32(path: &Path) -> Result<Vec<f32>, AudioError> {
    info!("📖 Reading WAV file: {:?}", path);
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    info!(
        "📊 WAV spec: {} Hz, {} channels, {} bits",
        spec.sample_rate, spec.channels, spec.bits_per_sample
    );

    if spec.sample_rate == 0 {
        return Err(AudioError::Wav(hound::Error::FormatError(
            "invalid sample rate",
        )));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let samples = downmix(&interleaved, channels);
    info!("✓ Loaded {} mono samples from file", samples.len());

    resample_to_16k_mono(&samples, spec.sample_rate)
}

/// 不完整的最后一帧直接丢弃
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

pub fn resample_to_16k_mono(input: &[f32], in_rate: u32) -> Result<Vec<f32>, AudioError> {
    if in_rate == TARGET_SAMPLE_RATE || input.is_empty() {
        return Ok(input.to_vec());
    }

    if in_rate % TARGET_SAMPLE_RATE == 0 {
        let factor = (in_rate / TARGET_SAMPLE_RATE) as usize;
        info!(
            "⚡ Fast downsample from {} Hz to 16 kHz (factor {})",
            in_rate, factor
        );
        return Ok(downsample_by_factor(input, factor));
    }

    info!(
        "🔧 Resampling {} samples from {} Hz to 16 kHz",
        input.len(),
        in_rate
    );
    let ratio = TARGET_SAMPLE_RATE as f64 / in_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 48,
        f_cutoff: 0.90,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 4,
        window: rubato::WindowFunction::BlackmanHarris2,
    };

    let mut resampler =
        SincFixedIn::<f32>::new(ratio, 1.0, params, input.len(), 1).map_err(|e| {
            error!("❌ Resample creation failed: {}", e);
            AudioError::Resample(e.to_string())
        })?;

    let mut output = vec![vec![0.0f32; resampler.output_frames_max()]];
    let (_, produced) = resampler
        .process_into_buffer(&[input], &mut output, None)
        .map_err(|e| {
            error!("❌ Resample processing failed: {}", e);
            AudioError::Resample(e.to_string())
        })?;

    let mut result = output.into_iter().next().unwrap_or_default();
    result.truncate(produced);
    info!(
        "✓ Resampling complete: {} -> {} samples",
        input.len(),
        result.len()
    );
    Ok(result)
}

/// 整数倍降采样：相邻样本取平均
fn downsample_by_factor(input: &[f32], factor: usize) -> Vec<f32> {
    let factor = factor.max(1);
    input
        .chunks(factor)
        .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
        .collect()
}

/// 秒数格式化为 HH:MM:SS:cc（cc 为百分之一秒）
pub fn format_timestamp(seconds: f32) -> String {
    let seconds = seconds.max(0.0);
    let hours = (seconds / 3600.0) as u32;
    let minutes = ((seconds % 3600.0) / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    let centis = ((seconds % 1.0) * 100.0) as u32;
    format!("{:02}:{:02}:{:02}:{:02}", hours, minutes, secs, centis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for s in samples {
            writer.write_sample(*s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_load_mono_16k() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        write_test_wav(&path, 16_000, 1, &[0, 16384, -16384, 0]);

        let samples = load_wav_mono_f32(&path).unwrap();
        assert_eq!(samples.len(), 4);
        assert!((samples[1] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_load_stereo_downmix_and_fast_downsample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        // 32 kHz 双声道，8 帧 -> 单声道 8 样本 -> 16 kHz 4 样本
        let frames: Vec<i16> = (0..8).flat_map(|_| [16384i16, 0]).collect();
        write_test_wav(&path, 32_000, 2, &frames);

        let samples = load_wav_mono_f32(&path).unwrap();
        assert_eq!(samples.len(), 4);
        assert!(samples.iter().all(|s| (s - 0.25).abs() < 1e-3));
    }

    #[test]
    fn test_sinc_resample_length() {
        let input: Vec<f32> = (0..44_100).map(|i| (i as f32 * 0.01).sin()).collect();
        let output = resample_to_16k_mono(&input, 44_100).unwrap();
        // sinc 插值有半个窗口的延迟，输出长度只保证接近 16000
        assert!(output.len().abs_diff(16_000) <= 200, "got {}", output.len());
    }

    #[test]
    fn test_downsample_partial_tail() {
        assert_eq!(downsample_by_factor(&[1.0, 1.0, 1.0, 3.0, 3.0], 3), vec![1.0, 3.0]);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00:00:00");
        assert_eq!(format_timestamp(3725.5), "01:02:05:50");
    }
}
