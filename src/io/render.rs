use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, info};
use std::path::Path;

use crate::engine::params::{CUTOFF_HZ, ParamStore, Params, format_frequency};
use crate::engine::{BlockProcessor, CHANNELS};

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Frames per engine call.
    pub block_size: usize,
    /// Step the cutoff once per block from its starting value to this one.
    pub sweep_to_hz: Option<f32>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            block_size: 128,
            sweep_to_hz: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReport {
    pub frames: usize,
    pub blocks: usize,
    pub sample_rate: u32,
    pub coefficient_updates: u64,
}

/// Planar stereo audio read from disk.
pub struct StereoBuffer {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
    pub sample_rate: u32,
}

/// Read a WAV file as planar stereo. Mono is copied to both sides, channels
/// past the second are dropped.
pub fn read_stereo(path: &Path) -> Result<StereoBuffer> {
    let mut reader = WavReader::open(path)
        .with_context(|| format!("failed to open WAV file '{}'", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .context("failed to decode float samples")?,
        SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .context("failed to decode integer samples")?
        }
    };

    let frames = samples.len() / channels.max(1);
    let mut left = Vec::with_capacity(frames);
    let mut right = Vec::with_capacity(frames);
    for frame in samples.chunks_exact(channels.max(1)) {
        left.push(frame[0]);
        right.push(if channels > 1 { frame[1] } else { frame[0] });
    }

    debug!(
        "Read {} frames, {} channel(s) at {} Hz from {}",
        frames,
        channels,
        spec.sample_rate,
        path.display()
    );

    Ok(StereoBuffer {
        left,
        right,
        sample_rate: spec.sample_rate,
    })
}

/// Stream `input` through a fresh engine block by block and write the result
/// as 16-bit stereo to `output`.
pub fn render_file(
    input: &Path,
    output: &Path,
    params: Params,
    options: &RenderOptions,
) -> Result<RenderReport> {
    let source = read_stereo(input)?;
    let block_size = options.block_size.max(1);

    let mut engine = BlockProcessor::new().context("failed to create engine")?;
    engine
        .prepare(source.sample_rate as f32, block_size as u32)
        .context("failed to prepare engine")?;

    let spec = WavSpec {
        channels: CHANNELS as u16,
        sample_rate: source.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(output, spec)
        .with_context(|| format!("failed to create WAV file '{}'", output.display()))?;

    let (store, reader) = ParamStore::new(params);
    let frames = source.left.len();
    let blocks = frames.div_ceil(block_size);
    let sweep = options
        .sweep_to_hz
        .map(|to| (params.cutoff_hz, to.clamp(*CUTOFF_HZ.start(), *CUTOFF_HZ.end())));

    if let Some((from, to)) = sweep {
        info!(
            "Sweeping cutoff {} -> {} over {blocks} blocks",
            format_frequency(from),
            format_frequency(to)
        );
    }

    let mut out_left = vec![0.0f32; block_size];
    let mut out_right = vec![0.0f32; block_size];

    for (index, start) in (0..frames).step_by(block_size).enumerate() {
        if let Some((from, to)) = sweep {
            let position = if blocks > 1 {
                index as f32 / (blocks - 1) as f32
            } else {
                1.0
            };
            store.update(|p| p.cutoff_hz = (to - from).mul_add(position, from));
        }

        let end = (start + block_size).min(frames);
        let len = end - start;
        let snapshot = reader.snapshot();

        engine.process(
            &snapshot,
            &[&source.left[start..end], &source.right[start..end]],
            &mut [&mut out_left[..len], &mut out_right[..len]],
        )?;

        for (&l, &r) in out_left[..len].iter().zip(&out_right[..len]) {
            writer.write_sample(quantize(l))?;
            writer.write_sample(quantize(r))?;
        }
    }

    writer.finalize().context("failed to finalize WAV file")?;
    info!("Render saved: {}", output.display());

    Ok(RenderReport {
        frames,
        blocks,
        sample_rate: source.sample_rate,
        coefficient_updates: engine.coefficient_updates(),
    })
}

fn quantize(sample: f32) -> i16 {
    (sample * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::shaper::Mode;
    use std::path::PathBuf;

    fn write_sine(dir: &Path, channels: u16, frames: usize) -> PathBuf {
        let path = dir.join(format!("sine_{channels}ch.wav"));
        let spec = WavSpec {
            channels,
            sample_rate: 48_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for i in 0..frames {
            let t = i as f32 / 48_000.0;
            let s = (2.0 * std::f32::consts::PI * 220.0 * t).sin() * 0.5;
            for _ in 0..channels {
                writer.write_sample(quantize(s)).unwrap();
            }
        }
        writer.finalize().unwrap();
        path
    }

    #[test]
    fn mono_input_is_read_as_identical_sides() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sine(dir.path(), 1, 300);

        let buffer = read_stereo(&path).unwrap();
        assert_eq!(buffer.left.len(), 300);
        assert_eq!(buffer.left, buffer.right);
        assert_eq!(buffer.sample_rate, 48_000);
    }

    #[test]
    fn render_keeps_length_and_writes_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_sine(dir.path(), 2, 1000);
        let output = dir.path().join("out.wav");

        let params = Params {
            input_gain_db: 12.0,
            shaping: Mode::Tanh.into(),
            cutoff_hz: 4_000.0,
            ..Params::default()
        };
        let report = render_file(&input, &output, params, &RenderOptions::default()).unwrap();

        assert_eq!(report.frames, 1000);
        assert_eq!(report.blocks, 8);

        let rendered = WavReader::open(&output).unwrap();
        assert_eq!(rendered.spec().channels, 2);
        assert_eq!(rendered.duration(), 1000);
    }

    #[test]
    fn sweep_recomputes_once_per_changed_block() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_sine(dir.path(), 1, 640);
        let output = dir.path().join("swept.wav");

        let options = RenderOptions {
            block_size: 64,
            sweep_to_hz: Some(500.0),
        };
        let params = Params {
            cutoff_hz: 5_000.0,
            ..Params::default()
        };
        let report = render_file(&input, &output, params, &options).unwrap();

        // One rebuild from prepare, then one per block since every block
        // lands on a new cutoff.
        assert_eq!(report.blocks, 10);
        assert_eq!(report.coefficient_updates, 1 + 10);
    }

    #[test]
    fn missing_input_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_file(
            &dir.path().join("nope.wav"),
            &dir.path().join("out.wav"),
            Params::default(),
            &RenderOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("nope.wav"));
    }
}
