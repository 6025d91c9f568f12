//! WAV export of reverb impulses.

use std::path::Path;

use auralis_core::ImpulseResponse;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::Result;

/// Write an impulse as a 32-bit float stereo WAV file.
pub fn write_impulse_wav<P: AsRef<Path>>(path: P, impulse: &ImpulseResponse) -> Result<()> {
    let spec = WavSpec {
        channels: 2,
        sample_rate: impulse.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for sample in impulse.interleaved() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Read a stereo impulse back from a WAV file.
///
/// Mono files are duplicated into both channels; integer files are scaled
/// into `[-1, 1]`.
pub fn read_impulse_wav<P: AsRef<Path>>(path: P) -> Result<ImpulseResponse> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let max_val = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    let left: Vec<f32> = samples.iter().step_by(channels).copied().collect();
    let right: Vec<f32> = if channels == 1 {
        left.clone()
    } else {
        samples.iter().skip(1).step_by(channels).copied().collect()
    };

    Ok(ImpulseResponse {
        sample_rate: spec.sample_rate,
        channels: [left, right],
    })
}
