//! Synthetic reverb impulse and wet level.
//!
//! The shared convolver is loaded with decaying stereo noise: sample `i` of
//! each channel is `noise · (1 − i/len)^decay`. Noise comes from a seeded
//! xorshift generator so an impulse is reproducible from its seed.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use libm::powf;

use crate::count::BranchCount;

/// Impulse length in seconds.
pub const DEFAULT_DURATION_SECS: f64 = 1.6;

/// Envelope exponent.
pub const DEFAULT_DECAY: f32 = 2.2;

/// Seed used when the caller does not pick one.
pub const DEFAULT_SEED: u32 = 0x2545_F491;

const WET_BASE: f32 = 0.04;
const WET_STEP: f32 = 0.035;
const WET_MAX: f32 = 0.36;

/// A stereo impulse response.
#[derive(Clone, Debug, PartialEq)]
pub struct ImpulseResponse {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// One buffer per channel, all the same length.
    pub channels: [Vec<f32>; 2],
}

impl ImpulseResponse {
    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// Returns `true` if the impulse has no frames.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.len() as f64 / f64::from(self.sample_rate)
    }

    /// Interleaved `L R L R ...` samples.
    pub fn interleaved(&self) -> impl Iterator<Item = f32> + '_ {
        let [left, right] = &self.channels;
        left.iter().zip(right).flat_map(|(&l, &r)| [l, r])
    }
}

struct Xorshift32(u32);

impl Xorshift32 {
    fn new(seed: u32) -> Self {
        // zero is a fixed point of xorshift
        Self(if seed == 0 { DEFAULT_SEED } else { seed })
    }

    /// Next sample in `[-1, 1]`.
    #[inline]
    fn next_bipolar(&mut self) -> f32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        ((x as i32 as f32) / (i32::MAX as f32)).clamp(-1.0, 1.0)
    }
}

/// Generates a stereo decaying-noise impulse.
///
/// Length is `floor(sample_rate · duration_secs)`. Both channels share one
/// generator, left first, so they are decorrelated.
///
/// # Example
///
/// ```rust
/// use auralis_core::{DEFAULT_DECAY, DEFAULT_DURATION_SECS, generate_impulse};
///
/// let ir = generate_impulse(48_000, DEFAULT_DURATION_SECS, DEFAULT_DECAY, 7);
/// assert_eq!(ir.len(), 76_800);
/// assert_eq!(ir, generate_impulse(48_000, DEFAULT_DURATION_SECS, DEFAULT_DECAY, 7));
/// ```
pub fn generate_impulse(sample_rate: u32, duration_secs: f64, decay: f32, seed: u32) -> ImpulseResponse {
    let len = if duration_secs.is_finite() && duration_secs > 0.0 {
        (f64::from(sample_rate) * duration_secs) as usize
    } else {
        0
    };

    let mut rng = Xorshift32::new(seed);
    let mut channel = || -> Vec<f32> {
        (0..len)
            .map(|i| {
                let envelope = powf(1.0 - i as f32 / len as f32, decay);
                rng.next_bipolar() * envelope
            })
            .collect()
    };
    let left = channel();
    let right = channel();

    #[cfg(feature = "tracing")]
    tracing::debug!(sample_rate, len, decay, seed, "generated reverb impulse");

    ImpulseResponse {
        sample_rate,
        channels: [left, right],
    }
}

/// Reverb wet level for a dimensional set of `count` branches.
///
/// `min(0.36, 0.04 + (count − 2) · 0.035)`: 0.04 at two branches, capped from
/// eleven branches up.
pub fn wet_level(count: BranchCount) -> f32 {
    let extra = (count.get() - usize::from(BranchCount::MIN)) as f32;
    (WET_BASE + extra * WET_STEP).min(WET_MAX)
}
