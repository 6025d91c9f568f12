//! Engine construction settings.

use auralis_core::{DEFAULT_DECAY, DEFAULT_DURATION_SECS, DEFAULT_SEED};

/// Analyser FFT size.
pub const ANALYSER_FFT_SIZE: u32 = 256;

/// Reverb impulse generation settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReverbConfig {
    /// Impulse length in seconds.
    pub duration_secs: f64,
    /// Envelope exponent.
    pub decay: f32,
    /// Noise seed.
    pub seed: u32,
}

impl Default for ReverbConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
            decay: DEFAULT_DECAY,
            seed: DEFAULT_SEED,
        }
    }
}

/// Settings fixed for the lifetime of a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    /// Reverb impulse settings.
    pub reverb: ReverbConfig,
    /// Analyser FFT size.
    pub analyser_fft_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reverb: ReverbConfig::default(),
            analyser_fft_size: ANALYSER_FFT_SIZE,
        }
    }
}

impl EngineConfig {
    /// Sets the reverb noise seed.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.reverb.seed = seed;
        self
    }
}
