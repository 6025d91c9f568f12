//! Reverb impulse export.

use std::path::PathBuf;

use anyhow::Context;
use auralis_core::{DEFAULT_DECAY, DEFAULT_DURATION_SECS, DEFAULT_SEED, generate_impulse};
use auralis_io::write_impulse_wav;
use clap::Args;

#[derive(Args)]
pub struct ImpulseArgs {
    /// Output WAV file
    #[arg(short, long, value_name = "FILE")]
    out: PathBuf,

    /// Sample rate in Hz
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Noise seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u32,

    /// Impulse length in seconds
    #[arg(long, default_value_t = DEFAULT_DURATION_SECS)]
    duration: f64,

    /// Envelope exponent
    #[arg(long, default_value_t = DEFAULT_DECAY)]
    decay: f32,
}

pub fn run(args: ImpulseArgs) -> anyhow::Result<()> {
    if args.sample_rate == 0 {
        anyhow::bail!("--sample-rate must be positive");
    }
    let impulse = generate_impulse(args.sample_rate, args.duration, args.decay, args.seed);
    if impulse.is_empty() {
        anyhow::bail!("impulse is empty; check --duration");
    }
    write_impulse_wav(&args.out, &impulse)
        .with_context(|| format!("writing {}", args.out.display()))?;

    println!("Wrote {}", args.out.display());
    println!(
        "  {} Hz, 2 channels, {} frames ({:.3}s), decay {}, seed {:#010x}",
        impulse.sample_rate,
        impulse.len(),
        impulse.duration_secs(),
        args.decay,
        args.seed
    );
    Ok(())
}
