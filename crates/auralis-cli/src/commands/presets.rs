//! Factory preset listing.

use auralis_config::{ProcessingPreset, factory_presets};
use clap::Args;

#[derive(Args)]
pub struct PresetsArgs {
    /// Print presets as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    let presets = factory_presets();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&presets)?);
        return Ok(());
    }

    println!("Factory Presets:");
    println!("================");
    println!(
        "  {:8}  {:>6} {:>6} {:>6}  {:>7}  {:>10}  {}",
        "Name", "Bass", "Mids", "Treble", "Gain", "Dynamics", "Description"
    );
    for preset in &presets {
        println!(
            "  {:8}  {:>6.1} {:>6.1} {:>6.1}  {:>+5.1}dB  {:>10}  {}",
            preset.name,
            preset.eq.bass,
            preset.eq.mids,
            preset.eq.treble,
            preset.gain_db,
            dynamics(preset),
            preset.description.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn dynamics(preset: &ProcessingPreset) -> String {
    preset
        .compressor
        .as_ref()
        .map_or_else(|| "native".to_string(), |c| format!("{:.1}:1", c.ratio))
}
