//! Planned topology printout.

use auralis_core::DEFAULT_SEED;
use clap::Args;

use super::common::{SettingsArgs, attach_offline};

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    settings: SettingsArgs,
}

pub fn run(args: PlanArgs) -> anyhow::Result<()> {
    let settings = args.settings.resolve()?;
    let offline = attach_offline(settings, 48_000, DEFAULT_SEED)?;
    let Some(graph) = offline.session.graph() else {
        anyhow::bail!("session detached unexpectedly");
    };
    let rewire = &offline.report.rewire;

    match rewire.dimensional {
        Some(count) => println!(
            "Topology: {count} branches, reverb wet {:.3}",
            rewire.wet_level
        ),
        None => println!("Topology: direct (dimensional off)"),
    }
    if !offline.report.dynamics {
        println!("Dynamics stage unavailable");
    }
    for failure in &rewire.failed {
        println!("Branch {} skipped: {}", failure.index, failure.error);
    }
    println!();
    print!("{}", graph.plan());
    Ok(())
}
