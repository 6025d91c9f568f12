//! Offline session simulation.

use auralis_core::{DEFAULT_SEED, ParamKey};
use auralis_engine::{BindingMode, StepOutcome};
use clap::Args;
use serde::Serialize;

use super::common::{SettingsArgs, attach_offline};

#[derive(Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    settings: SettingsArgs,

    /// Number of animation frames to deliver
    #[arg(long, default_value = "60")]
    frames: usize,

    /// Frame rate of the simulated host
    #[arg(long, default_value = "60.0")]
    fps: f64,

    /// Context sample rate in Hz
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Reverb noise seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u32,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Summary {
    binding: &'static str,
    dynamics: bool,
    branches: usize,
    skipped: usize,
    wet_level: f32,
    frames: usize,
    elapsed_secs: f64,
    live_nodes: usize,
    live_edges: usize,
    param_events: usize,
    positions: Vec<BranchPosition>,
}

#[derive(Serialize)]
struct BranchPosition {
    index: usize,
    angle_bass: f64,
    angle_voice: f64,
    x: f32,
    z: f32,
    pan: f32,
}

pub fn run(args: SimulateArgs) -> anyhow::Result<()> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        anyhow::bail!("--fps must be positive, got {}", args.fps);
    }
    let settings = args.settings.resolve()?;
    let mut offline = attach_offline(settings, args.sample_rate, args.seed)?;
    let probe = &offline.probe;

    let dt = 1.0 / args.fps;
    let mut stepped = 0;
    for _ in 0..args.frames {
        probe.advance_time(dt);
        let Some(frame) = probe.deliver_next_frame() else {
            break;
        };
        if let Some(StepOutcome::Stepped { .. }) = offline.session.on_frame(frame) {
            stepped += 1;
        }
    }
    tracing::debug!(stepped, "simulation finished");

    let Some(graph) = offline.session.graph() else {
        anyhow::bail!("session detached unexpectedly");
    };
    let elapsed = graph
        .spatial()
        .animator()
        .origin()
        .map_or(0.0, |origin| probe.current_time() - origin);
    let positions = graph
        .spatial()
        .branches()
        .iter()
        .map(|branch| {
            let orbit = branch.layout.frame_at(elapsed);
            let value = |node, param| probe.param_value(node, param).unwrap_or(0.0);
            BranchPosition {
                index: branch.layout.index,
                angle_bass: orbit.angle_bass,
                angle_voice: orbit.angle_voice,
                x: value(branch.bass_panner, ParamKey::PositionX),
                z: value(branch.bass_panner, ParamKey::PositionZ),
                pan: value(branch.voice_panner, ParamKey::Pan),
            }
        })
        .collect();

    let report = &offline.report;
    let summary = Summary {
        binding: match report.binding {
            BindingMode::Element => "element",
            BindingMode::CaptureStream => "capture_stream",
        },
        dynamics: report.dynamics,
        branches: report.rewire.branches_built,
        skipped: report.rewire.failed.len(),
        wet_level: report.rewire.wet_level,
        frames: stepped,
        elapsed_secs: elapsed,
        live_nodes: probe.live_node_count(),
        live_edges: probe.live_edges().len(),
        param_events: probe.param_events().len(),
        positions,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    offline.session.detach();
    Ok(())
}

fn print_summary(s: &Summary) {
    println!("Binding:      {}", s.binding);
    println!("Dynamics:     {}", if s.dynamics { "yes" } else { "no" });
    println!("Branches:     {} ({} skipped)", s.branches, s.skipped);
    println!("Reverb wet:   {:.3}", s.wet_level);
    println!("Frames:       {} over {:.3}s", s.frames, s.elapsed_secs);
    println!("Live nodes:   {}", s.live_nodes);
    println!("Live edges:   {}", s.live_edges);
    println!("Param writes: {}", s.param_events);

    if s.positions.is_empty() {
        return;
    }
    println!();
    println!(
        "  {:>5}  {:>10}  {:>10}  {:>8}  {:>8}  {:>7}",
        "Index", "Bass rad", "Voice rad", "X", "Z", "Pan"
    );
    for p in &s.positions {
        println!(
            "  {:>5}  {:>10.4}  {:>10.4}  {:>8.4}  {:>8.4}  {:>7.4}",
            p.index, p.angle_bass, p.angle_voice, p.x, p.z, p.pan
        );
    }
}
