//! Settings reconciliation.
//!
//! Every settings change is split into two kinds of work:
//!
//! - **parameter updates** (EQ, quality cutoff, dynamics, master gain) are
//!   cheap and always emitted;
//! - a **topology action** rebuilds the graph, and only happens when the
//!   dimensional switch or branch count changed.
//!
//! EQ always comes from the snapshot's band gains. Selecting a preset writes
//! its triple into those gains ([`Settings::select_preset`]), so a snapshot
//! yields the same EQ whether it arrives through attach or apply.
//!
//! [`reconcile`] is pure so the decision can be tested without a context.

use auralis_config::{EqGains, Settings};
use auralis_core::{BranchCount, CompressorParams};

/// Parameter values to write into the chain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamUpdates {
    /// EQ band gains in dB.
    pub eq: EqGains,
    /// Quality low-pass cutoff in Hz.
    pub quality_cutoff_hz: f32,
    /// Dynamics stage settings.
    pub compressor: CompressorParams,
    /// Master gain, linear.
    pub master_gain: f32,
}

/// What to do with the graph topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopologyAction {
    /// Leave branches and connections as they are.
    Keep,
    /// Rebuild with the given branch count, or without branches.
    Rewire(Option<BranchCount>),
}

/// Outcome of comparing two snapshots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reconciliation {
    /// Values for the chain.
    pub params: ParamUpdates,
    /// Topology decision.
    pub topology: TopologyAction,
}

/// Decides how to move from `previous` to `new`.
///
/// Without a previous snapshot the topology is always rebuilt. The preset
/// contributes dynamics and master gain; unknown names behave like `off`.
///
/// # Example
///
/// ```rust
/// use auralis_config::Settings;
/// use auralis_engine::{TopologyAction, reconcile};
///
/// let before = Settings::default();
/// let mut after = before.clone();
/// after.bass = 6.0;
///
/// let r = reconcile(Some(&before), &after);
/// assert_eq!(r.topology, TopologyAction::Keep);
/// assert_eq!(r.params.eq.bass, 6.0);
/// ```
pub fn reconcile(previous: Option<&Settings>, new: &Settings) -> Reconciliation {
    let preset = new.preset();
    let params = ParamUpdates {
        eq: new.eq(),
        quality_cutoff_hz: new.quality_cutoff_hz(),
        compressor: preset.compressor_params(),
        master_gain: preset.master_gain(),
    };

    let target = new.dimensional();
    let topology = match previous {
        Some(p) if p.dimensional() == target => TopologyAction::Keep,
        _ => TopologyAction::Rewire(target),
    };

    Reconciliation { params, topology }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auralis_config::QualityPreset;

    fn dim(n: i64) -> Settings {
        Settings {
            dimensional_audio_on: true,
            dimensional_preset: BranchCount::new(n),
            ..Settings::default()
        }
    }

    #[test]
    fn first_snapshot_always_rewires() {
        let r = reconcile(None, &Settings::default());
        assert_eq!(r.topology, TopologyAction::Rewire(None));
        let r = reconcile(None, &dim(5));
        assert_eq!(r.topology, TopologyAction::Rewire(Some(BranchCount::new(5))));
    }

    #[test]
    fn eq_only_change_keeps_topology() {
        let before = dim(4);
        let after = Settings {
            treble: -3.0,
            audio_quality_on: true,
            audio_quality_preset: QualityPreset::P240,
            ..before.clone()
        };
        let r = reconcile(Some(&before), &after);
        assert_eq!(r.topology, TopologyAction::Keep);
        assert_eq!(r.params.eq.treble, -3.0);
        assert_eq!(r.params.quality_cutoff_hz, 5_000.0);
    }

    #[test]
    fn count_change_rewires() {
        let r = reconcile(Some(&dim(4)), &dim(8));
        assert_eq!(r.topology, TopologyAction::Rewire(Some(BranchCount::new(8))));
    }

    #[test]
    fn disabling_rewires_without_branches() {
        let before = dim(4);
        let after = Settings {
            dimensional_audio_on: false,
            ..before.clone()
        };
        let r = reconcile(Some(&before), &after);
        assert_eq!(r.topology, TopologyAction::Rewire(None));
    }

    #[test]
    fn count_change_while_off_keeps_topology() {
        let before = Settings::default();
        let after = Settings {
            dimensional_preset: BranchCount::new(9),
            ..Settings::default()
        };
        assert_eq!(reconcile(Some(&before), &after).topology, TopologyAction::Keep);
    }

    #[test]
    fn selected_movie_preset_gives_its_eq_and_gain() {
        let before = Settings::default();
        let mut after = before.clone();
        after.select_preset("movie").unwrap();
        let r = reconcile(Some(&before), &after);
        assert_eq!(r.params.eq, EqGains::new(4.0, 0.0, -1.0));
        assert!((r.params.master_gain - 1.1885).abs() < 1e-3);
        assert_eq!(r.params.compressor.ratio, 2.0);
    }

    #[test]
    fn unchanged_preset_respects_manual_eq() {
        let before = Settings {
            preset_mode: "rock".into(),
            ..Settings::default()
        };
        let after = Settings {
            bass: -2.0,
            ..before.clone()
        };
        let r = reconcile(Some(&before), &after);
        assert_eq!(r.params.eq.bass, -2.0);
        assert_eq!(r.params.compressor.threshold, -16.0);
    }

    #[test]
    fn off_restores_native_dynamics() {
        let before = Settings {
            preset_mode: "game".into(),
            bass: 1.0,
            ..Settings::default()
        };
        let after = Settings {
            preset_mode: "off".into(),
            ..before.clone()
        };
        let r = reconcile(Some(&before), &after);
        assert_eq!(r.params.eq.bass, 1.0);
        assert_eq!(r.params.compressor, CompressorParams::NATIVE_DEFAULT);
        assert_eq!(r.params.master_gain, 1.0);
    }

    #[test]
    fn eq_does_not_depend_on_the_previous_snapshot() {
        let snapshot = Settings {
            preset_mode: "movie".into(),
            bass: 1.0,
            ..Settings::default()
        };
        let fresh = reconcile(None, &snapshot);
        let changed = reconcile(Some(&Settings::default()), &snapshot);
        assert_eq!(fresh.params, changed.params);
        assert_eq!(fresh.params.eq.bass, 1.0);
    }

    #[test]
    fn unknown_preset_behaves_like_off() {
        let after = Settings {
            preset_mode: "disco".into(),
            ..Settings::default()
        };
        let r = reconcile(Some(&Settings::default()), &after);
        assert_eq!(r.params.compressor, CompressorParams::NATIVE_DEFAULT);
    }
}
