//! Session scenarios against the offline platform.

use auralis_config::{AttachStatus, MemoryStore, QualityPreset, Settings};
use auralis_core::{BranchCount, NodeTag, ParamKey};
use auralis_engine::{BindingMode, ChainSlot, EngineError, Session, StepOutcome};
use auralis_io::{ContextState, Fault, FrameId, MediaElement, OfflinePlatform, OfflineProbe, SourceMode};

/// Chain nodes plus the destination.
const CHAIN_NODES: usize = 11;

fn dimensional(n: i64) -> Settings {
    Settings {
        dimensional_audio_on: true,
        dimensional_preset: BranchCount::new(n),
        ..Settings::default()
    }
}

fn session(settings: Settings) -> (Session<OfflinePlatform, MemoryStore>, OfflineProbe) {
    session_on(OfflinePlatform::new(), settings)
}

fn session_on(
    platform: OfflinePlatform,
    settings: Settings,
) -> (Session<OfflinePlatform, MemoryStore>, OfflineProbe) {
    let probe = platform.probe();
    (Session::new(platform, MemoryStore::new(settings)), probe)
}

fn video() -> MediaElement {
    MediaElement::new(7, "video#main")
}

fn chain_param(
    session: &Session<OfflinePlatform, MemoryStore>,
    probe: &OfflineProbe,
    slot: ChainSlot,
    param: ParamKey,
) -> f32 {
    let graph = session.graph().expect("attached");
    let handle = graph.chain().handle(slot).expect("slot present");
    probe.param_value(handle, param).expect("param recorded")
}

#[test]
fn default_settings_attach_a_direct_chain() {
    let (mut session, probe) = session(Settings::default());

    let report = session.attach(&video()).unwrap();

    assert_eq!(report.binding, BindingMode::Element);
    assert!(report.dynamics);
    assert_eq!(report.rewire.branches_built, 0);
    assert!(!report.animating);
    assert_eq!(probe.live_node_count(), CHAIN_NODES);
    assert_eq!(probe.source_mode(), Some(SourceMode::Element));
    assert!(probe.pending_frames().is_empty());
    assert_eq!(session.store().status_history(), &[AttachStatus::Attached]);
    assert_eq!(
        session.store().settings().audio_tool_attach_status,
        AttachStatus::Attached
    );
}

#[test]
fn dimensional_attach_starts_animation() {
    let (mut session, probe) = session(dimensional(4));

    let report = session.attach(&video()).unwrap();

    assert_eq!(report.rewire.branches_built, 4);
    assert!(report.animating);
    assert_eq!(probe.live_node_count(), CHAIN_NODES + 32);
    assert_eq!(probe.pending_frames().len(), 1);
    let wet = chain_param(&session, &probe, ChainSlot::ReverbWet, ParamKey::Gain);
    assert!((wet - 0.11).abs() < 1e-6);
}

#[test]
fn quality_preset_sets_cutoff() {
    let (mut session, probe) = session(Settings {
        audio_quality_on: true,
        audio_quality_preset: QualityPreset::P240,
        ..Settings::default()
    });
    session.attach(&video()).unwrap();

    let cutoff = chain_param(&session, &probe, ChainSlot::Quality, ParamKey::Frequency);
    assert_eq!(cutoff, 5_000.0);
}

#[test]
fn selecting_movie_applies_eq_and_gain() {
    let (mut session, probe) = session(Settings::default());
    session.attach(&video()).unwrap();

    let report = session.select_preset("movie").unwrap();

    assert!(report.is_none());
    assert_eq!(chain_param(&session, &probe, ChainSlot::Bass, ParamKey::Gain), 4.0);
    assert_eq!(chain_param(&session, &probe, ChainSlot::Mid, ParamKey::Gain), 0.0);
    assert_eq!(chain_param(&session, &probe, ChainSlot::Treble, ParamKey::Gain), -1.0);
    let master = chain_param(&session, &probe, ChainSlot::Master, ParamKey::Gain);
    assert!((master - 1.189).abs() < 1e-3, "master gain {master}");
    assert_eq!(
        chain_param(&session, &probe, ChainSlot::Compressor, ParamKey::Ratio),
        2.0
    );
    assert_eq!(session.settings().unwrap().bass, 4.0);

    let stored = session.store().settings();
    assert_eq!(stored.preset_mode, "movie");
    assert_eq!(stored.audio_tool_attach_status, AttachStatus::Attached);
    assert_eq!((stored.bass, stored.mids, stored.treble), (4.0, 0.0, -1.0));
}

#[test]
fn selected_preset_survives_reattach() {
    let (mut session, probe) = session(Settings::default());
    session.attach(&video()).unwrap();
    session.select_preset("movie").unwrap();

    session.attach(&MediaElement::new(8, "video#next")).unwrap();

    assert_eq!(chain_param(&session, &probe, ChainSlot::Bass, ParamKey::Gain), 4.0);
    assert_eq!(chain_param(&session, &probe, ChainSlot::Treble, ParamKey::Gain), -1.0);
}

#[test]
fn unknown_preset_selection_changes_nothing() {
    let (mut session, probe) = session(Settings::default());
    session.attach(&video()).unwrap();
    let stored = session.store().settings().clone();

    assert!(matches!(
        session.select_preset("disco"),
        Err(EngineError::Config(_))
    ));
    assert_eq!(session.store().settings(), &stored);
    assert_eq!(chain_param(&session, &probe, ChainSlot::Bass, ParamKey::Gain), 0.0);
}

#[test]
fn attach_and_apply_give_the_same_eq() {
    let snapshot = Settings {
        preset_mode: "movie".into(),
        bass: 2.0,
        ..Settings::default()
    };

    let (mut attached, attached_probe) = session(snapshot.clone());
    attached.attach(&video()).unwrap();

    let (mut applied, applied_probe) = session(Settings::default());
    applied.attach(&video()).unwrap();
    applied.apply_settings(snapshot).unwrap();

    for slot in [ChainSlot::Bass, ChainSlot::Mid, ChainSlot::Treble, ChainSlot::Master] {
        assert_eq!(
            chain_param(&attached, &attached_probe, slot, ParamKey::Gain),
            chain_param(&applied, &applied_probe, slot, ParamKey::Gain),
            "{slot:?}"
        );
    }
    assert_eq!(
        chain_param(&attached, &attached_probe, ChainSlot::Bass, ParamKey::Gain),
        2.0
    );
}

#[test]
fn stored_preset_selection_attaches_with_its_eq() {
    let mut settings = Settings::default();
    settings.select_preset("rock").unwrap();
    let (mut session, probe) = session(settings);
    session.attach(&video()).unwrap();

    assert_eq!(chain_param(&session, &probe, ChainSlot::Bass, ParamKey::Gain), 4.0);
    assert_eq!(
        chain_param(&session, &probe, ChainSlot::Compressor, ParamKey::Threshold),
        -16.0
    );
}

#[test]
fn binding_failure_leaves_nothing_connected() {
    let (mut session, probe) = session(dimensional(4));
    probe.inject(Fault::ElementSource);
    probe.inject(Fault::StreamSource);

    let err = session.attach(&video()).unwrap_err();

    assert!(matches!(err, EngineError::SourceBinding { .. }), "{err}");
    assert!(!session.is_attached());
    assert_eq!(probe.live_node_count(), 0);
    assert!(probe.live_edges().is_empty());
    assert_eq!(probe.context_state(), Some(ContextState::Closed));
    assert!(probe.pending_frames().is_empty());
    assert_eq!(
        session.store().settings().audio_tool_attach_status,
        AttachStatus::AttachFailed
    );
}

#[test]
fn capture_stream_fallback() {
    let (mut session, probe) = session(Settings::default());
    probe.inject(Fault::ElementSource);

    let report = session.attach(&video()).unwrap();

    assert_eq!(report.binding, BindingMode::CaptureStream);
    assert_eq!(probe.source_mode(), Some(SourceMode::Stream));
}

#[test]
fn no_fallback_without_capture_support() {
    let (mut session, probe) = session(Settings::default());
    probe.inject(Fault::ElementSource);

    let err = session
        .attach(&video().with_capture(false))
        .unwrap_err();

    assert!(matches!(err, EngineError::SourceBinding { .. }));
    assert_eq!(session.store().status_history(), &[AttachStatus::AttachFailed]);
}

#[test]
fn context_creation_failure_is_reported() {
    let (mut session, probe) = session(Settings::default());
    probe.inject(Fault::ContextCreation);

    let err = session.attach(&video()).unwrap_err();

    assert!(matches!(err, EngineError::Backend(_)));
    assert_eq!(probe.contexts_created(), 0);
    assert_eq!(session.store().status_history(), &[AttachStatus::AttachFailed]);
}

#[test]
fn disabled_snapshot_does_not_attach() {
    let (mut session, probe) = session(Settings {
        enabled: false,
        ..Settings::default()
    });

    assert!(matches!(session.attach(&video()), Err(EngineError::Disabled)));
    assert_eq!(probe.contexts_created(), 0);
    assert!(session.store().status_history().is_empty());
}

#[test]
fn count_change_keeps_origin_and_one_frame() {
    let platform = OfflinePlatform::new().with_start_time(5.0);
    let (mut session, probe) = session_on(platform, dimensional(4));
    session.attach(&video()).unwrap();
    let origin = session.graph().unwrap().spatial().animator().origin();
    assert_eq!(origin, Some(5.0));

    probe.advance_time(0.75);
    let report = session.apply_settings(dimensional(8)).unwrap().unwrap();

    assert_eq!(report.branches_built, 8);
    assert_eq!(probe.current_time(), 5.75);
    assert_eq!(session.graph().unwrap().spatial().animator().origin(), Some(5.0));
    assert_eq!(probe.pending_frames().len(), 1);
    assert_eq!(probe.live_node_count(), CHAIN_NODES + 64);
    assert_eq!(probe.duplicate_edges(), 0);
}

#[test]
fn unchanged_topology_is_not_rebuilt() {
    let (mut session, probe) = session(dimensional(6));
    session.attach(&video()).unwrap();
    let requested = probe.frames_requested();

    let louder = session.store_mut().update(|s| s.bass = 3.0);
    assert!(session.apply_settings(louder.clone()).unwrap().is_none());
    assert!(session.apply_settings(louder).unwrap().is_none());

    assert_eq!(probe.frames_requested(), requested);
    assert_eq!(probe.pending_frames().len(), 1);
    assert_eq!(chain_param(&session, &probe, ChainSlot::Bass, ParamKey::Gain), 3.0);
}

#[test]
fn toggling_dimensional_off_and_on() {
    let (mut session, probe) = session(dimensional(3));
    session.attach(&video()).unwrap();

    let off = session.apply_settings(Settings::default()).unwrap().unwrap();
    assert_eq!(off.branches_built, 0);
    assert_eq!(off.wet_level, 0.0);
    assert!(probe.pending_frames().is_empty());
    assert_eq!(session.graph().unwrap().spatial().animator().origin(), None);
    assert_eq!(probe.live_node_count(), CHAIN_NODES);

    let on = session.apply_settings(dimensional(3)).unwrap().unwrap();
    assert_eq!(on.branches_built, 3);
    assert_eq!(probe.pending_frames().len(), 1);
    assert_eq!(probe.duplicate_edges(), 0);
}

#[test]
fn frames_drive_orbit_positions() {
    let (mut session, probe) = session(dimensional(2));
    session.attach(&video()).unwrap();

    for _ in 0..3 {
        probe.advance_time(1.0 / 60.0);
        let frame = probe.deliver_next_frame().unwrap();
        assert_eq!(
            session.on_frame(frame),
            Some(StepOutcome::Stepped { rescheduled: true })
        );
    }

    let graph = session.graph().unwrap();
    let elapsed = probe.current_time();
    for branch in graph.spatial().branches().iter() {
        let expected = branch.layout.frame_at(elapsed);
        let z = probe.param_value(branch.bass_panner, ParamKey::PositionZ).unwrap();
        assert!((z - expected.bass_position[2]).abs() < 1e-5);
    }
    assert_eq!(probe.pending_frames().len(), 1);
}

#[test]
fn stale_frame_is_ignored() {
    let (mut session, probe) = session(dimensional(2));
    session.attach(&video()).unwrap();
    let events = probe.param_events().len();

    assert_eq!(session.on_frame(FrameId(4_242)), Some(StepOutcome::Stale));
    assert_eq!(probe.param_events().len(), events);
    assert_eq!(probe.pending_frames().len(), 1);
}

#[test]
fn frames_after_detach_are_dropped() {
    let (mut session, probe) = session(dimensional(2));
    session.attach(&video()).unwrap();
    let frame = probe.pending_frames()[0];

    session.detach();

    assert_eq!(session.on_frame(frame), None);
    assert!(probe.pending_frames().is_empty());
}

#[test]
fn failed_branch_is_skipped_and_reported() {
    let (mut session, probe) = session(dimensional(4));
    probe.inject(Fault::NodeCreation {
        tag: NodeTag::Panner,
        nth: 2,
    });

    let report = session.attach(&video()).unwrap();

    assert_eq!(report.rewire.branches_built, 3);
    assert_eq!(report.rewire.failed.len(), 1);
    assert_eq!(report.rewire.failed[0].index, 1);
    assert_eq!(probe.live_node_count(), CHAIN_NODES + 24);
    assert_eq!(probe.nodes_with_tag(NodeTag::Panner).len(), 3);
}

#[test]
fn failed_rewire_detaches() {
    let (mut session, probe) = session(dimensional(4));
    session.attach(&video()).unwrap();
    // attach made 9 chain and 48 branch connections
    probe.inject(Fault::Connect { nth: 9 + 4 * 12 + 2 });

    let err = session.apply_settings(dimensional(8)).unwrap_err();

    assert!(matches!(err, EngineError::Backend(_)));
    assert!(!session.is_attached());
    assert!(session.settings().is_none());
    assert_eq!(probe.live_node_count(), 0);
    assert!(probe.pending_frames().is_empty());
    assert_eq!(probe.context_state(), Some(ContextState::Closed));

    probe.clear_faults();
    let report = session.attach(&video()).unwrap();
    assert_eq!(report.rewire.branches_built, 4);
}

#[test]
fn missing_dynamics_stage_is_tolerated() {
    let (mut session, probe) = session(Settings::default());
    probe.inject(Fault::EveryNode(NodeTag::Compressor));

    let report = session.attach(&video()).unwrap();

    assert!(!report.dynamics);
    assert!(probe.nodes_with_tag(NodeTag::Compressor).is_empty());
    assert_eq!(probe.live_edges().len(), 9);
}

#[test]
fn animation_waits_for_running_context() {
    let platform = OfflinePlatform::new().with_initial_state(ContextState::Suspended);
    let (mut session, probe) = session_on(platform, dimensional(5));

    let report = session.attach(&video()).unwrap();
    assert!(!report.animating);
    assert!(!session.on_context_state_change());

    probe.set_context_state(ContextState::Running);
    assert!(session.on_context_state_change());
    assert_eq!(probe.pending_frames().len(), 1);
    assert!(session.on_context_state_change());
    assert_eq!(probe.pending_frames().len(), 1);
}

#[test]
fn disabling_detaches() {
    let (mut session, probe) = session(dimensional(4));
    session.attach(&video()).unwrap();

    let report = session
        .apply_settings(Settings {
            enabled: false,
            ..dimensional(4)
        })
        .unwrap();

    assert!(report.is_none());
    assert!(!session.is_attached());
    assert_eq!(probe.context_state(), Some(ContextState::Closed));
    assert!(probe.pending_frames().is_empty());

    // re-enabling needs a new attach
    assert!(session.apply_settings(dimensional(4)).unwrap().is_none());
    assert!(!session.is_attached());
}

#[test]
fn detach_is_idempotent() {
    let (mut session, probe) = session(dimensional(2));
    session.attach(&video()).unwrap();

    session.detach();
    session.detach();

    assert!(!session.is_attached());
    assert_eq!(probe.live_node_count(), 0);
    assert!(probe.pending_frames().is_empty());
}

#[test]
fn reattach_replaces_the_graph() {
    let (mut session, probe) = session(dimensional(3));
    session.attach(&video()).unwrap();
    session.attach(&MediaElement::new(8, "video#next")).unwrap();

    assert_eq!(probe.contexts_created(), 2);
    assert_eq!(probe.live_node_count(), CHAIN_NODES + 24);
    assert_eq!(probe.pending_frames().len(), 1);
    assert_eq!(
        session.store().status_history(),
        &[AttachStatus::Attached, AttachStatus::Attached]
    );
}
