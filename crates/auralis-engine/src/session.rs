//! Host-facing session.
//!
//! A [`Session`] owns the platform, the settings store and at most one
//! [`AudioGraph`]. The host calls it from its event loop, one method at a
//! time:
//!
//! - [`attach`](Session::attach) when a media element appears
//! - [`apply_settings`](Session::apply_settings) when the stored snapshot
//!   changes
//! - [`select_preset`](Session::select_preset) when the user picks a preset
//! - [`on_frame`](Session::on_frame) when a requested animation frame fires
//! - [`on_context_state_change`](Session::on_context_state_change) when the
//!   context resumes
//! - [`detach`](Session::detach) when the element goes away
//!
//! Store failures are logged and never abort audio work.

use auralis_config::{AttachStatus, Settings, SettingsStore};
use auralis_io::{AudioContext, ContextState, FrameId, MediaElement, Platform};

use crate::animator::StepOutcome;
use crate::chain::BindingMode;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::reconcile::{TopologyAction, reconcile};
use crate::topology::{AudioGraph, RewireReport};

/// Summary of a successful attach.
#[derive(Clone, Debug, PartialEq)]
pub struct AttachReport {
    /// Label of the attached element.
    pub media: String,
    /// How the source was bound.
    pub binding: BindingMode,
    /// Whether the dynamics stage exists.
    pub dynamics: bool,
    /// Initial topology.
    pub rewire: RewireReport,
    /// Whether an animation frame is pending.
    pub animating: bool,
}

/// Outcome of [`Session::attach`].
pub type AttachResult = Result<AttachReport>;

/// One media element's processing session.
pub struct Session<P: Platform, S: SettingsStore> {
    platform: P,
    store: S,
    config: EngineConfig,
    graph: Option<AudioGraph<P::Context>>,
    settings: Option<Settings>,
}

impl<P: Platform, S: SettingsStore> Session<P, S> {
    /// Creates a detached session.
    pub fn new(platform: P, store: S) -> Self {
        Self {
            platform,
            store,
            config: EngineConfig::default(),
            graph: None,
            settings: None,
        }
    }

    /// Replaces the construction settings used by later attaches.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the graph for `media` from the stored settings.
    ///
    /// An existing graph is torn down first. The outcome is recorded in the
    /// store as [`AttachStatus::Attached`] or [`AttachStatus::AttachFailed`];
    /// a disabled snapshot records nothing.
    pub fn attach(&mut self, media: &MediaElement) -> AttachResult {
        self.detach();

        let settings = self.load_settings();
        if !settings.enabled {
            tracing::info!(media = %media.label, "processing disabled, not attaching");
            return Err(EngineError::Disabled);
        }

        match self.build_graph(media, settings) {
            Ok(report) => {
                tracing::info!(
                    media = %report.media,
                    binding = ?report.binding,
                    branches = report.rewire.branches_built,
                    "attached"
                );
                self.record_status(AttachStatus::Attached);
                Ok(report)
            }
            Err(e) => {
                tracing::warn!(media = %media.label, error = %e, "attach failed");
                self.record_status(AttachStatus::AttachFailed);
                Err(e)
            }
        }
    }

    fn load_settings(&self) -> Settings {
        self.store.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "settings unavailable, using defaults");
            Settings::default()
        })
    }

    fn build_graph(&mut self, media: &MediaElement, settings: Settings) -> AttachResult {
        let ctx = self.platform.create_context()?;
        let mut graph = AudioGraph::build(ctx, media, self.config)?;

        let r = reconcile(None, &settings);
        graph.apply_params(&r.params);
        let dimensional = match r.topology {
            TopologyAction::Rewire(dimensional) => dimensional,
            TopologyAction::Keep => settings.dimensional(),
        };
        let rewire = match graph.rewire(&mut self.platform, dimensional) {
            Ok(report) => report,
            Err(e) => {
                graph.teardown(&mut self.platform);
                return Err(e);
            }
        };
        let animating = graph.start_animation(&mut self.platform);

        let report = AttachReport {
            media: media.label.clone(),
            binding: graph.chain().binding(),
            dynamics: graph.chain().has_compressor(),
            rewire,
            animating,
        };
        self.graph = Some(graph);
        self.settings = Some(settings);
        Ok(report)
    }

    /// Applies a new snapshot to the attached graph.
    ///
    /// Parameters are always written; the topology is rebuilt only when the
    /// spatial switch or branch count changed, and the report of that
    /// rebuild is returned. A disabled snapshot detaches the session, and so
    /// does a failed rebuild. Without an attached graph the snapshot is
    /// ignored.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<Option<RewireReport>> {
        if !settings.enabled {
            if self.graph.is_some() {
                tracing::info!("processing disabled, detaching");
            }
            self.detach();
            return Ok(None);
        }
        let Some(graph) = self.graph.as_mut() else {
            tracing::debug!("no graph attached, settings ignored");
            return Ok(None);
        };

        let r = reconcile(self.settings.as_ref(), &settings);
        graph.apply_params(&r.params);

        let report = match r.topology {
            TopologyAction::Keep => None,
            TopologyAction::Rewire(dimensional) => match graph.rewire(&mut self.platform, dimensional) {
                Ok(report) => {
                    graph.start_animation(&mut self.platform);
                    Some(report)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "rewire failed, detaching");
                    self.detach();
                    return Err(e);
                }
            },
        };
        self.settings = Some(settings);
        Ok(report)
    }

    /// Selects a factory preset in the stored snapshot: its EQ triple
    /// replaces the band gains, the result is saved and then applied like
    /// any other snapshot. Unknown names change nothing.
    pub fn select_preset(&mut self, name: &str) -> Result<Option<RewireReport>> {
        let mut settings = self.load_settings();
        settings.select_preset(name)?;
        if let Err(e) = self.store.save(&settings) {
            tracing::warn!(preset = name, error = %e, "preset not saved");
        }
        self.apply_settings(settings)
    }

    /// Tears the graph down, if any.
    pub fn detach(&mut self) {
        if let Some(mut graph) = self.graph.take() {
            graph.teardown(&mut self.platform);
        }
        self.settings = None;
    }

    /// Delivers an animation frame. `None` when detached.
    pub fn on_frame(&mut self, frame: FrameId) -> Option<StepOutcome> {
        let graph = self.graph.as_mut()?;
        Some(graph.on_frame(frame, &mut self.platform))
    }

    /// Starts the animation once the context runs. Returns whether a frame
    /// is pending.
    pub fn on_context_state_change(&mut self) -> bool {
        let Some(graph) = self.graph.as_mut() else {
            return false;
        };
        let state = graph.context().state();
        tracing::debug!(%state, "context state changed");
        state == ContextState::Running && graph.start_animation(&mut self.platform)
    }

    fn record_status(&mut self, status: AttachStatus) {
        if let Err(e) = self.store.set_attach_status(status) {
            tracing::warn!(status = status.as_str(), error = %e, "attach status not saved");
        }
    }

    /// Returns `true` while a graph is attached.
    pub fn is_attached(&self) -> bool {
        self.graph.is_some()
    }

    /// The attached graph.
    pub fn graph(&self) -> Option<&AudioGraph<P::Context>> {
        self.graph.as_ref()
    }

    /// The snapshot currently applied.
    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    /// The settings store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the settings store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
