//! Platform traits and handle types.

use std::fmt;

use auralis_core::{ImpulseResponse, NodeKind, ParamKey};

use crate::Result;

/// Opaque handle to a native node.
///
/// Handles are never reused within one context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeHandle(pub u64);

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Token of a requested animation frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(pub u64);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

/// Audio context lifecycle state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContextState {
    /// Processing audio.
    #[default]
    Running,
    /// Created but not yet allowed to play, or paused.
    Suspended,
    /// Closed; every further operation fails.
    Closed,
}

impl ContextState {
    /// Lowercase name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Suspended => "suspended",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A streaming media element the graph can attach to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaElement {
    /// Host-assigned identifier.
    pub id: u64,
    /// Human-readable label for logs.
    pub label: String,
    /// Whether the element can expose a capture stream, used when it cannot
    /// be bound directly.
    pub supports_capture: bool,
}

impl MediaElement {
    /// Creates an element that supports capture streams.
    pub fn new(id: u64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            supports_capture: true,
        }
    }

    /// Sets capture stream support.
    pub fn with_capture(mut self, supports_capture: bool) -> Self {
        self.supports_capture = supports_capture;
        self
    }
}

/// A native audio context: node factory, connections and parameter
/// automation.
///
/// `Source` and `Destination` are not created through [`create_node`]: sources
/// come from the `create_media_*_source` methods and the destination is a
/// fixed node of the context.
///
/// [`create_node`]: AudioContext::create_node
pub trait AudioContext {
    /// Current lifecycle state.
    fn state(&self) -> ContextState;

    /// Context clock in seconds.
    fn current_time(&self) -> f64;

    /// Sample rate in Hz.
    fn sample_rate(&self) -> u32;

    /// The context output node.
    fn destination(&self) -> NodeHandle;

    /// Creates a processing node.
    fn create_node(&mut self, kind: &NodeKind) -> Result<NodeHandle>;

    /// Binds a media element directly as a source.
    fn create_media_element_source(&mut self, media: &MediaElement) -> Result<NodeHandle>;

    /// Binds a media element through its capture stream.
    fn create_media_stream_source(&mut self, media: &MediaElement) -> Result<NodeHandle>;

    /// Connects the output of `from` to the input of `to`.
    fn connect(&mut self, from: NodeHandle, to: NodeHandle) -> Result<()>;

    /// Removes every outgoing connection of `node`.
    fn disconnect(&mut self, node: NodeHandle) -> Result<()>;

    /// Disconnects `node` entirely and drops it. The handle becomes invalid.
    fn release(&mut self, node: NodeHandle) -> Result<()>;

    /// Sets a parameter immediately.
    fn set_param(&mut self, node: NodeHandle, param: ParamKey, value: f32) -> Result<()>;

    /// Schedules a parameter value at context time `at`.
    fn schedule_param(
        &mut self,
        node: NodeHandle,
        param: ParamKey,
        value: f32,
        at: f64,
    ) -> Result<()>;

    /// Loads an impulse response into a convolver.
    fn set_convolver_buffer(&mut self, node: NodeHandle, impulse: &ImpulseResponse) -> Result<()>;

    /// Closes the context and releases every node it owns.
    fn close(&mut self) -> Result<()>;
}

/// Host animation-frame scheduling.
pub trait FrameScheduler {
    /// Requests one callback on the next display frame.
    fn request_frame(&mut self) -> FrameId;

    /// Cancels a pending frame. Unknown or already delivered frames are
    /// ignored.
    fn cancel_frame(&mut self, frame: FrameId);
}

/// A host that can create audio contexts and schedule frames.
pub trait Platform: FrameScheduler {
    /// Context type produced by this platform.
    type Context: AudioContext;

    /// Creates a new audio context.
    fn create_context(&mut self) -> Result<Self::Context>;
}
