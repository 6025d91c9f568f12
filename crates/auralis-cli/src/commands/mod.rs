//! CLI command implementations.

pub mod common;
pub mod impulse;
pub mod plan;
pub mod presets;
pub mod simulate;
