//! # eucalypso-types
//!
//! Shared type definitions for the Eucalypso sequencing core.
//! This crate contains the configuration structures the engine consumes and
//! an embedding host mutates through the flat parameter surface.

pub mod lane;
pub mod music;
pub mod settings;

pub use lane::{LaneConfig, OctaveRange};
pub use music::ScaleMode;
pub use settings::{
    EngineConfig, HeldOrder, MissingNotePolicy, PlayMode, Rate, RegisterMode, RetriggerMode,
    SyncMode,
};

/// Number of rhythm lanes.
pub const MAX_LANES: usize = 4;

/// Largest note pool a register can expose.
pub const MAX_REGISTER_NOTES: usize = 24;

/// Hard ceiling on simultaneously sounding voices.
pub const MAX_VOICES: usize = 64;
