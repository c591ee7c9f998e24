//! scoretick CLI library.
//!
//! This crate wraps the scoretick core with file-level concerns: MIDI
//! container I/O, anchor-file loading, and the command implementations
//! behind the `scoretick` binary.

pub mod anchors;
pub mod commands;
pub mod midi;
