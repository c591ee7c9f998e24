//! CLI command implementations

pub mod frames;
pub mod match_frames;
pub mod vary;
