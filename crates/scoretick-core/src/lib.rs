//! scoretick core - tick/time/score-position conversion for MIDI-like event streams.
//!
//! This crate converts between the three time representations of a musical
//! performance: MIDI tick counts, wall-clock seconds, and score position
//! (measure/beat). It exists to prepare temporally-uniform analysis frames for
//! cross-matching multiple renderings of the same piece, and provides:
//!
//! - [`tempo::TempoMap`]: piecewise-constant tick<->time conversion built from
//!   tempo-change events.
//! - [`meter::TimeSignatureMap`]: ticks-per-beat and beats-per-measure queries
//!   at any tick, driven by time-signature events.
//! - [`variator`]: sine-wave tempo variation that rewrites the tempo track
//!   while preserving the tick position of every non-tempo event.
//! - [`frame`]: the [`frame::Frame`] record, uniform frame-skeleton generation,
//!   and columnar save/load of frame sequences.
//! - [`align`]: merging sparse (time, measure, beat) anchors into a dense
//!   per-frame score-position annotation.
//! - [`matcher`]: propagating score positions between two frame sequences via
//!   nearest-tick lookup.
//!
//! # Determinism
//!
//! All operations are deterministic and single-threaded. Maps are built once
//! per source file and are read-only thereafter; frame generation is a pure
//! function of the tempo map and the frame rate, so two independent runs over
//! the same input produce identical frame sequences.
//!
//! # Event model
//!
//! MIDI container parsing is out of scope. Callers supply ordered per-track
//! streams of [`event::TrackEvent`] (delta ticks plus an [`event::EventKind`]),
//! with the convention that track 0 carries all tempo and time-signature
//! events.

pub mod align;
pub mod error;
pub mod event;
pub mod frame;
pub mod matcher;
pub mod meter;
pub mod tempo;
pub mod variator;

pub use align::{align_frames, AlignState, ScoreAnchor};
pub use error::{Result, ScoretickError};
pub use event::{EventKind, TrackEvent};
pub use frame::{frame_skeleton, load_frames, save_frames, Frame};
pub use matcher::match_frames;
pub use meter::{TimeSignatureEntry, TimeSignatureMap};
pub use tempo::{TempoEntry, TempoMap};
pub use variator::{vary, VariationDomain, VariatorConfig};

/// Crate version for tool identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
