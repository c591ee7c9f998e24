//! Event stream model consumed by the maps and the tempo variator.
//!
//! The core does not parse MIDI containers. An external collaborator supplies
//! one ordered `(delta_ticks, kind)` stream per track; absolute tick position
//! is the cumulative sum of preceding deltas. Track 0 is assumed to carry all
//! tempo and time-signature events (global track convention).

/// The event kinds the core distinguishes. Everything that is neither a tempo
/// change nor a time signature is opaque to the core and only matters for its
/// tick position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Tempo change, in microseconds per quarter note.
    TempoChange { microseconds_per_quarter: u32 },
    /// Time signature change.
    TimeSignature { numerator: u32, denominator: u32 },
    /// Note onset.
    NoteOn { pitch: u8, channel: u8, velocity: u8 },
    /// Note release.
    NoteOff { pitch: u8, channel: u8 },
    /// Any other event (meta, controller, sysex, ...).
    Other,
}

impl EventKind {
    /// Whether this event is a tempo change.
    pub fn is_tempo(&self) -> bool {
        matches!(self, EventKind::TempoChange { .. })
    }
}

/// One element of a per-track event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackEvent {
    /// Ticks elapsed since the previous event in the same track.
    pub delta_ticks: u64,
    /// What happened.
    pub kind: EventKind,
}

impl TrackEvent {
    pub fn new(delta_ticks: u64, kind: EventKind) -> Self {
        Self { delta_ticks, kind }
    }
}

/// Total tick span of a single track (sum of all delta times).
pub fn track_tick_span(track: &[TrackEvent]) -> u64 {
    track.iter().map(|ev| ev.delta_ticks).sum()
}

/// Tick span of the longest track, i.e. the total duration of the piece in
/// ticks.
pub fn max_tick_span(tracks: &[Vec<TrackEvent>]) -> u64 {
    tracks
        .iter()
        .map(|track| track_tick_span(track))
        .max()
        .unwrap_or(0)
}

/// Collect `(absolute_tick, microseconds_per_quarter)` pairs from a track, in
/// stream order.
pub fn collect_tempo_changes(track: &[TrackEvent]) -> Vec<(u64, u32)> {
    let mut changes = Vec::new();
    let mut tick = 0u64;
    for ev in track {
        tick += ev.delta_ticks;
        if let EventKind::TempoChange {
            microseconds_per_quarter,
        } = ev.kind
        {
            changes.push((tick, microseconds_per_quarter));
        }
    }
    changes
}
