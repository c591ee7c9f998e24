//! Time-signature tracking: ticks-per-beat and beats-per-measure at a tick.
//!
//! Ticks per beat changes not only with tempo but with the time signature:
//! 2/4 and 4/4 carry one beat per quarter note, while 3/8 and 6/8 carry one
//! beat per eighth note and therefore half the PPQ.

use crate::event::{EventKind, TrackEvent};

/// A time-signature change at an absolute tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignatureEntry {
    /// Absolute tick at which this signature takes effect.
    pub start_tick: u64,
    pub numerator: u32,
    pub denominator: u32,
}

/// Ordered time-signature entries plus the file's tick resolution. Queries
/// before the first entry (or on a file without signature events) fall back
/// to 4/4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSignatureMap {
    ppq: u16,
    entries: Vec<TimeSignatureEntry>,
}

impl TimeSignatureMap {
    /// Scan all tracks for time-signature events and build a map sorted by
    /// tick. Signatures conventionally live in track 0, but stray entries in
    /// other tracks are picked up too.
    pub fn from_tracks(tracks: &[Vec<TrackEvent>], ppq: u16) -> Self {
        let mut entries = Vec::new();
        for track in tracks {
            let mut tick = 0u64;
            for ev in track {
                tick += ev.delta_ticks;
                if let EventKind::TimeSignature {
                    numerator,
                    denominator,
                } = ev.kind
                {
                    entries.push(TimeSignatureEntry {
                        start_tick: tick,
                        numerator,
                        denominator,
                    });
                }
            }
        }
        entries.sort_by_key(|e| e.start_tick);
        Self { ppq, entries }
    }

    /// Build a map directly from `(tick, numerator, denominator)` triples.
    pub fn from_entries(entries: Vec<TimeSignatureEntry>, ppq: u16) -> Self {
        let mut entries = entries;
        entries.sort_by_key(|e| e.start_tick);
        Self { ppq, entries }
    }

    /// Pulses per quarter note of the underlying file.
    pub fn ppq(&self) -> u16 {
        self.ppq
    }

    /// The signature governing `tick`: the latest entry at or before it,
    /// defaulting to 4/4.
    fn signature_at(&self, tick: u64) -> (u32, u32) {
        let idx = self.entries.partition_point(|e| e.start_tick <= tick);
        if idx == 0 {
            (4, 4)
        } else {
            let e = &self.entries[idx - 1];
            (e.numerator, e.denominator)
        }
    }

    /// Ticks per beat at `tick`. Denominator 4 means the quarter note gets
    /// the beat (PPQ); denominator 8 means the eighth note gets the beat
    /// (PPQ/2) regardless of numerator, so 3/8 and 6/8 are both eighth-beat
    /// meters. Anything else scales the PPQ by 4/denominator.
    pub fn ticks_per_beat_at(&self, tick: u64) -> u32 {
        let (_, denominator) = self.signature_at(tick);
        let ppq = self.ppq as u32;
        match denominator {
            4 => ppq,
            8 => ppq / 2,
            d => ppq * 4 / d.max(1),
        }
    }

    /// Beats per measure at `tick`: the numerator of the governing signature.
    pub fn beats_per_measure_at(&self, tick: u64) -> u32 {
        self.signature_at(tick).0
    }
}
