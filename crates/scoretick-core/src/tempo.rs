//! Piecewise-constant tempo map and tick<->time conversion.
//!
//! A MIDI-like stream expresses time in ticks whose wall-clock duration
//! depends on the governing tempo. The [`TempoMap`] records one entry per
//! tempo segment (a maximal tick range with a constant tempo) and answers
//! `tick_to_time` / `time_to_tick` queries with a binary search. Both queries
//! run in tight per-frame loops, so the segment list is built once and shared
//! read-only afterwards.

use crate::error::{Result, ScoretickError};
use crate::event::{collect_tempo_changes, TrackEvent};

/// Default tempo when a file carries no tempo events: 500000 us per quarter
/// note, i.e. 120 BPM.
pub const DEFAULT_TEMPO_MSPQ: u32 = 500_000;

/// One tempo segment. `start_time_us` is the cumulative wall-clock time at
/// `start_tick`, so consecutive entries are continuous: there is no time jump
/// at a tempo change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoEntry {
    /// Absolute tick at which this segment begins.
    pub start_tick: u64,
    /// Wall-clock time at `start_tick`, in microseconds.
    pub start_time_us: f64,
    /// Tempo over this segment, in microseconds per quarter note.
    pub microseconds_per_quarter: u32,
}

/// Piecewise-linear tick->time mapping, ordered by `start_tick` strictly
/// increasing. Never empty: construction falls back to a single default
/// 120 BPM entry at tick 0.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    ppq: u16,
    entries: Vec<TempoEntry>,
}

/// Microseconds spanned by `ticks` at a given tempo. Multiplies before
/// dividing so quarter-note-aligned spans stay exact in floating point.
fn ticks_to_us(ticks: u64, microseconds_per_quarter: u32, ppq: u16) -> f64 {
    ticks as f64 * microseconds_per_quarter as f64 / ppq as f64
}

impl TempoMap {
    /// Build a map from a track's event stream (track 0 by convention).
    pub fn from_track(track: &[TrackEvent], ppq: u16) -> Result<Self> {
        Self::from_tempo_changes(&collect_tempo_changes(track), ppq)
    }

    /// Build a map from `(absolute_tick, microseconds_per_quarter)` pairs.
    ///
    /// Ticks must be non-decreasing; a later change at the same tick replaces
    /// the earlier one. If the first change sits past tick 0, its rate is
    /// applied retroactively from tick 0 so every tick is covered. With no
    /// changes at all, the map holds a single default 120 BPM entry.
    pub fn from_tempo_changes(changes: &[(u64, u32)], ppq: u16) -> Result<Self> {
        if ppq == 0 {
            return Err(ScoretickError::MalformedInput(
                "pulses per quarter note must be positive".to_string(),
            ));
        }

        if changes.is_empty() {
            return Ok(Self {
                ppq,
                entries: vec![TempoEntry {
                    start_tick: 0,
                    start_time_us: 0.0,
                    microseconds_per_quarter: DEFAULT_TEMPO_MSPQ,
                }],
            });
        }

        let mut entries: Vec<TempoEntry> = Vec::with_capacity(changes.len() + 1);
        for &(tick, mspq) in changes {
            if mspq == 0 {
                return Err(ScoretickError::MalformedInput(format!(
                    "zero tempo value at tick {tick}"
                )));
            }
            match entries.last_mut() {
                None => {
                    // First tempo applies retroactively from tick 0.
                    if tick > 0 {
                        entries.push(TempoEntry {
                            start_tick: 0,
                            start_time_us: 0.0,
                            microseconds_per_quarter: mspq,
                        });
                    }
                    entries.push(TempoEntry {
                        start_tick: tick,
                        start_time_us: ticks_to_us(tick, mspq, ppq),
                        microseconds_per_quarter: mspq,
                    });
                }
                Some(last) if tick == last.start_tick => {
                    last.microseconds_per_quarter = mspq;
                }
                Some(last) if tick < last.start_tick => {
                    return Err(ScoretickError::MalformedInput(format!(
                        "tempo entries not monotonic at tick {tick}"
                    )));
                }
                Some(last) => {
                    let start_time_us = last.start_time_us
                        + ticks_to_us(
                            tick - last.start_tick,
                            last.microseconds_per_quarter,
                            ppq,
                        );
                    entries.push(TempoEntry {
                        start_tick: tick,
                        start_time_us,
                        microseconds_per_quarter: mspq,
                    });
                }
            }
        }

        Ok(Self { ppq, entries })
    }

    /// The ordered tempo segments.
    pub fn entries(&self) -> &[TempoEntry] {
        &self.entries
    }

    /// Pulses per quarter note this map was built with.
    pub fn ppq(&self) -> u16 {
        self.ppq
    }

    /// Segment governing `tick`: the rightmost entry whose `start_tick` does
    /// not exceed it.
    fn segment_at_tick(&self, tick: u64) -> Result<&TempoEntry> {
        let idx = self.entries.partition_point(|e| e.start_tick <= tick);
        if idx == 0 {
            return Err(ScoretickError::OutOfRange(format!(
                "no tempo segment covers tick {tick}"
            )));
        }
        Ok(&self.entries[idx - 1])
    }

    /// Wall-clock time in seconds at an absolute tick.
    pub fn tick_to_time(&self, tick: u64) -> Result<f64> {
        if self.entries.is_empty() {
            return Err(ScoretickError::OutOfRange(
                "tempo map is empty".to_string(),
            ));
        }
        let seg = self.segment_at_tick(tick)?;
        let us = seg.start_time_us
            + ticks_to_us(tick - seg.start_tick, seg.microseconds_per_quarter, self.ppq);
        Ok(us / 1e6)
    }

    /// Absolute tick at a wall-clock time in seconds (floor of the fractional
    /// tick). A time exactly on a tempo-change boundary resolves to the later
    /// segment, so the new rate governs a sample on the boundary.
    pub fn time_to_tick(&self, seconds: f64) -> Result<u64> {
        if self.entries.is_empty() {
            return Err(ScoretickError::OutOfRange(
                "tempo map is empty".to_string(),
            ));
        }
        if seconds < 0.0 {
            return Err(ScoretickError::OutOfRange(format!(
                "negative time {seconds} has no tick position"
            )));
        }
        let target_us = seconds * 1e6;
        let idx = self.entries.partition_point(|e| e.start_time_us <= target_us);
        let seg = &self.entries[idx.max(1) - 1];
        let additional = ((target_us - seg.start_time_us) * self.ppq as f64
            / seg.microseconds_per_quarter as f64)
            .floor();
        Ok(seg.start_tick + additional as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn simple_map() -> TempoMap {
        // 120 BPM from tick 0, 60 BPM from tick 960.
        TempoMap::from_tempo_changes(&[(0, 500_000), (960, 1_000_000)], 480).unwrap()
    }

    #[test]
    fn test_default_map_when_no_tempo_events() {
        let map = TempoMap::from_tempo_changes(&[], 480).unwrap();
        assert_eq!(map.entries().len(), 1);
        assert_eq!(map.entries()[0].start_tick, 0);
        assert_eq!(map.entries()[0].microseconds_per_quarter, DEFAULT_TEMPO_MSPQ);
    }

    #[test]
    fn test_tick_to_time_ppq_480_single_segment() {
        let map = TempoMap::from_tempo_changes(&[(0, 500_000)], 480).unwrap();
        // One quarter note at 120 BPM is exactly half a second.
        assert_eq!(map.tick_to_time(480).unwrap(), 0.5);
        assert_eq!(map.tick_to_time(0).unwrap(), 0.0);
    }

    #[test]
    fn test_tick_to_time_across_segments() {
        let map = simple_map();
        // 960 ticks at 120 BPM = 1.0 s, then 480 ticks at 60 BPM = 1.0 s.
        assert_eq!(map.tick_to_time(960).unwrap(), 1.0);
        assert_eq!(map.tick_to_time(1440).unwrap(), 2.0);
    }

    #[test]
    fn test_segment_linearity() {
        let map = simple_map();
        let a = map.tick_to_time(100).unwrap();
        let b = map.tick_to_time(700).unwrap();
        let us_per_tick = 500_000.0 / 480.0;
        assert!((b - a - 600.0 * us_per_tick / 1e6).abs() < 1e-12);
    }

    #[test]
    fn test_time_to_tick_quarter_steps_are_exact() {
        let map = TempoMap::from_tempo_changes(&[(0, 500_000)], 480).unwrap();
        assert_eq!(map.time_to_tick(0.25).unwrap(), 240);
        assert_eq!(map.time_to_tick(0.5).unwrap(), 480);
        assert_eq!(map.time_to_tick(1.0).unwrap(), 960);
    }

    #[test]
    fn test_time_to_tick_boundary_resolves_to_later_segment() {
        let map = simple_map();
        // 1.0 s is exactly the boundary at tick 960; the later (60 BPM)
        // segment governs, so one more second advances only 480 ticks.
        assert_eq!(map.time_to_tick(1.0).unwrap(), 960);
        assert_eq!(map.time_to_tick(2.0).unwrap(), 1440);
    }

    #[test]
    fn test_time_to_tick_floors() {
        let map = TempoMap::from_tempo_changes(&[(0, 500_000)], 480).unwrap();
        // 480 ticks per half second; 0.2501 s is 240.096 ticks.
        assert_eq!(map.time_to_tick(0.2501).unwrap(), 240);
    }

    #[test]
    fn test_round_trip_within_one_tick() {
        let map = simple_map();
        let tick_duration = 1_000_000.0 / 480.0 / 1e6;
        for t in [0.0, 0.25, 0.9999, 1.0, 1.5, 1.999] {
            let back = map.tick_to_time(map.time_to_tick(t).unwrap()).unwrap();
            assert!(
                (back - t).abs() <= tick_duration,
                "round trip of {t} drifted to {back}"
            );
        }
    }

    #[test]
    fn test_first_tempo_applies_retroactively() {
        let map = TempoMap::from_tempo_changes(&[(480, 1_000_000)], 480).unwrap();
        assert_eq!(map.entries().len(), 2);
        assert_eq!(map.entries()[0].start_tick, 0);
        // 480 ticks at 60 BPM before the explicit entry.
        assert_eq!(map.tick_to_time(480).unwrap(), 1.0);
    }

    #[test]
    fn test_same_tick_change_replaces_previous() {
        let map =
            TempoMap::from_tempo_changes(&[(0, 500_000), (0, 1_000_000)], 480).unwrap();
        assert_eq!(map.entries().len(), 1);
        assert_eq!(map.entries()[0].microseconds_per_quarter, 1_000_000);
    }

    #[test]
    fn test_non_monotonic_entries_rejected() {
        let err = TempoMap::from_tempo_changes(&[(960, 500_000), (480, 250_000)], 480)
            .unwrap_err();
        assert!(matches!(err, ScoretickError::MalformedInput(_)));
        assert!(err.to_string().contains("not monotonic at tick 480"));
    }

    #[test]
    fn test_zero_ppq_rejected() {
        assert!(matches!(
            TempoMap::from_tempo_changes(&[(0, 500_000)], 0),
            Err(ScoretickError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_negative_time_is_out_of_range() {
        let map = simple_map();
        assert!(matches!(
            map.time_to_tick(-0.5),
            Err(ScoretickError::OutOfRange(_))
        ));
    }
}
