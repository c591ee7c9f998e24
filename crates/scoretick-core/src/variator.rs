//! Sine-wave tempo variation.
//!
//! Rewrites a tempo track so the instantaneous tempo follows
//! `new_tempo(x) = original_tempo(x) / 2^(amplitude * sin(2*pi*x / period))`,
//! where `x` is a tick count (tick domain) or elapsed seconds (time domain).
//! Delta ticks of non-tempo events never change with tempo, so every
//! non-tempo event keeps its absolute tick position; only the density and
//! values of tempo-change events differ. Synthetic tempo events are inserted
//! every `spacing` ticks (or seconds, translated through the pre-variation
//! tempo map) by splitting the pending delta of the event they land inside.

use std::f64::consts::TAU;

use crate::error::{Result, ScoretickError};
use crate::event::{collect_tempo_changes, max_tick_span, EventKind, TrackEvent};
use crate::tempo::{TempoMap, DEFAULT_TEMPO_MSPQ};

/// Which axis the sine wave is sampled along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariationDomain {
    /// `x` is the absolute tick count; `period` and `spacing` are in ticks.
    Tick,
    /// `x` is elapsed seconds under the pre-variation tempo map; `period`
    /// and `spacing` are in seconds.
    Time,
}

impl std::str::FromStr for VariationDomain {
    type Err = ScoretickError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tick" => Ok(VariationDomain::Tick),
            "time" => Ok(VariationDomain::Time),
            other => Err(ScoretickError::Configuration(format!(
                "unknown variation domain: {other}"
            ))),
        }
    }
}

/// Parameters of one variation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariatorConfig {
    pub domain: VariationDomain,
    /// Sine period, in ticks or seconds depending on the domain.
    pub period: f64,
    /// Sine amplitude in octaves: amplitude 1 sweeps between half and double
    /// the original tempo duration.
    pub amplitude: f64,
    /// Spacing between synthetic tempo events, in ticks or seconds.
    pub spacing: f64,
}

impl VariatorConfig {
    fn validate(&self) -> Result<()> {
        if !(self.period > 0.0) {
            return Err(ScoretickError::Configuration(format!(
                "period must be positive, got {}",
                self.period
            )));
        }
        if !(self.spacing > 0.0) {
            return Err(ScoretickError::Configuration(format!(
                "spacing must be positive, got {}",
                self.spacing
            )));
        }
        if self.domain == VariationDomain::Tick && self.spacing < 1.0 {
            return Err(ScoretickError::Configuration(format!(
                "tick-domain spacing must be at least one tick, got {}",
                self.spacing
            )));
        }
        Ok(())
    }
}

/// The modulation factor at position `x`: `2^(amplitude * sin(2*pi*x/period))`.
/// The varied tempo value is the original divided by this factor.
pub fn sine_factor(period: f64, amplitude: f64, x: f64) -> f64 {
    2.0_f64.powf(amplitude * (TAU * x / period).sin())
}

/// The original (pre-variation) tempo governing `tick`: the latest change at
/// or before it, falling back to the first change, or 120 BPM for a file
/// without tempo events.
fn original_tempo_at(changes: &[(u64, u32)], tick: u64) -> u32 {
    let idx = changes.partition_point(|&(t, _)| t <= tick);
    if idx == 0 {
        changes.first().map(|&(_, m)| m).unwrap_or(DEFAULT_TEMPO_MSPQ)
    } else {
        changes[idx - 1].1
    }
}

fn varied_tempo(changes: &[(u64, u32)], tick: u64, factor: f64) -> u32 {
    let original = original_tempo_at(changes, tick);
    ((original as f64 / factor) as u32).max(1)
}

/// Apply sine-wave tempo variation to an event stream.
///
/// Track 0 (the tempo track by convention) is rewritten; all other tracks
/// are passed through untouched since their delta ticks do not depend on
/// tempo. The rewritten tempo track is padded with a no-op event so its tick
/// span matches the longest track in the file, preventing players from
/// silently truncating the result.
///
/// # Errors
/// `Configuration` on non-positive `period` or `spacing`; `MalformedInput`
/// if there are no tracks at all.
pub fn vary(
    tracks: &[Vec<TrackEvent>],
    ppq: u16,
    config: &VariatorConfig,
) -> Result<Vec<Vec<TrackEvent>>> {
    config.validate()?;
    let Some(track0) = tracks.first() else {
        return Err(ScoretickError::MalformedInput(
            "event stream has no tracks".to_string(),
        ));
    };

    let end_tick = max_tick_span(tracks);
    let changes = collect_tempo_changes(track0);

    let tempo_track = match config.domain {
        VariationDomain::Tick => vary_tick_domain(track0, &changes, end_tick, config),
        VariationDomain::Time => {
            let tempo_map = TempoMap::from_tempo_changes(&changes, ppq)?;
            vary_time_domain(track0, &changes, &tempo_map, end_tick, config)?
        }
    };

    let mut out = Vec::with_capacity(tracks.len());
    out.push(tempo_track);
    out.extend(tracks.iter().skip(1).cloned());
    Ok(out)
}

/// Tick-domain rewrite: synthetic samples every `spacing` ticks after the
/// last emitted event.
fn vary_tick_domain(
    track0: &[TrackEvent],
    changes: &[(u64, u32)],
    end_tick: u64,
    config: &VariatorConfig,
) -> Vec<TrackEvent> {
    let spacing = config.spacing.round() as u64;
    let mut out = Vec::with_capacity(track0.len());
    let mut cum_tick = 0u64;
    let mut last_emit = 0u64;

    for ev in track0 {
        cum_tick += ev.delta_ticks;

        while last_emit + spacing <= cum_tick {
            let sample = last_emit + spacing;
            if sample == cum_tick && ev.kind.is_tempo() {
                // The rewritten original event covers this tick; a synthetic
                // one here would duplicate it.
                break;
            }
            let tempo = varied_tempo(
                changes,
                sample,
                sine_factor(config.period, config.amplitude, sample as f64),
            );
            out.push(TrackEvent::new(
                sample - last_emit,
                EventKind::TempoChange {
                    microseconds_per_quarter: tempo,
                },
            ));
            last_emit = sample;
        }

        out.push(reemit(ev, cum_tick - last_emit, || {
            sine_factor(config.period, config.amplitude, cum_tick as f64)
        }));
        last_emit = cum_tick;
    }

    pad_to(&mut out, cum_tick, end_tick);
    out
}

/// Time-domain rewrite: synthetic samples at multiples of `spacing` seconds,
/// translated to ticks through the pre-variation tempo map. A sample is only
/// emitted when its tick falls strictly inside the current event's remaining
/// span; a sample on or past the event's tick is deferred to the next
/// iteration, which avoids zero-length deltas.
fn vary_time_domain(
    track0: &[TrackEvent],
    changes: &[(u64, u32)],
    tempo_map: &TempoMap,
    end_tick: u64,
    config: &VariatorConfig,
) -> Result<Vec<TrackEvent>> {
    let mut out = Vec::with_capacity(track0.len());
    let mut cum_tick = 0u64;
    let mut last_emit = 0u64;
    let mut sample_index = 1u64;

    for ev in track0 {
        cum_tick += ev.delta_ticks;

        loop {
            let sample_time = sample_index as f64 * config.spacing;
            let sample_tick = tempo_map.time_to_tick(sample_time)?;
            if sample_tick >= cum_tick {
                break;
            }
            sample_index += 1;
            if sample_tick <= last_emit {
                // Degenerate sample that would land on an already-emitted
                // tick; drop it.
                continue;
            }
            let tempo = varied_tempo(
                changes,
                sample_tick,
                sine_factor(config.period, config.amplitude, sample_time),
            );
            out.push(TrackEvent::new(
                sample_tick - last_emit,
                EventKind::TempoChange {
                    microseconds_per_quarter: tempo,
                },
            ));
            last_emit = sample_tick;
        }

        let event_time = tempo_map.tick_to_time(cum_tick)?;
        out.push(reemit(ev, cum_tick - last_emit, || {
            sine_factor(config.period, config.amplitude, event_time)
        }));
        last_emit = cum_tick;
    }

    pad_to(&mut out, cum_tick, end_tick);
    Ok(out)
}

/// Re-emit an original event with its delta adjusted for any synthetic
/// events inserted before it; tempo-change events get the varied value.
fn reemit(ev: &TrackEvent, delta: u64, factor: impl FnOnce() -> f64) -> TrackEvent {
    let kind = match ev.kind {
        EventKind::TempoChange {
            microseconds_per_quarter,
        } => EventKind::TempoChange {
            microseconds_per_quarter: ((microseconds_per_quarter as f64 / factor()) as u32)
                .max(1),
        },
        kind => kind,
    };
    TrackEvent::new(delta, kind)
}

/// Extend the tempo track with a no-op event so its span reaches the longest
/// track in the file.
fn pad_to(track: &mut Vec<TrackEvent>, cum_tick: u64, end_tick: u64) {
    if cum_tick < end_tick {
        track.push(TrackEvent::new(end_tick - cum_tick, EventKind::Other));
    }
}
