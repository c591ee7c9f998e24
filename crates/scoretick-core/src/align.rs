//! Score alignment: merging sparse (time, measure, beat) anchors into a dense
//! per-frame annotation.
//!
//! Anchors come from score-authoring tooling and are authoritative; between
//! anchors the measure/beat of a frame is interpolated from tick counts using
//! the time-signature-aware ticks-per-beat. Repeats in the score are exactly
//! why anchors are needed: tick counting alone cannot recover the notated
//! position once the performance jumps back.

use crate::frame::Frame;
use crate::meter::TimeSignatureMap;

/// A sparse authoritative score-position point, externally supplied and
/// ordered by `time` ascending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreAnchor {
    /// Wall-clock time of the anchor, in seconds.
    pub time: f64,
    /// Measure number at that time.
    pub measure: f64,
    /// 1-based beat within the measure.
    pub beat: f64,
}

/// The "last known" score position threaded through the alignment loop. An
/// explicit accumulator rather than hidden mutable state, so the fold could
/// later be restructured into prefix-scan form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignState {
    pub measure: f64,
    pub beat: f64,
    /// Middle tick of the frame that produced `beat`.
    pub tick: u64,
}

impl Default for AlignState {
    fn default() -> Self {
        Self {
            measure: 0.0,
            beat: 0.0,
            tick: 0,
        }
    }
}

/// The two-pointer merge predicate: does the anchor belong to this frame
/// rather than the next one? True when the anchor's time is at least as close
/// to this frame's middle time as to the next frame's.
pub fn anchor_snaps_here(anchor_time: f64, this_middle: f64, next_middle: f64) -> bool {
    (anchor_time - this_middle).abs() <= (anchor_time - next_middle).abs()
}

/// Assign a measure and beat to every frame.
///
/// Frames and anchors are walked with two independent cursors. Each frame
/// either snaps to the current anchor (when [`anchor_snaps_here`] holds) or
/// inherits the last known measure with a beat interpolated from the tick
/// distance since the last known position. A beat that overflows past
/// `beats_per_measure + 1` wraps to `beat % (beats_per_measure + 1) + 1`
/// without touching the measure number.
///
/// Running out of anchors degrades to pure interpolation; an empty anchor
/// list interpolates everything from the default state.
pub fn align_frames(frames: &mut [Frame], anchors: &[ScoreAnchor], meter: &TimeSignatureMap) {
    let mut state = AlignState::default();
    let mut anchor_idx = 0usize;
    let last = frames.len().saturating_sub(1);

    for idx in 0..frames.len() {
        let next_middle = frames[(idx + 1).min(last)].middle_time;
        let frame = &mut frames[idx];

        let snap = anchors
            .get(anchor_idx)
            .map(|a| anchor_snaps_here(a.time, frame.middle_time, next_middle))
            .unwrap_or(false);

        if snap {
            let anchor = &anchors[anchor_idx];
            frame.measure = Some(anchor.measure);
            frame.beat = Some(anchor.beat);
            state = AlignState {
                measure: anchor.measure,
                beat: anchor.beat,
                tick: frame.middle_tick,
            };
            anchor_idx += 1;
        } else {
            let ticks_per_beat = meter.ticks_per_beat_at(frame.middle_tick) as f64;
            let mut beat =
                state.beat + (frame.middle_tick - state.tick) as f64 / ticks_per_beat;
            let beats_per_measure = meter.beats_per_measure_at(frame.middle_tick) as f64;
            if beat > beats_per_measure + 1.0 {
                beat = beat % (beats_per_measure + 1.0) + 1.0;
            }
            frame.measure = Some(state.measure);
            frame.beat = Some(beat);
            state = AlignState {
                measure: state.measure,
                beat,
                tick: frame.middle_tick,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frame_at(num: usize, middle_tick: u64, middle_time: f64) -> Frame {
        Frame {
            num,
            start_tick: middle_tick.saturating_sub(10),
            start_time: middle_time - 0.01,
            middle_tick,
            middle_time,
            measure: None,
            beat: None,
            ref_frame: Some(num),
        }
    }

    fn default_meter() -> TimeSignatureMap {
        TimeSignatureMap::from_entries(Vec::new(), 480)
    }

    #[test]
    fn test_anchor_snaps_here_predicate() {
        assert!(anchor_snaps_here(1.0, 1.05, 1.2));
        assert!(!anchor_snaps_here(1.0, 0.9, 1.05));
        // Equidistant counts as a snap.
        assert!(anchor_snaps_here(1.0, 0.95, 1.05));
    }

    #[test]
    fn test_single_anchor_snaps_to_closest_frame() {
        let mut frames = vec![
            frame_at(0, 800, 0.9),
            frame_at(1, 960, 1.05),
            frame_at(2, 1120, 1.2),
        ];
        let anchors = vec![ScoreAnchor {
            time: 1.0,
            measure: 5.0,
            beat: 2.0,
        }];
        align_frames(&mut frames, &anchors, &default_meter());

        // Frame 0 interpolates from the default state.
        assert_eq!(frames[0].measure, Some(0.0));
        assert_eq!(frames[0].beat, Some(800.0 / 480.0));
        // Frame 1 is the better match and takes the anchor verbatim.
        assert_eq!(frames[1].measure, Some(5.0));
        assert_eq!(frames[1].beat, Some(2.0));
        // Frame 2 interpolates onward from the anchor.
        assert_eq!(frames[2].measure, Some(5.0));
        assert_eq!(frames[2].beat, Some(2.0 + 160.0 / 480.0));
    }

    #[test]
    fn test_empty_anchor_list_degrades_to_interpolation() {
        let mut frames = vec![frame_at(0, 480, 0.5), frame_at(1, 960, 1.0)];
        align_frames(&mut frames, &[], &default_meter());
        assert_eq!(frames[0].measure, Some(0.0));
        assert_eq!(frames[0].beat, Some(1.0));
        assert_eq!(frames[1].beat, Some(2.0));
    }

    #[test]
    fn test_beat_wrap_does_not_increment_measure() {
        // Regression pin: the wrap rule adjusts the beat without advancing
        // the measure, even though the interpolated position has crossed the
        // bar line.
        let mut frames = vec![
            frame_at(0, 0, 0.0),
            frame_at(1, 2400, 2.5),
            frame_at(2, 2880, 3.0),
        ];
        let anchors = vec![ScoreAnchor {
            time: 0.0,
            measure: 3.0,
            beat: 1.0,
        }];
        align_frames(&mut frames, &anchors, &default_meter());

        // Frame 1: beat 1 + 2400/480 = 6 > 5, wraps to 6 % 5 + 1 = 2.
        assert_eq!(frames[1].beat, Some(2.0));
        assert_eq!(frames[1].measure, Some(3.0));
        // Frame 2 continues from the wrapped state: 2 + 480/480 = 3.
        assert_eq!(frames[2].beat, Some(3.0));
        assert_eq!(frames[2].measure, Some(3.0));
    }

    #[test]
    fn test_interpolation_uses_meter_at_tick() {
        // 6/8 from tick 960: ticks per beat halves to 240.
        let meter = TimeSignatureMap::from_entries(
            vec![crate::meter::TimeSignatureEntry {
                start_tick: 960,
                numerator: 6,
                denominator: 8,
            }],
            480,
        );
        let mut frames = vec![frame_at(0, 960, 1.0), frame_at(1, 1200, 1.25)];
        let anchors = vec![ScoreAnchor {
            time: 1.0,
            measure: 2.0,
            beat: 1.0,
        }];
        align_frames(&mut frames, &anchors, &meter);
        assert_eq!(frames[1].beat, Some(1.0 + 240.0 / 240.0));
    }

    #[test]
    fn test_multiple_anchors_consumed_in_order() {
        let mut frames = vec![
            frame_at(0, 0, 0.05),
            frame_at(1, 480, 0.55),
            frame_at(2, 960, 1.05),
        ];
        let anchors = vec![
            ScoreAnchor {
                time: 0.0,
                measure: 1.0,
                beat: 1.0,
            },
            ScoreAnchor {
                time: 0.5,
                measure: 1.0,
                beat: 2.0,
            },
            ScoreAnchor {
                time: 1.0,
                measure: 1.0,
                beat: 3.0,
            },
        ];
        align_frames(&mut frames, &anchors, &default_meter());
        assert_eq!(frames[0].beat, Some(1.0));
        assert_eq!(frames[1].beat, Some(2.0));
        assert_eq!(frames[2].beat, Some(3.0));
    }
}
