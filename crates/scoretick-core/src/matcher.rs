//! Cross-file frame matching: propagate score positions from a reference
//! frame sequence to another rendering of the same piece.
//!
//! Two renderings of one piece share a tick timeline (tempo variation moves
//! wall-clock time, never ticks), so the reference frame whose middle tick is
//! numerically closest to a target frame's middle tick carries the right
//! score position. Each target frame is matched independently; the reference
//! sequence is read-only throughout.

use crate::error::{Result, ScoretickError};
use crate::frame::Frame;

/// Index of the reference frame whose `middle_tick` is closest to `tick`.
/// Exact-distance ties resolve to the earlier (lower-tick) candidate.
fn closest_by_middle_tick(reference: &[Frame], tick: u64) -> usize {
    let idx = reference.partition_point(|f| f.middle_tick < tick);
    if idx == 0 {
        return 0;
    }
    if idx == reference.len() {
        return reference.len() - 1;
    }
    let before = &reference[idx - 1];
    let after = &reference[idx];
    if after.middle_tick - tick < tick - before.middle_tick {
        idx
    } else {
        idx - 1
    }
}

/// Copy `(measure, beat)` from the nearest-tick reference frame into every
/// target frame and point its `ref_frame` at the match.
///
/// # Errors
/// `MalformedInput` if the reference sequence is empty; there is nothing to
/// match against.
pub fn match_frames(reference: &[Frame], target: &mut [Frame]) -> Result<()> {
    if reference.is_empty() {
        return Err(ScoretickError::MalformedInput(
            "reference frame sequence is empty".to_string(),
        ));
    }
    for frame in target.iter_mut() {
        let matched = &reference[closest_by_middle_tick(reference, frame.middle_tick)];
        frame.measure = matched.measure;
        frame.beat = matched.beat;
        frame.ref_frame = Some(matched.num);
    }
    Ok(())
}
