//! Analysis frames: uniform time sampling, and columnar persistence.
//!
//! A [`Frame`] is a uniformly time-sampled analysis window annotated with its
//! tick span and, after alignment, its score position. Frame sequences are
//! persisted as a record of arrays, one array per field, so cross-matching
//! tools can load them as a unit.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoretickError};
use crate::tempo::TempoMap;

/// One analysis frame. `measure` and `beat` stay unset until the aligner
/// fills them in; `ref_frame` points at the best-matching frame of another
/// rendering of the same piece once the matcher has run.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Index of this frame within its sequence.
    pub num: usize,
    /// Absolute tick at the frame start.
    pub start_tick: u64,
    /// Wall-clock time at the frame start, in seconds.
    pub start_time: f64,
    /// Absolute tick at the frame midpoint.
    pub middle_tick: u64,
    /// Wall-clock time at the frame midpoint, in seconds.
    pub middle_time: f64,
    /// Measure containing the frame midpoint (fractional once interpolated).
    pub measure: Option<f64>,
    /// 1-based fractional beat at the frame midpoint.
    pub beat: Option<f64>,
    /// Index of the corresponding frame in a reference sequence.
    pub ref_frame: Option<usize>,
}

/// Generate the frame skeleton for a piece: uniform time steps at `fps`
/// frames per second, each converted to its tick position through the tempo
/// map. Measure and beat are left unset for the aligner.
///
/// The sequence is a pure function of the tempo map, the piece length in
/// ticks, and the frame rate, so regenerating it yields an identical result.
/// It is finite, bounded by `ceil(max_time * fps)` frames.
///
/// # Errors
/// `Configuration` if `fps` is not strictly positive.
pub fn frame_skeleton(tempo_map: &TempoMap, max_tick: u64, fps: f64) -> Result<Vec<Frame>> {
    if !(fps > 0.0) {
        return Err(ScoretickError::Configuration(format!(
            "frame rate must be positive, got {fps}"
        )));
    }
    let hop = 1.0 / fps;
    let half_hop = hop / 2.0;
    let max_time = tempo_map.tick_to_time(max_tick)?;

    let mut frames = Vec::with_capacity((max_time * fps).ceil() as usize);
    let mut i = 0usize;
    loop {
        let t = i as f64 * hop;
        if t >= max_time {
            break;
        }
        frames.push(Frame {
            num: i,
            start_tick: tempo_map.time_to_tick(t)?,
            start_time: t,
            middle_tick: tempo_map.time_to_tick(t + half_hop)?,
            middle_time: t + half_hop,
            measure: None,
            beat: None,
            ref_frame: Some(i),
        });
        i += 1;
    }
    Ok(frames)
}

/// Columnar record-of-arrays serialization of a frame sequence. All arrays
/// have equal length; floating-point fields round-trip exactly because no
/// recomputation happens on the stored values.
#[derive(Debug, Serialize, Deserialize)]
struct FrameColumns {
    num: Vec<usize>,
    start_tick: Vec<u64>,
    start_time: Vec<f64>,
    middle_tick: Vec<u64>,
    middle_time: Vec<f64>,
    measure: Vec<Option<f64>>,
    beat: Vec<Option<f64>>,
    ref_frame: Vec<Option<usize>>,
}

impl FrameColumns {
    fn from_frames(frames: &[Frame]) -> Self {
        Self {
            num: frames.iter().map(|f| f.num).collect(),
            start_tick: frames.iter().map(|f| f.start_tick).collect(),
            start_time: frames.iter().map(|f| f.start_time).collect(),
            middle_tick: frames.iter().map(|f| f.middle_tick).collect(),
            middle_time: frames.iter().map(|f| f.middle_time).collect(),
            measure: frames.iter().map(|f| f.measure).collect(),
            beat: frames.iter().map(|f| f.beat).collect(),
            ref_frame: frames.iter().map(|f| f.ref_frame).collect(),
        }
    }

    fn into_frames(self) -> Result<Vec<Frame>> {
        let len = self.num.len();
        let lengths = [
            self.start_tick.len(),
            self.start_time.len(),
            self.middle_tick.len(),
            self.middle_time.len(),
            self.measure.len(),
            self.beat.len(),
            self.ref_frame.len(),
        ];
        if lengths.iter().any(|&l| l != len) {
            return Err(ScoretickError::MalformedInput(
                "frame columns have unequal lengths".to_string(),
            ));
        }
        let mut frames = Vec::with_capacity(len);
        for i in 0..len {
            frames.push(Frame {
                num: self.num[i],
                start_tick: self.start_tick[i],
                start_time: self.start_time[i],
                middle_tick: self.middle_tick[i],
                middle_time: self.middle_time[i],
                measure: self.measure[i],
                beat: self.beat[i],
                ref_frame: self.ref_frame[i],
            });
        }
        Ok(frames)
    }
}

/// Save a frame sequence to `path` in the columnar JSON format.
///
/// # Errors
/// `MalformedInput` on an empty sequence (nothing to save); IO and JSON
/// errors pass through.
pub fn save_frames<P: AsRef<Path>>(frames: &[Frame], path: P) -> Result<()> {
    if frames.is_empty() {
        return Err(ScoretickError::MalformedInput(
            "no frames to save".to_string(),
        ));
    }
    let columns = FrameColumns::from_frames(frames);
    let json = serde_json::to_string(&columns)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load a frame sequence previously written by [`save_frames`].
///
/// # Errors
/// `InputNotFound` if the file does not exist; `MalformedInput` if the
/// columns disagree in length; JSON errors pass through.
pub fn load_frames<P: AsRef<Path>>(path: P) -> Result<Vec<Frame>> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ScoretickError::InputNotFound(path.display().to_string())
        } else {
            ScoretickError::IoError(e)
        }
    })?;
    let columns: FrameColumns = serde_json::from_str(&json)?;
    columns.into_frames()
}
