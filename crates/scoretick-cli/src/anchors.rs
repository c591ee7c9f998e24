//! Anchor file loading.
//!
//! Anchor lists are exported by score-authoring tooling as a JSON object
//! with a `time-positions` array of `[seconds, measure, beat]` triples,
//! ordered by time.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use scoretick_core::ScoreAnchor;

#[derive(Debug, Deserialize)]
struct AnchorFile {
    #[serde(rename = "time-positions")]
    time_positions: Vec<(f64, f64, f64)>,
}

/// Load a score-anchor file.
///
/// # Errors
/// Fails on a missing or unparseable file, or when anchor times are not
/// non-decreasing (the aligner walks anchors with a forward-only cursor).
pub fn load_anchors(path: &Path) -> Result<Vec<ScoreAnchor>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read anchor file: {}", path.display()))?;
    let file: AnchorFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse anchor file: {}", path.display()))?;

    let anchors: Vec<ScoreAnchor> = file
        .time_positions
        .into_iter()
        .map(|(time, measure, beat)| ScoreAnchor {
            time,
            measure,
            beat,
        })
        .collect();

    if anchors.windows(2).any(|w| w[0].time > w[1].time) {
        bail!(
            "anchor times must be non-decreasing in {}",
            path.display()
        );
    }
    Ok(anchors)
}
