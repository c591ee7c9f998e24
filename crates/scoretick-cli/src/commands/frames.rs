//! Frames command implementation
//!
//! Generates the frame skeleton for a MIDI file and, when an anchor file is
//! given, aligns every frame to a score position.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;

use scoretick_core::event::max_tick_span;
use scoretick_core::{align_frames, frame_skeleton, save_frames, TempoMap, TimeSignatureMap};

use crate::{anchors, midi};

/// Run the frames command
///
/// # Arguments
/// * `midi_path` - Path to the input MIDI file
/// * `anchors_path` - Optional path to a `time-positions` anchor file
/// * `output` - Output path for the columnar frame JSON
/// * `fps` - Frame rate in frames per second
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(
    midi_path: &str,
    anchors_path: Option<&str>,
    output: &str,
    fps: f64,
) -> Result<ExitCode> {
    println!("{} {}", "Reading:".cyan().bold(), midi_path);
    let (ppq, tracks) = midi::read_midi(Path::new(midi_path))?;

    let track0 = tracks.first().map(Vec::as_slice).unwrap_or(&[]);
    let tempo_map = TempoMap::from_track(track0, ppq)?;
    let max_tick = max_tick_span(&tracks);

    let mut frames = frame_skeleton(&tempo_map, max_tick, fps)?;
    println!(
        "{} {} frames at {} fps",
        "Generated:".cyan().bold(),
        frames.len(),
        fps
    );

    if let Some(path) = anchors_path {
        let anchor_list = anchors::load_anchors(Path::new(path))?;
        let meter = TimeSignatureMap::from_tracks(&tracks, ppq);
        align_frames(&mut frames, &anchor_list, &meter);
        println!(
            "{} {} anchors applied",
            "Aligned:".cyan().bold(),
            anchor_list.len()
        );
    }

    save_frames(&frames, output)
        .with_context(|| format!("Failed to write frames to: {output}"))?;
    println!("{} Wrote {}", "SUCCESS".green().bold(), output);
    Ok(ExitCode::SUCCESS)
}
