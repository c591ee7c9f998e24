//! Match command implementation
//!
//! Propagates score positions from a reference frame file onto a target
//! frame file by nearest-middle-tick lookup.

use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;

use scoretick_core::{load_frames, match_frames, save_frames};

/// Run the match command
///
/// # Arguments
/// * `reference` - Path to the annotated reference frame file
/// * `target` - Path to the frame file to annotate
/// * `output` - Output path for the annotated target frames
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(reference: &str, target: &str, output: &str) -> Result<ExitCode> {
    let reference_frames = load_frames(reference)
        .with_context(|| format!("Failed to load reference frames: {reference}"))?;
    let mut target_frames = load_frames(target)
        .with_context(|| format!("Failed to load target frames: {target}"))?;

    match_frames(&reference_frames, &mut target_frames)?;
    println!(
        "{} {} target frames against {} reference frames",
        "Matched:".cyan().bold(),
        target_frames.len(),
        reference_frames.len()
    );

    save_frames(&target_frames, output)
        .with_context(|| format!("Failed to write frames to: {output}"))?;
    println!("{} Wrote {}", "SUCCESS".green().bold(), output);
    Ok(ExitCode::SUCCESS)
}
