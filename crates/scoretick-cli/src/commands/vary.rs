//! Vary command implementation
//!
//! Applies sine-wave tempo variation to a MIDI file and writes a new file
//! with the same notes at the same ticks under the varied tempo track.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;

use scoretick_core::{vary, VariationDomain, VariatorConfig};

use crate::midi;

/// Run the vary command
///
/// # Arguments
/// * `midi_path` - Path to the input MIDI file
/// * `output` - Output path for the varied MIDI file
/// * `domain` - Axis the sine is sampled along ("tick" or "time")
/// * `period` - Sine period, in ticks or seconds
/// * `amplitude` - Sine amplitude in octaves of tempo
/// * `spacing` - Spacing between synthetic tempo events
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(
    midi_path: &str,
    output: &str,
    domain: &str,
    period: f64,
    amplitude: f64,
    spacing: f64,
) -> Result<ExitCode> {
    let domain = domain.parse::<VariationDomain>()?;

    println!("{} {}", "Reading:".cyan().bold(), midi_path);
    let (ppq, tracks) = midi::read_midi(Path::new(midi_path))?;

    let config = VariatorConfig {
        domain,
        period,
        amplitude,
        spacing,
    };
    let varied = vary(&tracks, ppq, &config)?;
    let tempo_events = varied
        .first()
        .map(|t| t.iter().filter(|ev| ev.kind.is_tempo()).count())
        .unwrap_or(0);
    println!(
        "{} {} tempo events in varied track",
        "Varied:".cyan().bold(),
        tempo_events
    );

    midi::write_varied(Path::new(midi_path), Path::new(output), &varied)?;
    println!("{} Wrote {}", "SUCCESS".green().bold(), output);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_rejects_unknown_domain() {
        let err = run("piece.mid", "varied.mid", "beats", 400.0, 1.0, 100.0).unwrap_err();
        assert!(err.to_string().contains("beats"));
    }

    #[test]
    fn test_run_reports_missing_input() {
        let err = run(
            "/nonexistent/piece.mid",
            "varied.mid",
            "tick",
            400.0,
            1.0,
            100.0,
        )
        .unwrap_err();
        assert!(err.to_string().contains("piece.mid"));
    }
}
