//! scoretick CLI - tick/time/score-position tooling for MIDI files
//!
//! This binary provides commands for generating score-aligned analysis
//! frames, applying sine-wave tempo variation, and matching frame files
//! across renderings of the same piece.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use scoretick_cli::commands;

/// scoretick - MIDI tick/time/score-position conversion toolkit
#[derive(Parser)]
#[command(name = "scoretick")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate score-aligned analysis frames from a MIDI file
    Frames {
        /// Path to the input MIDI file
        #[arg(short, long)]
        midi: String,

        /// Path to a score anchor file (JSON with a time-positions array)
        #[arg(short, long)]
        anchors: Option<String>,

        /// Output path for the columnar frame JSON
        #[arg(short, long)]
        output: String,

        /// Frame rate in frames per second
        #[arg(long, default_value = "86.1238")]
        fps: f64,
    },

    /// Apply sine-wave tempo variation to a MIDI file
    Vary {
        /// Path to the input MIDI file
        #[arg(short, long)]
        midi: String,

        /// Output path for the varied MIDI file
        #[arg(short, long)]
        output: String,

        /// Axis the sine is sampled along
        #[arg(long, default_value = "tick", value_parser = ["tick", "time"])]
        domain: String,

        /// Sine period, in ticks (tick domain) or seconds (time domain)
        #[arg(long)]
        period: f64,

        /// Sine amplitude in octaves of tempo (1.0 sweeps half to double)
        #[arg(long, default_value = "1.0")]
        amplitude: f64,

        /// Spacing between synthetic tempo events, in ticks or seconds
        #[arg(long)]
        spacing: f64,
    },

    /// Propagate score positions from a reference frame file to a target
    Match {
        /// Path to the annotated reference frame file
        #[arg(short, long)]
        reference: String,

        /// Path to the frame file to annotate
        #[arg(short, long)]
        target: String,

        /// Output path for the annotated target frames
        #[arg(short, long)]
        output: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Frames {
            midi,
            anchors,
            output,
            fps,
        } => commands::frames::run(&midi, anchors.as_deref(), &output, fps),
        Commands::Vary {
            midi,
            output,
            domain,
            period,
            amplitude,
            spacing,
        } => commands::vary::run(&midi, &output, &domain, period, amplitude, spacing),
        Commands::Match {
            reference,
            target,
            output,
        } => commands::match_frames::run(&reference, &target, &output),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
