//! MIDI container I/O.
//!
//! All standard-MIDI-file handling lives here; the core only ever sees
//! per-track [`TrackEvent`] streams. Reading converts every container event
//! to its core kind. Writing a varied file rebuilds track 0 from the varied
//! stream while reusing the original container events for everything that is
//! not a tempo change, so controller data, program changes and text metas
//! survive the rewrite byte for byte.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use midly::num::{u24, u28};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

use scoretick_core::{EventKind, ScoretickError, TrackEvent};

/// Read a standard MIDI file into `(ppq, tracks)` form.
///
/// # Errors
/// Fails on a missing or unparseable file. SMPTE-timecode files are rejected
/// as malformed input: tick<->time conversion assumes metrical timing.
pub fn read_midi(path: &Path) -> Result<(u16, Vec<Vec<TrackEvent>>)> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read MIDI file: {}", path.display()))?;
    let smf = Smf::parse(&bytes)
        .with_context(|| format!("Failed to parse MIDI file: {}", path.display()))?;

    let ppq = match smf.header.timing {
        Timing::Metrical(ticks) => ticks.as_int(),
        Timing::Timecode(..) => {
            return Err(ScoretickError::MalformedInput(format!(
                "SMPTE timecode timing is not supported: {}",
                path.display()
            ))
            .into());
        }
    };

    let tracks = smf
        .tracks
        .iter()
        .map(|track| {
            track
                .iter()
                .map(|ev| TrackEvent::new(ev.delta.as_int() as u64, convert_kind(&ev.kind)))
                .collect()
        })
        .collect();
    Ok((ppq, tracks))
}

fn convert_kind(kind: &TrackEventKind) -> EventKind {
    match kind {
        TrackEventKind::Meta(MetaMessage::Tempo(mspq)) => EventKind::TempoChange {
            microseconds_per_quarter: mspq.as_int(),
        },
        TrackEventKind::Meta(MetaMessage::TimeSignature(numerator, denom_exp, _, _)) => {
            EventKind::TimeSignature {
                numerator: *numerator as u32,
                denominator: 1u32 << denom_exp,
            }
        }
        TrackEventKind::Midi { channel, message } => match message {
            // A note-on with velocity 0 is a release in disguise.
            MidiMessage::NoteOn { key, vel } if vel.as_int() == 0 => EventKind::NoteOff {
                pitch: key.as_int(),
                channel: channel.as_int(),
            },
            MidiMessage::NoteOn { key, vel } => EventKind::NoteOn {
                pitch: key.as_int(),
                channel: channel.as_int(),
                velocity: vel.as_int(),
            },
            MidiMessage::NoteOff { key, .. } => EventKind::NoteOff {
                pitch: key.as_int(),
                channel: channel.as_int(),
            },
            _ => EventKind::Other,
        },
        _ => EventKind::Other,
    }
}

const MAX_DELTA: u64 = 0x0FFF_FFFF;
const MAX_TEMPO: u32 = 0x00FF_FFFF;

/// Whether a container event is consumed by the variator's tempo-track
/// rewrite (tempo metas are replaced; end-of-track is re-appended).
fn replaced_on_rewrite(kind: &TrackEventKind) -> bool {
    matches!(
        kind,
        TrackEventKind::Meta(MetaMessage::Tempo(_)) | TrackEventKind::Meta(MetaMessage::EndOfTrack)
    )
}

/// Write a varied event stream back out as a standard MIDI file.
///
/// The original file at `input` supplies the header and all tracks past
/// track 0 unchanged. Track 0 is rebuilt by pairing the varied stream's
/// non-tempo events, in order, with the original container events they came
/// from; varied tempo changes become fresh tempo metas and the span padding
/// becomes a text meta. A single end-of-track meta is appended last.
pub fn write_varied(input: &Path, output: &Path, varied: &[Vec<TrackEvent>]) -> Result<()> {
    let bytes = fs::read(input)
        .with_context(|| format!("Failed to read MIDI file: {}", input.display()))?;
    let smf = Smf::parse(&bytes)
        .with_context(|| format!("Failed to parse MIDI file: {}", input.display()))?;

    let mut out = Smf::new(smf.header);

    let empty = Vec::new();
    let original = smf.tracks.first().unwrap_or(&empty);
    let mut survivors = original.iter().filter(|ev| !replaced_on_rewrite(&ev.kind));

    let varied_track0 = varied.first().map(Vec::as_slice).unwrap_or(&[]);
    let mut rebuilt = Vec::with_capacity(varied_track0.len() + 1);
    for ev in varied_track0 {
        let kind = match ev.kind {
            EventKind::TempoChange {
                microseconds_per_quarter,
            } => TrackEventKind::Meta(MetaMessage::Tempo(u24::new(
                microseconds_per_quarter.min(MAX_TEMPO),
            ))),
            _ => match survivors.next() {
                Some(orig) => orig.kind,
                // Span padding and the consumed end-of-track have no
                // container counterpart left.
                None => TrackEventKind::Meta(MetaMessage::Text(b"scoretick")),
            },
        };
        rebuilt.push(midly::TrackEvent {
            delta: u28::new(ev.delta_ticks.min(MAX_DELTA) as u32),
            kind,
        });
    }
    rebuilt.push(midly::TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    out.tracks.push(rebuilt);

    for track in smf.tracks.iter().skip(1) {
        out.tracks.push(track.clone());
    }

    out.save(output)
        .with_context(|| format!("Failed to write MIDI file: {}", output.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::num::{u15, u4, u7};
    use midly::{Format, Header};
    use pretty_assertions::assert_eq;
    use scoretick_core::{vary, VariationDomain, VariatorConfig};

    fn meta(delta: u32, message: MetaMessage<'static>) -> midly::TrackEvent<'static> {
        midly::TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Meta(message),
        }
    }

    fn note_on(delta: u32, key: u8, vel: u8) -> midly::TrackEvent<'static> {
        midly::TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOn {
                    key: u7::new(key),
                    vel: u7::new(vel),
                },
            },
        }
    }

    fn sample_smf() -> Smf<'static> {
        let mut smf = Smf::new(Header::new(
            Format::Parallel,
            Timing::Metrical(u15::new(480)),
        ));
        smf.tracks.push(vec![
            meta(0, MetaMessage::Tempo(u24::new(500_000))),
            meta(0, MetaMessage::TimeSignature(3, 2, 24, 8)),
            note_on(480, 60, 100),
            note_on(480, 60, 0),
            meta(0, MetaMessage::EndOfTrack),
        ]);
        smf.tracks.push(vec![
            note_on(0, 64, 90),
            note_on(1200, 64, 0),
            meta(0, MetaMessage::EndOfTrack),
        ]);
        smf
    }

    fn write_sample(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("sample.mid");
        sample_smf().save(&path).unwrap();
        path
    }

    #[test]
    fn test_read_midi_converts_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path());

        let (ppq, tracks) = read_midi(&path).unwrap();
        assert_eq!(ppq, 480);
        assert_eq!(tracks.len(), 2);
        assert_eq!(
            tracks[0][0].kind,
            EventKind::TempoChange {
                microseconds_per_quarter: 500_000
            }
        );
        // Denominator is stored as a power-of-two exponent: 2 -> 4.
        assert_eq!(
            tracks[0][1].kind,
            EventKind::TimeSignature {
                numerator: 3,
                denominator: 4
            }
        );
        assert_eq!(
            tracks[0][2],
            TrackEvent::new(
                480,
                EventKind::NoteOn {
                    pitch: 60,
                    channel: 0,
                    velocity: 100
                }
            )
        );
        // Velocity-0 note-on reads as a release.
        assert_eq!(
            tracks[0][3].kind,
            EventKind::NoteOff {
                pitch: 60,
                channel: 0
            }
        );
        assert_eq!(tracks[0][4].kind, EventKind::Other);
    }

    #[test]
    fn test_read_missing_file_fails() {
        let err = read_midi(Path::new("/nonexistent/file.mid")).unwrap_err();
        assert!(err.to_string().contains("file.mid"));
    }

    #[test]
    fn test_write_varied_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_sample(dir.path());
        let output = dir.path().join("varied.mid");

        let (ppq, tracks) = read_midi(&input).unwrap();
        let config = VariatorConfig {
            domain: VariationDomain::Tick,
            period: 400.0,
            amplitude: 1.0,
            spacing: 100.0,
        };
        let varied = vary(&tracks, ppq, &config).unwrap();
        write_varied(&input, &output, &varied).unwrap();

        let (ppq2, reread) = read_midi(&output).unwrap();
        assert_eq!(ppq2, 480);
        assert_eq!(reread.len(), 2);
        // Second track passes through untouched.
        assert_eq!(reread[1], tracks[1]);

        // Non-tempo events of track 0 keep their absolute ticks.
        let abs = |track: &[TrackEvent]| {
            let mut tick = 0u64;
            let mut out = Vec::new();
            for ev in track {
                tick += ev.delta_ticks;
                if !ev.kind.is_tempo() && ev.kind != EventKind::Other {
                    out.push((tick, ev.kind));
                }
            }
            out
        };
        assert_eq!(abs(&reread[0]), abs(&tracks[0]));

        // Synthetic tempo events landed between the original ones.
        let tempo_count = reread[0].iter().filter(|ev| ev.kind.is_tempo()).count();
        assert!(tempo_count > 1);
    }

    #[test]
    fn test_write_varied_ends_with_single_end_of_track() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_sample(dir.path());
        let output = dir.path().join("varied.mid");

        let (ppq, tracks) = read_midi(&input).unwrap();
        let config = VariatorConfig {
            domain: VariationDomain::Time,
            period: 1.0,
            amplitude: 0.5,
            spacing: 0.25,
        };
        let varied = vary(&tracks, ppq, &config).unwrap();
        write_varied(&input, &output, &varied).unwrap();

        let bytes = fs::read(&output).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        let eot_count = smf.tracks[0]
            .iter()
            .filter(|ev| matches!(ev.kind, TrackEventKind::Meta(MetaMessage::EndOfTrack)))
            .count();
        assert_eq!(eot_count, 1);
        assert!(matches!(
            smf.tracks[0].last().unwrap().kind,
            TrackEventKind::Meta(MetaMessage::EndOfTrack)
        ));
    }
}
