use std::io::{self, Write};

use log::warn;

use crate::core::cancel::CancelToken;
use crate::core::clock::ReplayClock;
use crate::game::delta::decode_delta;
use crate::game::diagnostics::{self, Diagnostic};
use crate::game::engine::{EngineSettings, ReplayEngine};
use crate::game::event::{Event, normalize};
use crate::game::replay::RawReplayRecord;
use crate::game::summary::{self, ReplaySummary};

#[derive(Debug, Default)]
pub struct Prepared {
    pub events: Vec<Event>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Decode and normalize a record into dispatch-ready events.
pub fn prepare(record: &RawReplayRecord) -> Prepared {
    let decoded = decode_delta(&record.inputs.time);
    let normalized = normalize(
        &decoded.times,
        &record.inputs.judgment,
        &record.inputs.accuracy,
    );
    let mut diagnostics = decoded.diagnostics;
    diagnostics.extend(normalized.diagnostics);
    Prepared {
        events: normalized.events,
        diagnostics,
    }
}

#[derive(Debug)]
pub struct SessionReport {
    pub summary: ReplaySummary,
    pub diagnostics: Vec<Diagnostic>,
}

/// Replays `record` against `clock`, writing the live table and the final
/// summary to `out`. Diagnostics from every stage are logged as they are
/// produced and returned with the summary.
pub fn play<C, W>(
    record: &RawReplayRecord,
    settings: EngineSettings,
    clock: &mut C,
    cancel: &CancelToken,
    out: &mut W,
) -> io::Result<SessionReport>
where
    C: ReplayClock,
    W: Write,
{
    let prepared = prepare(record);
    diagnostics::log_all(&prepared.diagnostics);
    let mut all_diagnostics = prepared.diagnostics;

    if prepared.events.is_empty() {
        writeln!(out, "{}", summary::no_events_header(record.duration))?;
    } else {
        writeln!(out, "{}", summary::run_header(record.duration))?;
    }

    let engine = ReplayEngine::new(prepared.events, record.duration, settings);
    let mut write_err: Option<io::Error> = None;
    let abort = cancel.clone();
    let outcome = engine.run(clock, cancel, |r| {
        if write_err.is_none()
            && let Err(e) = writeln!(out, "{}", summary::dispatch_line(r))
        {
            // Nobody is reading anymore; stop on the next poll.
            abort.cancel();
            write_err = Some(e);
        }
    });
    if let Some(e) = write_err {
        warn!("Replay output failed after {} dispatches: {e}", outcome.records.len());
        return Err(e);
    }

    diagnostics::log_all(&outcome.diagnostics);
    all_diagnostics.extend(outcome.diagnostics.iter().cloned());

    let report = ReplaySummary::new(&outcome, record.duration, record.result.as_ref());
    writeln!(out, "\n{}", summary::render_summary(&report))?;
    out.flush()?;

    Ok(SessionReport {
        summary: report,
        diagnostics: all_diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::{play, prepare};
    use crate::core::cancel::CancelToken;
    use crate::core::clock::VirtualClock;
    use crate::game::diagnostics::Stage;
    use crate::game::engine::{EngineSettings, StopReason};
    use crate::core::clock::ReplayClock;
    use crate::game::replay::{RawReplayRecord, parse_replay};
    use std::io::{self, Write};
    use std::time::Duration;

    // Accepts headers, refuses the first table row, like a closed pipe.
    struct ClosedAfterHeader;

    impl Write for ClosedAfterHeader {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if buf.first().is_some_and(u8::is_ascii_digit) {
                return Err(io::Error::from(io::ErrorKind::BrokenPipe));
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn record(text: &str) -> RawReplayRecord {
        parse_replay(text).expect("test record should parse").record
    }

    fn run(rec: &RawReplayRecord) -> (super::SessionReport, String) {
        let settings = EngineSettings {
            poll_interval: Duration::from_millis(5),
            ..EngineSettings::default()
        };
        let mut clock = VirtualClock::new();
        let mut out = Vec::new();
        let report = play(rec, settings, &mut clock, &CancelToken::new(), &mut out)
            .expect("writing to a Vec cannot fail");
        (report, String::from_utf8(out).expect("output is utf-8"))
    }

    #[test]
    fn prepare_collects_decode_and_normalize_diagnostics() {
        let rec = record(
            r#"{ "inputs": { "time": [0.1, "bad", 0.1, 0.1], "judgment": [1, 1, 1, 1], "accuracy": [0, 0, 0, 0] }, "duration": 1 }"#,
        );
        let prepared = prepare(&rec);
        assert_eq!(prepared.events.len(), 3);
        let stages: Vec<_> = prepared.diagnostics.iter().map(|d| d.stage).collect();
        assert_eq!(stages, vec![Stage::Decode, Stage::Normalize]);
    }

    #[test]
    fn full_replay_prints_table_and_summary() {
        let rec = record(
            r#"{
                "inputs": {
                    "time": [0.1, 0.1, 0.1, 0.1, 0.1, 0.1],
                    "judgment": [1, 1, 0, 2, 2, 2],
                    "accuracy": [0.01, 0.02, 0.2, -0.01, 0.0, 0.03]
                },
                "duration": 0.8,
                "result": { "combo": 3, "accuracy": 900000 }
            }"#,
        );
        let (report, text) = run(&rec);
        assert_eq!(report.summary.max_combo, 3);
        assert_eq!(report.summary.stop_reason, StopReason::EventsAndDuration);
        assert!(report.diagnostics.is_empty());

        let table_rows = text
            .lines()
            .filter(|l| l.starts_with(|c: char| c.is_ascii_digit()))
            .count();
        assert_eq!(table_rows, 6);
        assert!(text.contains("\"combo\": 3"));
        assert!(text.contains("Max Combo (Live Calc): 3"));
    }

    #[test]
    fn all_empty_arrays_give_an_immediate_summary() {
        let rec = record(r#"{ "inputs": { "time": [], "judgment": [], "accuracy": [] }, "duration": 42 }"#);
        let (report, text) = run(&rec);
        assert_eq!(report.summary.stop_reason, StopReason::NoEvents);
        assert_eq!(report.summary.max_combo, 0);
        assert_eq!(report.summary.elapsed_s, 0.0);
        assert!(text.contains("--- Replay (Duration: 42.00s) ---"));
        assert!(!text.contains("Idx |"), "no dispatch table for an empty replay");
        assert!(text.contains("No final result block found in replay data."));
    }

    #[test]
    fn unknown_codes_surface_as_dispatch_diagnostics() {
        let rec = record(r#"{ "inputs": { "time": [0, 0], "judgment": [1, 9], "accuracy": [0, 0] }, "duration": 0 }"#);
        let (report, text) = run(&rec);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].stage, Stage::Dispatch);
        assert!(text.contains("Unknown"));
        assert_eq!(report.summary.max_combo, 1);
    }

    #[test]
    fn failed_output_stops_the_replay_early() {
        let rec = record(
            r#"{ "inputs": { "time": [0.1, 0.1, 0.1], "judgment": [1, 1, 1], "accuracy": [0, 0, 0] }, "duration": 300 }"#,
        );
        let settings = EngineSettings {
            poll_interval: Duration::from_millis(5),
            ..EngineSettings::default()
        };
        let mut clock = VirtualClock::new();
        let cancel = CancelToken::new();
        let err = play(&rec, settings, &mut clock, &cancel, &mut ClosedAfterHeader)
            .expect_err("a closed output should fail the session");
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(cancel.is_cancelled());
        assert!(
            clock.elapsed_s() < 0.2,
            "replay kept running for {}s after output failed",
            clock.elapsed_s()
        );
    }
}
