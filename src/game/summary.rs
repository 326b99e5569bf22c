use std::fmt::Write as _;

use chrono::{DateTime, Local};
use serde_json::Value;

use crate::game::engine::{DispatchRecord, ReplayOutcome, StopReason};
use crate::game::judgment::JudgmentCounts;
use crate::game::replay::ResultPayload;
use crate::game::timing_stats::{self, TimingStats};

// Recorded scores are out of one million.
const MAX_SCORE: f64 = 1_000_000.0;

/// Terminal report for one replay. Built once, after the engine stops.
#[derive(Clone, Debug)]
pub struct ReplaySummary {
    pub max_combo: u32,
    pub elapsed_s: f64,
    pub duration: f64,
    pub event_count: usize,
    pub dispatched: usize,
    pub counts: JudgmentCounts,
    pub timing: TimingStats,
    pub stop_reason: StopReason,
    pub result: Option<ResultPayload>,
    pub finished_at: DateTime<Local>,
}

impl ReplaySummary {
    pub fn new(outcome: &ReplayOutcome, duration: f64, result: Option<&ResultPayload>) -> Self {
        Self {
            max_combo: outcome.combo.max,
            elapsed_s: outcome.elapsed_s,
            duration,
            event_count: outcome.event_count,
            dispatched: outcome.records.len(),
            counts: outcome.counts,
            timing: timing_stats::compute_accuracy_stats(&outcome.records),
            stop_reason: outcome.stop_reason,
            result: result.cloned(),
            finished_at: Local::now(),
        }
    }
}

/// Percent score from the recorded `result.accuracy`, when it is numeric.
pub fn live_accuracy_percent(result: Option<&ResultPayload>) -> Option<f64> {
    result
        .and_then(|r| r.get("accuracy"))
        .and_then(Value::as_f64)
        .map(|score| score / MAX_SCORE * 100.0)
}

pub fn run_header(duration: f64) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "--- Starting Replay (Duration: {duration:.2}s) ---");
    let _ = writeln!(
        s,
        "Idx | Time    | Judg Value | Judgment | Accuracy | Combo Before | Combo After | Max Combo"
    );
    s.push_str("----|---------|------------|----------|----------|--------------|-------------|-----------");
    s
}

pub fn no_events_header(duration: f64) -> String {
    format!("--- Replay (Duration: {duration:.2}s) ---\n--- No input events ---")
}

#[inline(always)]
pub fn dispatch_line(r: &DispatchRecord) -> String {
    let e = &r.event;
    format!(
        "{:<3} | {:<7.3} | {:<10} | {:<8} | {:+8.4} | {:<12} | {:<11} | {}",
        e.index,
        e.time,
        e.judgment.code(),
        e.judgment.label(),
        e.accuracy,
        r.combo_before,
        r.combo_after,
        r.max_combo
    )
}

pub fn stop_line(reason: StopReason) -> String {
    format!("--- {} ---", reason.describe())
}

fn render_result(out: &mut String, result: Option<&ResultPayload>) {
    let Some(result) = result else {
        out.push_str("No final result block found in replay data.\n");
        return;
    };
    match serde_json::to_string_pretty(result) {
        Ok(pretty) => {
            let _ = writeln!(out, "Final Result (from data):\n{pretty}");
        }
        Err(_) => {
            let _ = writeln!(out, "Final Result (from data): {result:?}");
        }
    }
}

pub fn render_summary(s: &ReplaySummary) -> String {
    let mut out = String::new();
    // The no-events header already says why nothing ran.
    if s.stop_reason != StopReason::NoEvents {
        let _ = writeln!(out, "{}\n", stop_line(s.stop_reason));
    }
    out.push_str("--- Replay Finished ---\n");
    render_result(&mut out, s.result.as_ref());

    match live_accuracy_percent(s.result.as_ref()) {
        Some(pct) => {
            let _ = writeln!(out, "Accuracy (Live Calc): {pct:.4}%");
        }
        None => out.push_str("Accuracy (Live Calc): N/A\n"),
    }

    let c = &s.counts;
    let _ = writeln!(
        out,
        "Judgments: Perfect {} | Great {} | Good {} | Miss {}{}",
        c.perfect,
        c.great,
        c.good,
        c.miss,
        if c.unknown > 0 { format!(" | Unknown {}", c.unknown) } else { String::new() }
    );
    let _ = writeln!(out, "Events Dispatched: {}/{}", s.dispatched, s.event_count);
    let _ = writeln!(out, "Declared Duration: {:.2}s", s.duration);
    if s.timing.count > 0 {
        let t = &s.timing;
        let _ = writeln!(
            out,
            "Timing: mean {:+.2}ms | mean abs {:.2}ms | stddev {:.2}ms | worst {:.2}ms",
            t.mean_ms, t.mean_abs_ms, t.stddev_ms, t.max_abs_ms
        );
    }
    let _ = writeln!(out, "Max Combo (Live Calc): {}", s.max_combo);
    let _ = writeln!(out, "Total Real Time: {:.2}s", s.elapsed_s);
    let _ = write!(out, "Finished At: {}", s.finished_at.format("%Y-%m-%d %H:%M:%S"));
    out
}
