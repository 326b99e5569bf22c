use std::time::Duration;

use log::{debug, info, trace};

use crate::core::cancel::CancelToken;
use crate::core::clock::ReplayClock;
use crate::game::combo::ComboState;
use crate::game::diagnostics::{Diagnostic, Stage};
use crate::game::event::Event;
use crate::game::judgment::JudgmentCounts;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);
// Linger after the declared duration once every event is out.
pub const DEFAULT_END_GRACE_S: f64 = 0.5;
// Runaway guard: stop past 2x duration and past duration + this, events or not.
pub const DEFAULT_RUNAWAY_MARGIN_S: f64 = 10.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EngineSettings {
    pub poll_interval: Duration,
    pub end_grace_s: f64,
    pub runaway_margin_s: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            end_grace_s: DEFAULT_END_GRACE_S,
            runaway_margin_s: DEFAULT_RUNAWAY_MARGIN_S,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EnginePhase {
    Idle,
    Running,
    Finished,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Nothing to replay; the loop was never entered.
    NoEvents,
    /// Every event dispatched and the clock passed duration + grace.
    EventsAndDuration,
    /// Every event dispatched and the declared duration is not positive.
    NonPositiveDuration,
    /// Clock ran far past the declared duration.
    Runaway,
    Cancelled,
}

impl StopReason {
    pub const fn describe(self) -> &'static str {
        match self {
            Self::NoEvents => "No input events",
            Self::EventsAndDuration => "Reached end of input events and duration",
            Self::NonPositiveDuration => "Reached end of input events (duration <= 0)",
            Self::Runaway => "Real time significantly exceeds replay duration, stopping",
            Self::Cancelled => "Replay cancelled",
        }
    }
}

/// One dispatched event together with the streak around it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DispatchRecord {
    pub event: Event,
    pub combo_before: u32,
    pub combo_after: u32,
    pub max_combo: u32,
}

#[derive(Clone, Debug)]
pub struct ReplayOutcome {
    pub combo: ComboState,
    pub counts: JudgmentCounts,
    pub records: Vec<DispatchRecord>,
    pub event_count: usize,
    pub elapsed_s: f64,
    pub stop_reason: StopReason,
    pub diagnostics: Vec<Diagnostic>,
}

/// Real-time dispatcher for a sorted event list.
///
/// The engine owns the events for the duration of a replay and is consumed
/// by [`ReplayEngine::run`]; it cannot be replayed twice.
pub struct ReplayEngine {
    events: Vec<Event>,
    duration: f64,
    settings: EngineSettings,
    phase: EnginePhase,
    next: usize,
    combo: ComboState,
    counts: JudgmentCounts,
    records: Vec<DispatchRecord>,
    diagnostics: Vec<Diagnostic>,
}

impl ReplayEngine {
    /// `events` must already be in dispatch order (see `event::normalize`).
    pub fn new(events: Vec<Event>, duration: f64, settings: EngineSettings) -> Self {
        debug_assert!(
            events
                .windows(2)
                .all(|w| w[0].time < w[1].time || (w[0].time == w[1].time && w[0].index < w[1].index)),
            "events must be sorted by time then index"
        );
        let records = Vec::with_capacity(events.len());
        Self {
            events,
            duration,
            settings,
            phase: EnginePhase::Idle,
            next: 0,
            combo: ComboState::default(),
            counts: JudgmentCounts::default(),
            records,
            diagnostics: Vec::new(),
        }
    }

    fn transition(&mut self, next: EnginePhase) {
        debug!("Engine phase {:?} -> {next:?}", self.phase);
        self.phase = next;
    }

    #[inline(always)]
    fn all_dispatched(&self) -> bool {
        self.next >= self.events.len()
    }

    fn dispatch_due<F>(&mut self, elapsed: f64, on_dispatch: &mut F)
    where
        F: FnMut(&DispatchRecord),
    {
        while let Some(&event) = self.events.get(self.next) {
            if event.time > elapsed {
                break;
            }
            let judgment = event.judgment;
            let combo_before = self.combo.apply(judgment.combo_effect());
            self.counts.record(judgment);
            if !judgment.is_recognized() {
                self.diagnostics.push(Diagnostic::at(
                    Stage::Dispatch,
                    event.index,
                    format!("unrecognized judgment code {}; combo unaffected", judgment.code()),
                ));
            }
            let record = DispatchRecord {
                event,
                combo_before,
                combo_after: self.combo.current,
                max_combo: self.combo.max,
            };
            on_dispatch(&record);
            self.records.push(record);
            self.next += 1;
        }
    }

    fn stop_condition(&self, elapsed: f64) -> Option<StopReason> {
        let d = self.duration;
        if self.all_dispatched() {
            if elapsed > d + self.settings.end_grace_s {
                return Some(StopReason::EventsAndDuration);
            }
            if d <= 0.0 {
                return Some(StopReason::NonPositiveDuration);
            }
        }
        if elapsed > d * 2.0 && elapsed > d + self.settings.runaway_margin_s {
            return Some(StopReason::Runaway);
        }
        None
    }

    /// Runs the replay to completion against `clock`.
    ///
    /// Each iteration samples the clock, dispatches every due event in order,
    /// then checks the stop conditions before pausing for the poll interval.
    /// `on_dispatch` sees each event as it is released.
    pub fn run<C, F>(mut self, clock: &mut C, cancel: &CancelToken, mut on_dispatch: F) -> ReplayOutcome
    where
        C: ReplayClock,
        F: FnMut(&DispatchRecord),
    {
        clock.start();
        self.transition(EnginePhase::Running);
        info!(
            "Replay started: {} events, duration {:.2}s",
            self.events.len(),
            self.duration
        );

        let stop_reason = if self.events.is_empty() {
            StopReason::NoEvents
        } else {
            loop {
                if cancel.is_cancelled() {
                    break StopReason::Cancelled;
                }
                let elapsed = clock.elapsed_s();
                self.dispatch_due(elapsed, &mut on_dispatch);
                if let Some(reason) = self.stop_condition(elapsed) {
                    debug!("Stop condition {reason:?} at {elapsed:.3}s");
                    break reason;
                }
                trace!("poll at {elapsed:.4}s, {} pending", self.events.len() - self.next);
                clock.pause(self.settings.poll_interval);
            }
        };

        self.transition(EnginePhase::Finished);
        let elapsed_s = clock.elapsed_s();
        info!(
            "Replay finished ({}): {}/{} dispatched, max combo {}",
            stop_reason.describe(),
            self.next,
            self.events.len(),
            self.combo.max
        );

        ReplayOutcome {
            combo: self.combo,
            counts: self.counts,
            records: self.records,
            event_count: self.events.len(),
            elapsed_s,
            stop_reason,
            diagnostics: self.diagnostics,
        }
    }
}
