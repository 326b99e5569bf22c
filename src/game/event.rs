use crate::game::diagnostics::{Diagnostic, Stage};
use crate::game::judgment::Judgment;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Event {
    /// Position in the source arrays, kept for tracing after sorting.
    pub index: usize,
    /// Seconds from replay start.
    pub time: f64,
    pub judgment: Judgment,
    pub accuracy: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Normalized {
    pub events: Vec<Event>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Zips the three parallel input arrays into time-ordered events.
///
/// Arrays of different length are cut down to the shortest one. The sort is
/// stable and breaks ties on the source index, so simultaneous inputs keep
/// their recorded order.
pub fn normalize(times: &[f64], judgments: &[i64], accuracies: &[f64]) -> Normalized {
    let min_len = times.len().min(judgments.len()).min(accuracies.len());
    let mut diagnostics = Vec::new();

    if times.len() != judgments.len() || times.len() != accuracies.len() {
        diagnostics.push(Diagnostic::new(
            Stage::Normalize,
            format!(
                "mismatched lengths (time: {}, judgment: {}, accuracy: {}); truncating to {min_len}",
                times.len(),
                judgments.len(),
                accuracies.len()
            ),
        ));
    }

    let mut events: Vec<Event> = times[..min_len]
        .iter()
        .zip(&judgments[..min_len])
        .zip(&accuracies[..min_len])
        .enumerate()
        .map(|(index, ((&time, &code), &accuracy))| Event {
            index,
            time,
            judgment: Judgment::from_code(code),
            accuracy,
        })
        .collect();

    events.sort_by(|a, b| a.time.total_cmp(&b.time).then(a.index.cmp(&b.index)));

    Normalized {
        events,
        diagnostics,
    }
}
