use crate::game::engine::DispatchRecord;
use crate::game::judgment::Judgment;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TimingStats {
    pub mean_abs_ms: f64,
    pub mean_ms: f64,
    pub stddev_ms: f64,
    pub max_abs_ms: f64,
    pub count: usize,
}

/// Signed offsets in milliseconds for events that were actually hit.
/// Misses and unrecognized codes carry no meaningful accuracy.
fn hit_offsets_ms(records: &[DispatchRecord]) -> impl Iterator<Item = f64> + Clone + '_ {
    records
        .iter()
        .map(|r| r.event)
        .filter(|e| e.judgment.is_recognized() && e.judgment != Judgment::Miss)
        .map(|e| e.accuracy * 1000.0)
}

/// Offset statistics over dispatched, non-miss events. Accuracy values are
/// recorded in seconds and reported in milliseconds.
pub fn compute_accuracy_stats(records: &[DispatchRecord]) -> TimingStats {
    let offsets = hit_offsets_ms(records);
    let (count, sum, sum_abs, max_abs_ms) = offsets
        .clone()
        .fold((0usize, 0.0_f64, 0.0_f64, 0.0_f64), |(n, s, sa, m), ms| {
            (n + 1, s + ms, sa + ms.abs(), m.max(ms.abs()))
        });
    if count == 0 {
        return TimingStats::default();
    }

    let n = count as f64;
    let mean_ms = sum / n;
    // Sample deviation; a single hit has no spread.
    let stddev_ms = if count > 1 {
        let var = offsets.map(|ms| (ms - mean_ms).powi(2)).sum::<f64>() / (n - 1.0);
        var.sqrt()
    } else {
        0.0
    };

    TimingStats {
        mean_abs_ms: sum_abs / n,
        mean_ms,
        stddev_ms,
        max_abs_ms,
        count,
    }
}
