use serde_json::Value;

use crate::game::diagnostics::{Diagnostic, Stage};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Decoded {
    /// Absolute times in seconds, one per accepted delta.
    pub times: Vec<f64>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parses one delta as seconds. Accepts JSON numbers and numeric strings;
/// rejects everything else, including non-finite results.
#[inline(always)]
fn delta_seconds(v: &Value) -> Option<f64> {
    let parsed = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|x| x.is_finite())
}

/// Turns a delta-encoded series into a running sum.
///
/// Malformed entries are skipped with one diagnostic each and contribute
/// nothing to the sum, so later values are still offset correctly relative
/// to the valid ones.
pub fn decode_delta(deltas: &[Value]) -> Decoded {
    let mut out = Decoded {
        times: Vec::with_capacity(deltas.len()),
        diagnostics: Vec::new(),
    };
    let mut acc = 0.0_f64;

    for (i, raw) in deltas.iter().enumerate() {
        let Some(d) = delta_seconds(raw) else {
            out.diagnostics.push(Diagnostic::at(
                Stage::Decode,
                i,
                format!("could not convert delta value {raw} to a number; skipping"),
            ));
            continue;
        };
        acc += d;
        out.times.push(acc);
    }

    out
}
