use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::game::diagnostics::{Diagnostic, Stage};

/// Opaque result payload, re-emitted as-is with its key order.
pub type ResultPayload = Map<String, Value>;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ReplayInputs {
    /// Delta-encoded seconds; numbers or numeric strings.
    pub time: Vec<Value>,
    pub judgment: Vec<i64>,
    pub accuracy: Vec<f64>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RawReplayRecord {
    pub inputs: ReplayInputs,
    pub duration: f64,
    #[serde(default)]
    pub result: Option<ResultPayload>,
}

// Exported bundles nest the record under "replay" with the result alongside.
#[derive(Deserialize)]
struct ReplayEnvelope {
    replay: RawReplayRecord,
    #[serde(default)]
    result: Option<ResultPayload>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("replay file '{}' not found", .0.display())]
    NotFound(PathBuf),
    #[error("error reading '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("document is not a replay record: {0}")]
    Shape(#[source] serde_json::Error),
    #[error("expected a replay object or a list of them, found {0}")]
    UnexpectedRoot(&'static str),
    #[error("no replay records found in the list")]
    EmptyList,
}

#[derive(Debug)]
pub struct LoadedReplay {
    pub record: RawReplayRecord,
    pub diagnostics: Vec<Diagnostic>,
}

const fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn record_from_object(v: Value) -> Result<RawReplayRecord, LoadError> {
    let is_envelope = v
        .as_object()
        .is_some_and(|o| o.contains_key("replay") && !o.contains_key("inputs"));
    if is_envelope {
        let env: ReplayEnvelope = serde_json::from_value(v).map_err(LoadError::Shape)?;
        let mut record = env.replay;
        if env.result.is_some() {
            record.result = env.result;
        }
        return Ok(record);
    }
    serde_json::from_value(v).map_err(LoadError::Shape)
}

/// Parses a replay document: one record, a non-empty list of records (only
/// the first is used), or an exported `{ "replay": .., "result": .. }` bundle.
pub fn parse_replay(text: &str) -> Result<LoadedReplay, LoadError> {
    let root: Value = serde_json::from_str(text).map_err(LoadError::Json)?;
    let mut diagnostics = Vec::new();

    let record = match root {
        Value::Array(items) => {
            let total = items.len();
            let Some(first) = items.into_iter().next() else {
                return Err(LoadError::EmptyList);
            };
            if total > 1 {
                diagnostics.push(Diagnostic::new(
                    Stage::Load,
                    format!("{total} replay records found; using the first, ignoring {}", total - 1),
                ));
            }
            record_from_object(first)?
        }
        obj @ Value::Object(_) => record_from_object(obj)?,
        other => return Err(LoadError::UnexpectedRoot(kind_name(&other))),
    };

    Ok(LoadedReplay {
        record,
        diagnostics,
    })
}

pub fn load_replay(path: &Path) -> Result<LoadedReplay, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound(path.to_path_buf())
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    let loaded = parse_replay(&text)?;
    info!(
        "Loaded replay '{}' ({} time deltas, duration {:.2}s)",
        path.display(),
        loaded.record.inputs.time.len(),
        loaded.record.duration
    );
    Ok(loaded)
}
