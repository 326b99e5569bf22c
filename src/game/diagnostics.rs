use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Load,
    Decode,
    Normalize,
    Dispatch,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Decode => "decode",
            Self::Normalize => "normalize",
            Self::Dispatch => "dispatch",
        }
    }
}

/// A recoverable anomaly noticed while preparing or replaying a record.
///
/// Stages return these next to their output instead of aborting, so callers
/// decide whether to log them, count them or ignore them.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub stage: Stage,
    pub index: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            index: None,
            message: message.into(),
        }
    }

    pub fn at(stage: Stage, index: usize, message: impl Into<String>) -> Self {
        Self {
            stage,
            index: Some(index),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "[{}] #{i}: {}", self.stage.as_str(), self.message),
            None => write!(f, "[{}] {}", self.stage.as_str(), self.message),
        }
    }
}

/// Forward every diagnostic to the `log` facade at warn level.
pub fn log_all(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        log::warn!("{d}");
    }
}

#[cfg(test)]
mod tests {
    use super::{Diagnostic, Stage};

    #[test]
    fn display_includes_stage_and_index() {
        let d = Diagnostic::at(Stage::Decode, 4, "bad delta");
        assert_eq!(d.to_string(), "[decode] #4: bad delta");
        let d = Diagnostic::new(Stage::Normalize, "truncated");
        assert_eq!(d.to_string(), "[normalize] truncated");
    }
}
