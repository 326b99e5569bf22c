#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Judgment {
    Miss,    // 0
    Perfect, // 1
    Great,   // 2
    Good,    // 3
    Unknown(i64),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ComboEffect {
    Reset,
    Increment,
    Unchanged,
}

impl Judgment {
    #[inline(always)]
    pub const fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Miss,
            1 => Self::Perfect,
            2 => Self::Great,
            3 => Self::Good,
            other => Self::Unknown(other),
        }
    }

    pub const fn code(self) -> i64 {
        match self {
            Self::Miss => 0,
            Self::Perfect => 1,
            Self::Great => 2,
            Self::Good => 3,
            Self::Unknown(c) => c,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Miss => "Miss",
            Self::Perfect => "Perfect",
            Self::Great => "Great",
            Self::Good => "Good",
            Self::Unknown(_) => "Unknown",
        }
    }

    pub const fn is_recognized(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Good breaks the combo here, same as Miss. Recorded replays were scored
    /// that way, so the live reconstruction has to match.
    #[inline(always)]
    pub const fn combo_effect(self) -> ComboEffect {
        match self {
            Self::Miss | Self::Good => ComboEffect::Reset,
            Self::Perfect | Self::Great => ComboEffect::Increment,
            Self::Unknown(_) => ComboEffect::Unchanged,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct JudgmentCounts {
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub miss: u32,
    pub unknown: u32,
}

impl JudgmentCounts {
    pub fn record(&mut self, judgment: Judgment) {
        let slot = match judgment {
            Judgment::Perfect => &mut self.perfect,
            Judgment::Great => &mut self.great,
            Judgment::Good => &mut self.good,
            Judgment::Miss => &mut self.miss,
            Judgment::Unknown(_) => &mut self.unknown,
        };
        *slot = slot.saturating_add(1);
    }
}
