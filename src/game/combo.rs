use crate::game::judgment::ComboEffect;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ComboState {
    pub current: u32,
    pub max: u32,
}

impl ComboState {
    /// Applies one judgment effect and returns the streak before it.
    /// `max` never decreases and always stays >= `current`.
    #[inline(always)]
    pub fn apply(&mut self, effect: ComboEffect) -> u32 {
        let before = self.current;
        match effect {
            ComboEffect::Reset => self.current = 0,
            ComboEffect::Increment => self.current = self.current.saturating_add(1),
            ComboEffect::Unchanged => {}
        }
        self.max = self.max.max(self.current);
        before
    }
}
