/// How many batches a single animation tick may process.
///
/// One unit is one batch. Counting batches instead of milliseconds keeps
/// load interleaving identical between a browser host and tests.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameBudget {
    remaining_units: u32,
    spent_units: u32,
}

impl FrameBudget {
    pub fn new(units: u32) -> Self {
        Self {
            remaining_units: units,
            spent_units: 0,
        }
    }

    /// Drain everything in one tick.
    pub fn unlimited() -> Self {
        Self::new(u32::MAX)
    }

    pub fn remaining_units(&self) -> u32 {
        self.remaining_units
    }

    /// Units consumed since construction.
    pub fn spent_units(&self) -> u32 {
        self.spent_units
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_units == 0
    }

    /// Attempts to consume `units` from the budget.
    ///
    /// Returns `true` if the budget had enough remaining units.
    pub fn try_consume(&mut self, units: u32) -> bool {
        if self.remaining_units < units {
            return false;
        }
        self.remaining_units -= units;
        self.spent_units += units;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::FrameBudget;

    #[test]
    fn refuses_batches_past_the_allowance() {
        let mut tick = FrameBudget::new(3);
        assert!(tick.try_consume(2));
        assert!(!tick.try_consume(2));
        assert_eq!((tick.remaining_units(), tick.spent_units()), (1, 2));
        assert!(tick.try_consume(1));
        assert!(tick.is_exhausted());
        assert!(!tick.try_consume(1));
    }

    #[test]
    fn unlimited_outlasts_any_load() {
        let mut tick = FrameBudget::unlimited();
        for _ in 0..10_000 {
            assert!(tick.try_consume(1));
        }
        assert_eq!(tick.spent_units(), 10_000);
    }
}
