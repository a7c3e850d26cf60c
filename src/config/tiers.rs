/// A lock period offered at stake time. The APY is a display label only;
/// the real rate is whatever `percentInterest` the contract stores per position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockTier {
    pub days: u64,
    pub apy_percent: u32,
}

pub const LOCK_TIERS: [LockTier; 4] = [
    LockTier { days: 0, apy_percent: 7 },
    LockTier { days: 30, apy_percent: 8 },
    LockTier { days: 60, apy_percent: 9 },
    LockTier { days: 90, apy_percent: 12 },
];

impl LockTier {
    pub fn from_days(days: u64) -> Option<LockTier> {
        LOCK_TIERS.iter().copied().find(|tier| tier.days == days)
    }

    pub fn is_flexible(&self) -> bool {
        self.days == 0
    }

    /// Selector label, e.g. "Locked (30 Days) - 8% APY"
    pub fn label(&self) -> String {
        let kind = if self.is_flexible() { "Flexible" } else { "Locked" };
        format!("{} ({} Days) - {}% APY", kind, self.days, self.apy_percent)
    }
}
