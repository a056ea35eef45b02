//! Score and lives accounting for a single play session.

/// Mutable score and lives counters with guarded mutation operations.
///
/// The economy is owned by the world and threaded through update calls so
/// multiple simulations can run side by side; nothing here is process-global.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Economy {
    score: u32,
    lives: u32,
}

impl Economy {
    /// Creates an economy with the provided starting balances.
    pub(crate) const fn new(score: u32, lives: u32) -> Self {
        Self { score, lives }
    }

    /// Score currently available to the player.
    pub(crate) const fn score(&self) -> u32 {
        self.score
    }

    /// Lives currently remaining.
    pub(crate) const fn lives(&self) -> u32 {
        self.lives
    }

    /// Awards score and returns the new total.
    pub(crate) fn add_score(&mut self, amount: u32) -> u32 {
        self.score = self.score.saturating_add(amount);
        self.score
    }

    /// Deducts `amount` when affordable, leaving the balance untouched on
    /// failure so the score can never underflow.
    pub(crate) fn try_spend(&mut self, amount: u32) -> bool {
        if self.score >= amount {
            self.score -= amount;
            true
        } else {
            false
        }
    }

    /// Deducts one life, clamping at zero, and returns the remainder.
    pub(crate) fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }
}
