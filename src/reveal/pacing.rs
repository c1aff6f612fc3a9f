//! Reveal pacing and the prefix-advance state machine.
//!
//! [`RevealState`] is pure: it decides what prefix of the current target to
//! show next, given how much is already on screen. The async scheduler only
//! decides *when* to call it.

use crate::io::unicode::{advance_graphemes, grapheme_count};
use std::time::Duration;

/// Default tick interval.
pub const DEFAULT_TICK: Duration = Duration::from_millis(30);

/// Default graphemes revealed per tick.
pub const DEFAULT_BASE_STEP: usize = 2;

/// Default gap size per extra grapheme of catch-up speed.
pub const DEFAULT_CATCH_UP_DIVISOR: usize = 20;

/// How fast text is revealed.
///
/// Each tick reveals `base_step + gap / catch_up_divisor` graphemes, where
/// `gap` is how far the display trails the target. A large backlog therefore
/// clears in a fraction of a second instead of trickling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealPacing {
    /// Time between ticks.
    pub tick: Duration,
    /// Graphemes revealed per tick regardless of backlog.
    pub base_step: usize,
    /// Backlog graphemes per extra grapheme per tick (0 disables catch-up).
    pub catch_up_divisor: usize,
}

impl Default for RevealPacing {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            base_step: DEFAULT_BASE_STEP,
            catch_up_divisor: DEFAULT_CATCH_UP_DIVISOR,
        }
    }
}

impl RevealPacing {
    /// Sets the tick interval.
    #[must_use]
    pub const fn tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Sets the base step.
    #[must_use]
    pub const fn base_step(mut self, step: usize) -> Self {
        self.base_step = step;
        self
    }

    /// Sets the catch-up divisor.
    #[must_use]
    pub const fn catch_up_divisor(mut self, divisor: usize) -> Self {
        self.catch_up_divisor = divisor;
        self
    }

    /// Returns how many graphemes to reveal for a given backlog.
    ///
    /// # Examples
    ///
    /// ```
    /// use reply_normalizer::reveal::RevealPacing;
    ///
    /// let pacing = RevealPacing::default();
    /// assert_eq!(pacing.step_for(5), 2);
    /// assert_eq!(pacing.step_for(400), 22);
    /// ```
    #[must_use]
    pub const fn step_for(&self, gap: usize) -> usize {
        let catch_up = if self.catch_up_divisor == 0 {
            0
        } else {
            gap / self.catch_up_divisor
        };
        let step = self.base_step + catch_up;
        if step == 0 { 1 } else { step }
    }
}

/// What the consumer has been shown so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealState {
    displayed: String,
    revealed: usize,
}

impl RevealState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the text last emitted.
    #[must_use]
    pub fn displayed(&self) -> &str {
        &self.displayed
    }

    /// Returns the number of graphemes revealed.
    #[must_use]
    pub const fn revealed(&self) -> usize {
        self.revealed
    }

    /// True if a [`RevealState::step`] toward `target` would emit.
    ///
    /// A target shorter than what is already shown never counts as behind:
    /// the display holds rather than shrinking.
    #[must_use]
    pub fn is_behind(&self, target: &str) -> bool {
        let total = grapheme_count(target);
        total > self.revealed || (total == self.revealed && self.displayed != target)
    }

    /// Advances toward `target`, returning the new prefix if it changed.
    ///
    /// The emitted text is always a prefix of `target` and never has fewer
    /// graphemes than the previous emission. When the target diverges from
    /// what is shown, the display is re-anchored to the target at the same
    /// position before advancing.
    pub fn step(&mut self, target: &str, pacing: &RevealPacing) -> Option<&str> {
        let total = grapheme_count(target);
        if total < self.revealed {
            return None;
        }

        let gap = total - self.revealed;
        self.revealed += pacing.step_for(gap).min(gap);
        let end = advance_graphemes(target, 0, self.revealed);
        let next = &target[..end];
        if next == self.displayed {
            return None;
        }
        next.clone_into(&mut self.displayed);
        Some(self.displayed.as_str())
    }

    /// Replaces the display with the authoritative text, bypassing pacing.
    pub fn flush(&mut self, text: &str) -> &str {
        text.clone_into(&mut self.displayed);
        self.revealed = grapheme_count(text);
        &self.displayed
    }
}
