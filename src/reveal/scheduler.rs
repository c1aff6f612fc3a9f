//! Cooperative reveal task.
//!
//! The scheduler watches a single "latest target" slot and ticks on a fixed
//! cadence while the display trails it, so bursty network arrival never
//! shows up as bursty text. When caught up it parks until the target
//! changes. A drain message carries the authoritative final text, which is
//! flushed immediately.

use crate::reveal::pacing::{RevealPacing, RevealState};
use tokio::sync::{oneshot, watch};
use tokio::time::{self, MissedTickBehavior};

/// How a reveal task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// The final text was flushed to the consumer.
    Flushed,
    /// The producer went away without a final text (error or cancellation).
    Abandoned,
}

/// Paces consumer-visible text growth for one exchange.
#[derive(Debug)]
pub struct RevealScheduler {
    pacing: RevealPacing,
    state: RevealState,
}

impl RevealScheduler {
    /// Creates a scheduler with the given pacing.
    #[must_use]
    pub fn new(pacing: RevealPacing) -> Self {
        Self {
            pacing,
            state: RevealState::new(),
        }
    }

    /// Runs until drained or abandoned.
    ///
    /// `targets` carries the latest best answer; `drain` carries the final
    /// text. Dropping the drain sender without sending ends the task without
    /// a flush.
    pub async fn run<F>(
        mut self,
        mut targets: watch::Receiver<String>,
        mut drain: oneshot::Receiver<String>,
        on_update: &mut F,
    ) -> RevealOutcome
    where
        F: FnMut(&str) + ?Sized,
    {
        let mut ticker = time::interval(self.pacing.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut targets_open = true;

        loop {
            let behind = self.state.is_behind(&targets.borrow());

            tokio::select! {
                biased;

                received = &mut drain => {
                    return match received {
                        Ok(final_text) => {
                            on_update(self.state.flush(&final_text));
                            tracing::trace!(graphemes = self.state.revealed(), "reveal flushed");
                            RevealOutcome::Flushed
                        }
                        Err(_) => {
                            tracing::debug!("reveal abandoned before final text");
                            RevealOutcome::Abandoned
                        }
                    };
                }

                _ = ticker.tick(), if behind => {
                    let target = targets.borrow_and_update().clone();
                    if let Some(shown) = self.state.step(&target, &self.pacing) {
                        on_update(shown);
                    }
                }

                changed = targets.changed(), if targets_open && !behind => {
                    if changed.is_err() {
                        targets_open = false;
                    } else {
                        ticker.reset();
                    }
                }
            }
        }
    }
}
