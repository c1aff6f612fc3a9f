//! Paced reveal of the current best answer.
//!
//! Network chunks arrive in bursts; the consumer should see text grow at a
//! steady, readable rate that speeds up when far behind.

pub mod pacing;
pub mod scheduler;

pub use pacing::{
    DEFAULT_BASE_STEP, DEFAULT_CATCH_UP_DIVISOR, DEFAULT_TICK, RevealPacing, RevealState,
};
pub use scheduler::{RevealOutcome, RevealScheduler};
