//! meter/types.rs
//! Cost meter interface consumed by the codec.
//!
//! Design notes:
//! - The codec never retries a charge and never charges speculatively.
//! - A refused charge aborts the in-progress codec call before any byte moves.

use thiserror::Error;

/// A charge the meter refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("out of budget: charge of {requested} with {remaining} remaining")]
pub struct OutOfBudget {
    pub requested: u64,
    pub remaining: u64,
}

/// Energy accounting collaborator.
///
/// Implementations deduct `cost` from their budget, or fail without deducting
/// anything when the running total would exceed the allotted budget.
pub trait CostMeter {
    fn charge(&mut self, cost: u64) -> Result<(), OutOfBudget>;
}

impl<M: CostMeter + ?Sized> CostMeter for &mut M {
    fn charge(&mut self, cost: u64) -> Result<(), OutOfBudget> {
        (**self).charge(cost)
    }
}

impl<M: CostMeter + ?Sized> CostMeter for Box<M> {
    fn charge(&mut self, cost: u64) -> Result<(), OutOfBudget> {
        (**self).charge(cost)
    }
}
