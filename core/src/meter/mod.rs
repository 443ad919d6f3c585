//! meter/mod.rs
//! Energy accounting: the consumed `CostMeter` interface, reference meters,
//! and the configurable fee schedule.

pub mod types;
pub mod budget;
pub mod schedule;

pub use types::{CostMeter, OutOfBudget};
pub use budget::{BudgetMeter, Unmetered};
pub use schedule::FeeSchedule;
