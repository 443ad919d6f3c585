//! meter/budget.rs
//! Reference meters: a fixed budget and an unmetered sink.

use crate::meter::types::{CostMeter, OutOfBudget};

/// Fixed energy budget with a running total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetMeter {
    limit: u64,
    used: u64,
}

impl BudgetMeter {
    pub fn new(limit: u64) -> Self {
        Self { limit, used: 0 }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn remaining(&self) -> u64 {
        self.limit - self.used
    }
}

impl CostMeter for BudgetMeter {
    fn charge(&mut self, cost: u64) -> Result<(), OutOfBudget> {
        let remaining = self.remaining();
        if cost > remaining {
            return Err(OutOfBudget { requested: cost, remaining });
        }
        self.used += cost;
        Ok(())
    }
}

/// Accepts every charge and only records the total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unmetered {
    pub total: u64,
}

impl CostMeter for Unmetered {
    fn charge(&mut self, cost: u64) -> Result<(), OutOfBudget> {
        self.total = self.total.saturating_add(cost);
        Ok(())
    }
}
