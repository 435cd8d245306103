//! Credit-based flow control bookkeeping shared by the VC and crossbar
//! schedulers. Grounded on
//! `examples/original_source/src/architecture/CrossbarScheduler.h`'s
//! `initCredits`/`incrementCredit`/`decrementCredit`/`getCreditCount` API —
//! every allocator that grants access to a downstream buffer implements
//! [`CreditWatcher`] over its own per-vc credit table.

use crate::error::{MeridianError, Result};

/// Per-vc credit counters. Increment happens asynchronously (a credit
/// message arrives from downstream); decrement happens synchronously the
/// same cycle a grant is used, per spec §3's credit-accounting invariant.
pub trait CreditWatcher {
    fn init_credits(&mut self, vc_idx: u32, credits: u32);
    fn increment_credit(&mut self, vc_idx: u32) -> Result<()>;
    fn decrement_credit(&mut self, vc_idx: u32) -> Result<()>;
    fn credit_count(&self, vc_idx: u32) -> u32;
}

/// A straightforward `Vec<u32>`-backed credit table, reusable by both
/// schedulers instead of duplicating the bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct CreditTable {
    component_name: String,
    maximums: Vec<u32>,
    counts: Vec<u32>,
}

impl CreditTable {
    pub fn new(component_name: impl Into<String>, num_vcs: usize) -> Self {
        CreditTable {
            component_name: component_name.into(),
            maximums: vec![0; num_vcs],
            counts: vec![0; num_vcs],
        }
    }
}

impl CreditWatcher for CreditTable {
    fn init_credits(&mut self, vc_idx: u32, credits: u32) {
        self.maximums[vc_idx as usize] = credits;
        self.counts[vc_idx as usize] = credits;
    }

    fn increment_credit(&mut self, vc_idx: u32) -> Result<()> {
        let idx = vc_idx as usize;
        if self.counts[idx] >= self.maximums[idx] {
            return Err(MeridianError::Invariant {
                component: self.component_name.clone(),
                message: format!("credit overflow on vc {vc_idx}"),
            });
        }
        self.counts[idx] += 1;
        Ok(())
    }

    fn decrement_credit(&mut self, vc_idx: u32) -> Result<()> {
        let idx = vc_idx as usize;
        if self.counts[idx] == 0 {
            return Err(MeridianError::NegativeCredit {
                component: self.component_name.clone(),
                vc_idx,
            });
        }
        self.counts[idx] -= 1;
        Ok(())
    }

    fn credit_count(&self, vc_idx: u32) -> u32 {
        self.counts[vc_idx as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrement_below_zero_is_an_error() {
        let mut t = CreditTable::new("x", 1);
        t.init_credits(0, 0);
        assert!(t.decrement_credit(0).is_err());
    }

    #[test]
    fn increment_above_max_is_an_error() {
        let mut t = CreditTable::new("x", 1);
        t.init_credits(0, 1);
        assert!(t.increment_credit(0).is_err());
    }

    #[test]
    fn round_trips_within_bounds() {
        let mut t = CreditTable::new("x", 1);
        t.init_credits(0, 4);
        t.decrement_credit(0).unwrap();
        t.decrement_credit(0).unwrap();
        assert_eq!(t.credit_count(0), 2);
        t.increment_credit(0).unwrap();
        assert_eq!(t.credit_count(0), 3);
    }
}
