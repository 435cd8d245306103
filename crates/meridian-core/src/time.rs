//! Virtual time: a `(tick, epsilon)` pair ordering all events in the
//! simulation. `epsilon` breaks ties between events at the same tick so that
//! intra-cycle causality (e.g. a credit update must be visible before the
//! allocator that consumes it runs) is explicit rather than accidental.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the clock domains an event can be scheduled against. Components
/// convert a "N cycles from now" request into absolute [`VTime`] through a
/// [`ClockPeriods`] table, since the period itself is a per-simulation
/// config value (spec's `cycle_time_channel`/`cycle_time_router`/
/// `cycle_time_interface`) rather than a constant of the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Clock {
    Channel,
    Router,
    Interface,
}

/// Cycle length in ticks for each clock domain, sourced from
/// `simulator.cycle_time_*` in the simulation config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockPeriods {
    pub channel: u64,
    pub router: u64,
    pub interface: u64,
}

impl ClockPeriods {
    pub fn new(channel: u64, router: u64, interface: u64) -> Self {
        ClockPeriods { channel, router, interface }
    }

    pub fn period(&self, clock: Clock) -> u64 {
        match clock {
            Clock::Channel => self.channel.max(1),
            Clock::Router => self.router.max(1),
            Clock::Interface => self.interface.max(1),
        }
    }
}

impl Default for ClockPeriods {
    fn default() -> Self {
        ClockPeriods { channel: 1, router: 1, interface: 1 }
    }
}

/// A point in virtual time: `(tick, epsilon)`, ordered lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VTime {
    pub tick: u64,
    pub epsilon: u8,
}

impl VTime {
    pub const ZERO: VTime = VTime { tick: 0, epsilon: 0 };

    pub fn new(tick: u64, epsilon: u8) -> Self {
        VTime { tick, epsilon }
    }

    /// The same tick, one epsilon later. Used to schedule a same-cycle
    /// follow-on reaction (e.g. a credit update reacting to a decrement).
    pub fn next_epsilon(self) -> VTime {
        VTime {
            tick: self.tick,
            epsilon: self.epsilon + 1,
        }
    }

    /// `cycles` cycles of `clock` in the future, epsilon reset to 0. Rounds
    /// up to `clock`'s next cycle boundary strictly after `self.tick` (a
    /// tick already on a boundary still advances a full period, since
    /// "future" cycles are counted from the next edge, not the current
    /// one), then adds `cycles - 1` more full periods.
    pub fn future_cycle(self, clock: Clock, periods: &ClockPeriods, cycles: u64) -> VTime {
        if cycles == 0 {
            return VTime { tick: self.tick, epsilon: 0 };
        }
        let period = periods.period(clock);
        let remainder = self.tick % period;
        let boundary = if remainder == 0 { self.tick + period } else { self.tick + (period - remainder) };
        VTime {
            tick: boundary + period * (cycles - 1),
            epsilon: 0,
        }
    }

    /// Whether this time falls exactly on a cycle boundary of `clock`.
    pub fn is_cycle(self, clock: Clock, periods: &ClockPeriods) -> bool {
        self.tick % periods.period(clock) == 0
    }
}

impl fmt::Display for VTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.tick, self.epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_lexicographic() {
        assert!(VTime::new(1, 0) < VTime::new(1, 1));
        assert!(VTime::new(1, 5) < VTime::new(2, 0));
        assert_eq!(VTime::new(3, 2), VTime::new(3, 2));
    }

    #[test]
    fn future_cycle_resets_epsilon() {
        let t = VTime::new(10, 3);
        let f = t.future_cycle(Clock::Router, &ClockPeriods::default(), 5);
        assert_eq!(f, VTime::new(15, 0));
    }

    #[test]
    fn future_cycle_rounds_up_to_next_boundary() {
        let periods = ClockPeriods::new(4, 1, 1);
        // tick 10 is mid-cycle (period 4, boundaries at 8, 12, 16...):
        // 1 cycle from here lands on the next boundary, 12.
        assert_eq!(VTime::new(10, 0).future_cycle(Clock::Channel, &periods, 1), VTime::new(12, 0));
        // already on a boundary: the next cycle is still one full period away.
        assert_eq!(VTime::new(8, 0).future_cycle(Clock::Channel, &periods, 1), VTime::new(12, 0));
        // n cycles from a boundary: round up (no-op here) plus (n-1) more periods.
        assert_eq!(VTime::new(8, 0).future_cycle(Clock::Channel, &periods, 3), VTime::new(20, 0));
    }

    #[test]
    fn is_cycle_checks_configured_period() {
        let periods = ClockPeriods::new(4, 1, 1);
        assert!(VTime::new(8, 0).is_cycle(Clock::Channel, &periods));
        assert!(!VTime::new(10, 0).is_cycle(Clock::Channel, &periods));
    }

    #[test]
    fn next_epsilon_keeps_tick() {
        let t = VTime::new(7, 2);
        assert_eq!(t.next_epsilon(), VTime::new(7, 3));
    }
}
