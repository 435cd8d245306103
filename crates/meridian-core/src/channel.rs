//! A single point-to-point link carrying at most one flit and one credit
//! per cycle in each direction. Grounded on the channel contracts implied by
//! `types/FlitSender.h`/`FlitReceiver.h`/`CreditSender.h`/`CreditReceiver.h`
//! and on `strata-transport::channel`-style utilization bookkeeping (ported
//! from `stats` counters in the teacher).

use crate::flit::{Credit, Flit};
use crate::time::{Clock, ClockPeriods, VTime};
use std::collections::VecDeque;

/// One in-flight flit plus the time it was sent, used to enforce the
/// channel's fixed wire latency.
#[derive(Debug)]
struct InFlightFlit {
    flit: Flit,
    arrival: VTime,
}

#[derive(Debug)]
struct InFlightCredit {
    credit: Credit,
    arrival: VTime,
}

/// A channel between two devices (router-router or router-interface).
/// `latency` is the number of cycles a flit takes to cross.
#[derive(Debug)]
pub struct Channel {
    pub name: String,
    pub latency: u32,
    periods: ClockPeriods,
    flits_in_flight: VecDeque<InFlightFlit>,
    credits_in_flight: VecDeque<InFlightCredit>,
    last_flit_send: Option<VTime>,
    last_credit_send: Option<VTime>,
    utilization_window: VecDeque<bool>,
}

impl Channel {
    pub fn new(name: impl Into<String>, latency: u32) -> Self {
        Self::with_periods(name, latency, ClockPeriods::default())
    }

    pub fn with_periods(name: impl Into<String>, latency: u32, periods: ClockPeriods) -> Self {
        Channel {
            name: name.into(),
            latency,
            periods,
            flits_in_flight: VecDeque::new(),
            credits_in_flight: VecDeque::new(),
            last_flit_send: None,
            last_credit_send: None,
            utilization_window: VecDeque::new(),
        }
    }

    /// Send `flit` at `now`, arriving at `now + latency`. Returns `false`
    /// (single-flit-per-cycle assurance violated) if a flit was already
    /// sent this exact tick.
    pub fn send_flit(&mut self, flit: Flit, now: VTime) -> bool {
        if self.last_flit_send == Some(now) {
            return false;
        }
        self.last_flit_send = Some(now);
        let arrival = now.future_cycle(Clock::Channel, &self.periods, self.latency as u64);
        self.flits_in_flight.push_back(InFlightFlit { flit, arrival });
        self.utilization_window.push_back(true);
        true
    }

    pub fn send_credit(&mut self, credit: Credit, now: VTime) -> bool {
        if self.last_credit_send == Some(now) {
            return false;
        }
        self.last_credit_send = Some(now);
        let arrival = now.future_cycle(Clock::Channel, &self.periods, self.latency as u64);
        self.credits_in_flight.push_back(InFlightCredit { credit, arrival });
        true
    }

    /// Pop a flit that has finished crossing as of `now`, if any, and stamp
    /// its receive time.
    pub fn receive_flit(&mut self, now: VTime) -> Option<Flit> {
        if matches!(self.flits_in_flight.front(), Some(f) if f.arrival <= now) {
            let mut in_flight = self.flits_in_flight.pop_front().unwrap();
            in_flight.flit.receive_time = Some(now);
            Some(in_flight.flit)
        } else {
            None
        }
    }

    pub fn receive_credit(&mut self, now: VTime) -> Option<Credit> {
        if matches!(self.credits_in_flight.front(), Some(c) if c.arrival <= now) {
            Some(self.credits_in_flight.pop_front().unwrap().credit)
        } else {
            None
        }
    }

    /// Fraction of the last `window` cycles in which a flit was sent.
    pub fn utilization(&mut self, window: usize) -> f64 {
        while self.utilization_window.len() > window {
            self.utilization_window.pop_front();
        }
        if self.utilization_window.is_empty() {
            0.0
        } else {
            self.utilization_window.iter().filter(|b| **b).count() as f64
                / self.utilization_window.len() as f64
        }
    }

    pub fn tick_idle(&mut self, window: usize) {
        self.utilization_window.push_back(false);
        while self.utilization_window.len() > window {
            self.utilization_window.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::VTime;

    #[test]
    fn flit_arrives_after_latency() {
        let mut ch = Channel::new("ch0", 3);
        let f = Flit::new(0, true, true);
        assert!(ch.send_flit(f, VTime::new(0, 0)));
        assert!(ch.receive_flit(VTime::new(2, 0)).is_none());
        let recv = ch.receive_flit(VTime::new(3, 0));
        assert!(recv.is_some());
        assert_eq!(recv.unwrap().receive_time, Some(VTime::new(3, 0)));
    }

    #[test]
    fn only_one_flit_per_cycle() {
        let mut ch = Channel::new("ch0", 1);
        assert!(ch.send_flit(Flit::new(0, true, true), VTime::new(0, 0)));
        assert!(!ch.send_flit(Flit::new(1, true, true), VTime::new(0, 0)));
        assert!(ch.send_flit(Flit::new(1, true, true), VTime::new(0, 1)));
    }

    #[test]
    fn utilization_windows() {
        let mut ch = Channel::new("ch0", 1);
        ch.send_flit(Flit::new(0, true, true), VTime::new(0, 0));
        ch.tick_idle(4);
        ch.tick_idle(4);
        ch.tick_idle(4);
        assert!((ch.utilization(4) - 0.25).abs() < 1e-9);
    }
}
