//! The crossbar traversal stage and the ejector that hands delivered flits
//! off to an interface. Grounded on `architecture/Crossbar.h` (a pure
//! combinational NxM switch, one flit per input per cycle) and
//! `router/inputoutputqueued/Ejector.h` (one flit per cycle to the
//! downstream interface, receive-time stamping, tail-triggered delivery
//! notification).

use crate::flit::Flit;
use crate::time::VTime;

/// A combinational crossbar: at most one flit traverses per input port per
/// cycle, routed to the output port the switch allocator already granted.
#[derive(Debug, Default)]
pub struct Crossbar {
    num_inputs: usize,
    num_outputs: usize,
}

impl Crossbar {
    pub fn new(num_inputs: usize, num_outputs: usize) -> Self {
        Crossbar { num_inputs, num_outputs }
    }

    /// Move `flit` from `input` to `output`. Returns `Err` if either index
    /// is out of range — a configuration bug, not a runtime condition.
    pub fn traverse(&self, input: usize, output: usize, flit: Flit) -> Result<Flit, &'static str> {
        if input >= self.num_inputs {
            return Err("crossbar input out of range");
        }
        if output >= self.num_outputs {
            return Err("crossbar output out of range");
        }
        Ok(flit)
    }
}

/// Delivers flits from the last router hop to the destination interface,
/// enforcing one flit per cycle and stamping receive time.
#[derive(Debug, Default)]
pub struct Ejector {
    last_send: Option<VTime>,
}

impl Ejector {
    pub fn new() -> Self {
        Ejector { last_send: None }
    }

    /// Attempt to eject `flit` at `now`. Returns `None` (reject) if a flit
    /// was already ejected this exact tick.
    pub fn eject(&mut self, mut flit: Flit, now: VTime) -> Option<Flit> {
        if self.last_send == Some(now) {
            return None;
        }
        self.last_send = Some(now);
        flit.receive_time = Some(now);
        Some(flit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossbar_rejects_out_of_range_ports() {
        let xbar = Crossbar::new(2, 2);
        assert!(xbar.traverse(5, 0, Flit::new(0, true, true)).is_err());
        assert!(xbar.traverse(0, 5, Flit::new(0, true, true)).is_err());
        assert!(xbar.traverse(0, 0, Flit::new(0, true, true)).is_ok());
    }

    #[test]
    fn ejector_allows_one_flit_per_cycle() {
        let mut ej = Ejector::new();
        let now = VTime::new(4, 0);
        assert!(ej.eject(Flit::new(0, true, true), now).is_some());
        assert!(ej.eject(Flit::new(1, true, true), now).is_none());
        assert!(ej.eject(Flit::new(1, true, true), now.next_epsilon()).is_some());
    }

    #[test]
    fn ejector_stamps_receive_time() {
        let mut ej = Ejector::new();
        let now = VTime::new(9, 2);
        let f = ej.eject(Flit::new(0, true, true), now).unwrap();
        assert_eq!(f.receive_time, Some(now));
    }
}
