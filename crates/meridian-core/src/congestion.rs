//! Congestion sensors: the per-VC or per-port occupancy signal routing
//! algorithms read to make adaptive decisions.
//!
//! Grounded on `examples/original_source/src/congestion/BufferOccupancy.cc`
//! and `PhantomBufferOccupancy.cc`. The original schedules `incrementCredit`/
//! `decrementCredit` as one-epsilon-later events and ages the phantom window
//! through a further scheduled event; here the owning router instead calls
//! [`CongestionSensor::decay_phantom_windows`] once per channel cycle, which
//! keeps the sensor free of a dependency on the event kernel while
//! preserving the windowed-credit-debt computation exactly.

use std::f64;

/// Whether a sensor reports per-VC or averaged per-port status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Vc,
    Port,
}

pub trait CongestionSensor: std::fmt::Debug {
    fn init_credits(&mut self, vc_idx: u32, credits: u32);
    fn increment_credit(&mut self, vc_idx: u32);
    fn decrement_credit(&mut self, vc_idx: u32);
    /// 0.0 (idle) .. 1.0 (full) congestion status for the given output vc
    /// (or its port, depending on configured granularity).
    fn status(&self, num_vcs: u32, output_port: u32, output_vc: u32) -> f64;
}

/// Always reports zero congestion — used when a routing algorithm has no
/// adaptive component.
#[derive(Debug, Clone, Default)]
pub struct NullSensor;

impl CongestionSensor for NullSensor {
    fn init_credits(&mut self, _vc_idx: u32, _credits: u32) {}
    fn increment_credit(&mut self, _vc_idx: u32) {}
    fn decrement_credit(&mut self, _vc_idx: u32) {}
    fn status(&self, _num_vcs: u32, _output_port: u32, _output_vc: u32) -> f64 {
        0.0
    }
}

/// Buffer-occupancy congestion sensor with optional phantom-window
/// extension (an outstanding-credit debt that decays over a window sized by
/// the downstream channel's latency, so a sensor reacts to in-flight
/// credits it hasn't heard back about yet).
#[derive(Debug, Clone)]
pub struct BufferOccupancy {
    granularity: Granularity,
    maximums: Vec<u32>,
    counts: Vec<u32>,
    phantom: Option<PhantomState>,
}

#[derive(Debug, Clone)]
struct PhantomState {
    value_coeff: f64,
    windows: Vec<u32>,
}

impl BufferOccupancy {
    pub fn new(granularity: Granularity, total_vcs: usize) -> Self {
        BufferOccupancy {
            granularity,
            maximums: vec![0; total_vcs],
            counts: vec![0; total_vcs],
            phantom: None,
        }
    }

    pub fn with_phantom(mut self, value_coeff: f64, total_vcs: usize) -> Self {
        self.phantom = Some(PhantomState {
            value_coeff,
            windows: vec![0; total_vcs],
        });
        self
    }

    /// Age the phantom windows down by `elapsed_cycles` worth of decay,
    /// called once per channel cycle by the owning router.
    pub fn decay_phantom_windows(&mut self, vc_idx: u32, window_length: u32) {
        if let Some(phantom) = &mut self.phantom {
            if window_length == 0 {
                return;
            }
            // A window decrements itself once its length has elapsed; the
            // caller is expected to invoke this once per tick so a single
            // decrement per call matches the original's one-shot event.
            if phantom.windows[vc_idx as usize] > 0 {
                phantom.windows[vc_idx as usize] -= 1;
            }
        }
    }

    fn vc_index(&self, num_vcs: u32, port: u32, vc: u32) -> usize {
        (port * num_vcs + vc) as usize
    }

    fn raw_status(&self, vc_idx: usize) -> f64 {
        let max = self.maximums[vc_idx] as f64;
        if max == 0.0 {
            return 0.0;
        }
        let status = match &self.phantom {
            None => (max - self.counts[vc_idx] as f64) / max,
            Some(p) => {
                (max - self.counts[vc_idx] as f64 - p.windows[vc_idx] as f64 * p.value_coeff) / max
            }
        };
        status.clamp(0.0, 1.0)
    }
}

impl CongestionSensor for BufferOccupancy {
    fn init_credits(&mut self, vc_idx: u32, credits: u32) {
        self.maximums[vc_idx as usize] += credits;
        self.counts[vc_idx as usize] += credits;
    }

    fn increment_credit(&mut self, vc_idx: u32) {
        debug_assert!(self.counts[vc_idx as usize] < self.maximums[vc_idx as usize]);
        self.counts[vc_idx as usize] += 1;
    }

    fn decrement_credit(&mut self, vc_idx: u32) {
        debug_assert!(self.counts[vc_idx as usize] > 0);
        self.counts[vc_idx as usize] -= 1;
        if let Some(phantom) = &mut self.phantom {
            phantom.windows[vc_idx as usize] += 1;
        }
    }

    fn status(&self, num_vcs: u32, output_port: u32, output_vc: u32) -> f64 {
        match self.granularity {
            Granularity::Vc => {
                let idx = self.vc_index(num_vcs, output_port, output_vc);
                self.raw_status(idx)
            }
            Granularity::Port => {
                let mut cur_sum = 0.0;
                let mut max_sum = 0.0;
                for vc in 0..num_vcs {
                    let idx = self.vc_index(num_vcs, output_port, vc);
                    let max = self.maximums[idx] as f64;
                    cur_sum += match &self.phantom {
                        None => max - self.counts[idx] as f64,
                        Some(p) => max - self.counts[idx] as f64 - p.windows[idx] as f64 * p.value_coeff,
                    };
                    max_sum += max;
                }
                if max_sum == 0.0 {
                    0.0
                } else {
                    (cur_sum / max_sum).clamp(0.0, 1.0)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vc_status_reflects_occupancy() {
        let mut bo = BufferOccupancy::new(Granularity::Vc, 4);
        bo.init_credits(0, 8);
        assert_eq!(bo.status(4, 0, 0), 1.0);
        bo.decrement_credit(0);
        bo.decrement_credit(0);
        assert!((bo.status(4, 0, 0) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn port_status_averages_vcs() {
        let mut bo = BufferOccupancy::new(Granularity::Port, 8);
        bo.init_credits(0, 4);
        bo.init_credits(1, 4);
        bo.decrement_credit(0);
        // vc0: 3/4 free, vc1: 4/4 free -> average 7/8
        assert!((bo.status(2, 0, 0) - 0.875).abs() < 1e-9);
    }

    #[test]
    fn phantom_window_reduces_status() {
        let mut bo = BufferOccupancy::new(Granularity::Vc, 2).with_phantom(0.5, 2);
        bo.init_credits(0, 10);
        bo.decrement_credit(0);
        // counts=9, window=1, value_coeff=0.5 -> (10-9-0.5)/10 = 0.05
        assert!((bo.status(1, 0, 0) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn null_sensor_is_always_zero() {
        let mut n = NullSensor;
        n.init_credits(0, 10);
        n.decrement_credit(0);
        assert_eq!(n.status(1, 0, 0), 0.0);
    }
}
