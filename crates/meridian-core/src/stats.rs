//! Rolling measurement windows for channel utilization and terminal
//! injection/delivery rates. Grounded on `strata-transport::stats`'s
//! counter style, standing in for the original's `RateLog`/`ChannelLog`
//! file writers — the file-format side of those lives in
//! `meridian-cli::log`, this module only owns the in-memory counters.

use std::collections::VecDeque;

/// A fixed-size sliding window of boolean samples, used to compute
/// utilization or delivery-rate style fractions.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    window: VecDeque<bool>,
    capacity: usize,
}

impl SlidingWindow {
    pub fn new(capacity: usize) -> Self {
        SlidingWindow { window: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn record(&mut self, hit: bool) {
        self.window.push_back(hit);
        while self.window.len() > self.capacity {
            self.window.pop_front();
        }
    }

    pub fn fraction(&self) -> f64 {
        if self.window.is_empty() {
            0.0
        } else {
            self.window.iter().filter(|b| **b).count() as f64 / self.window.len() as f64
        }
    }
}

/// Per-terminal injection/delivery counters, accumulated over the whole
/// run (not windowed) for the final rate-log summary.
#[derive(Debug, Clone, Default)]
pub struct TerminalStats {
    pub messages_injected: u64,
    pub messages_delivered: u64,
    pub flits_injected: u64,
    pub flits_delivered: u64,
    pub total_latency_ticks: u64,
}

impl TerminalStats {
    pub fn record_injection(&mut self, flits: u64) {
        self.messages_injected += 1;
        self.flits_injected += flits;
    }

    pub fn record_delivery(&mut self, flits: u64, latency_ticks: u64) {
        self.messages_delivered += 1;
        self.flits_delivered += flits;
        self.total_latency_ticks += latency_ticks;
    }

    pub fn mean_latency(&self) -> f64 {
        if self.messages_delivered == 0 {
            0.0
        } else {
            self.total_latency_ticks as f64 / self.messages_delivered as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sliding_window_reports_fraction() {
        let mut w = SlidingWindow::new(4);
        w.record(true);
        w.record(true);
        w.record(false);
        w.record(false);
        assert!((w.fraction() - 0.5).abs() < 1e-9);
        w.record(false);
        assert!((w.fraction() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn terminal_stats_mean_latency() {
        let mut s = TerminalStats::default();
        s.record_delivery(4, 10);
        s.record_delivery(4, 20);
        assert!((s.mean_latency() - 15.0).abs() < 1e-9);
    }
}
