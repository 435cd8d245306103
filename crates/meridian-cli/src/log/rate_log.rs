//! Per-terminal supply/injection/delivered/ejection flit rates over the
//! monitoring window. Grounded on spec §7's `rate_log` schema.

use std::io;
use std::path::Path;

use super::CsvWriter;

pub struct RateLog {
    writer: CsvWriter,
}

/// One terminal's flit counters accumulated over a monitoring window.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalRates {
    pub supply_flits: u64,
    pub injected_flits: u64,
    pub delivered_flits: u64,
    pub ejected_flits: u64,
}

impl RateLog {
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(RateLog {
            writer: CsvWriter::create(
                path,
                "terminal,window_ticks,supply_rate,injection_rate,delivered_rate,ejection_rate",
            )?,
        })
    }

    pub fn record(&mut self, terminal: u32, window_ticks: u64, rates: &TerminalRates) -> io::Result<()> {
        let window = window_ticks.max(1) as f64;
        self.writer.write_row(&format!(
            "{},{},{:.6},{:.6},{:.6},{:.6}",
            terminal,
            window_ticks,
            rates.supply_flits as f64 / window,
            rates.injected_flits as f64 / window,
            rates.delivered_flits as f64 / window,
            rates.ejected_flits as f64 / window,
        ))
    }

    pub fn finish(self) -> io::Result<()> {
        self.writer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_rate_as_flits_over_window() {
        let mut path = std::env::temp_dir();
        path.push("meridian-rate-log-test.csv.gz");
        let mut log = RateLog::create(&path).unwrap();
        let rates = TerminalRates {
            supply_flits: 100,
            injected_flits: 80,
            delivered_flits: 75,
            ejected_flits: 75,
        };
        log.record(0, 1000, &rates).unwrap();
        log.finish().unwrap();
        std::fs::remove_file(&path).unwrap();
    }
}
