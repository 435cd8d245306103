//! Per-channel, per-VC utilization and aggregate utilization. Grounded on
//! spec §7's `channel_log` schema; the utilization fractions themselves
//! come from [`meridian_core::stats::SlidingWindow`].

use std::io;
use std::path::Path;

use super::CsvWriter;

pub struct ChannelLog {
    writer: CsvWriter,
}

impl ChannelLog {
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(ChannelLog {
            writer: CsvWriter::create(path, "channel,vc,vc_utilization,aggregate_utilization")?,
        })
    }

    pub fn record(&mut self, channel: u32, vc: u32, vc_utilization: f64, aggregate_utilization: f64) -> io::Result<()> {
        self.writer.write_row(&format!("{channel},{vc},{vc_utilization:.6},{aggregate_utilization:.6}"))
    }

    pub fn finish(self) -> io::Result<()> {
        self.writer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_a_row_without_error() {
        let mut path = std::env::temp_dir();
        path.push("meridian-channel-log-test.csv.gz");
        let mut log = ChannelLog::create(&path).unwrap();
        log.record(0, 1, 0.75, 0.9).unwrap();
        log.finish().unwrap();
        std::fs::remove_file(&path).unwrap();
    }
}
