//! CSV log writers for the three log families spec §7 calls for. Each
//! writer owns a gzip-compressed file handle and appends one row per
//! event; none of them buffer rows in memory, matching
//! `application/Application.cc`'s practice of writing logs as events
//! happen rather than accumulating them for a final flush.

pub mod channel_log;
pub mod message_log;
pub mod rate_log;

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

/// A gzip-compressed, line-buffered CSV sink shared by the three log
/// writers below.
pub(crate) struct CsvWriter {
    encoder: GzEncoder<File>,
}

impl CsvWriter {
    pub(crate) fn create(path: &Path, header: &str) -> io::Result<Self> {
        let file = File::create(path)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        writeln!(encoder, "{header}")?;
        Ok(CsvWriter { encoder })
    }

    pub(crate) fn write_row(&mut self, row: &str) -> io::Result<()> {
        writeln!(self.encoder, "{row}")
    }

    pub(crate) fn finish(self) -> io::Result<()> {
        self.encoder.finish().map(|_| ())
    }
}
