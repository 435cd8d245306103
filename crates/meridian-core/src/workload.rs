//! Traffic-generation contracts. Grounded on
//! `workload/Application.h`/`Terminal.h`'s split between an `Application`
//! (owns all terminals, decides when the run is done) and per-terminal
//! message sources/sinks — concrete terminal behaviors (stream, blast,
//! simplemem) are a `meridian-cli` concern per spec's Non-goals on traffic
//! pattern libraries; `core` only defines the seam.

use crate::flit::Message;
use crate::time::VTime;

/// Produces outgoing messages for one terminal.
pub trait MessageSource {
    /// Called once per interface cycle; returns a message to inject, if
    /// this terminal has one ready.
    fn poll(&mut self, now: VTime, rng: &mut dyn rand::RngCore) -> Option<Message>;

    /// Whether this source still has more messages to eventually produce.
    fn is_exhausted(&self) -> bool;
}

/// Consumes delivered messages for one terminal.
pub trait MessageSink {
    fn deliver(&mut self, message: Message, now: VTime);
}

/// Owns the full set of terminals and decides when a run should end —
/// e.g. after a fixed message count, or once injection has been throttled
/// back for a saturation test per spec §8's "blast" scenario.
pub trait Application {
    fn is_complete(&self) -> bool;
}
