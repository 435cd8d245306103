//! A fixed-count, fixed-size streaming traffic source: send exactly
//! `num_messages` messages of `message_size` flits, one every `interval`
//! cycles, to a single fixed destination. Grounded on
//! `workload/stream/Application.cc`'s role as the simplest deterministic
//! traffic generator used for basic latency/throughput scenarios.

use meridian_core::flit::Message;
use meridian_core::time::VTime;
use meridian_core::workload::MessageSource;
use rand::RngCore;

pub struct StreamSource {
    terminal_id: u32,
    destination: u32,
    message_size: u32,
    protocol_class: u32,
    remaining: u32,
    interval: u64,
    next_send: VTime,
    next_message_id: u64,
}

impl StreamSource {
    pub fn new(terminal_id: u32, destination: u32, num_messages: u32, message_size: u32, interval: u64) -> Self {
        StreamSource {
            terminal_id,
            destination,
            message_size,
            protocol_class: 0,
            remaining: num_messages,
            interval,
            next_send: VTime::ZERO,
            next_message_id: 0,
        }
    }
}

impl MessageSource for StreamSource {
    fn poll(&mut self, now: VTime, _rng: &mut dyn RngCore) -> Option<Message> {
        if self.remaining == 0 || now < self.next_send {
            return None;
        }
        let mut message = Message::new(self.next_message_id, self.terminal_id, self.destination, self.protocol_class);
        message.packets.push(meridian_core::flit::Packet::new(0, self.next_message_id, self.message_size));
        self.next_message_id += 1;
        self.remaining -= 1;
        self.next_send = VTime::new(now.tick + self.interval, 0);
        Some(message)
    }

    fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}
