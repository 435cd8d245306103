//! Processor/memory request-response traffic: a fixed set of processor
//! terminals each issue a request to a designated memory terminal and wait
//! for the matching response before issuing the next one. Grounded on
//! `workload/simplemem/MemoryTerminal.h`'s request/response pairing
//! (`MemoryOp`), simplified to a single outstanding request per processor.

use meridian_core::flit::{Message, Packet};
use meridian_core::time::VTime;
use meridian_core::workload::{MessageSink, MessageSource};
use rand::RngCore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemoryOp {
    Request,
    Response,
}

/// One processor terminal: issues `num_requests` request/response rounds
/// against `memory_terminal`, one at a time.
pub struct ProcessorSource {
    terminal_id: u32,
    memory_terminal: u32,
    request_size: u32,
    response_size: u32,
    remaining_requests: u32,
    awaiting_response: bool,
    next_message_id: u64,
}

impl ProcessorSource {
    pub fn new(terminal_id: u32, memory_terminal: u32, num_requests: u32, request_size: u32, response_size: u32) -> Self {
        ProcessorSource {
            terminal_id,
            memory_terminal,
            request_size,
            response_size,
            remaining_requests: num_requests,
            awaiting_response: false,
            next_message_id: 0,
        }
    }

    /// Call when this terminal's outstanding response arrives, freeing it
    /// to issue its next request.
    pub fn on_response_received(&mut self) {
        self.awaiting_response = false;
    }

    fn protocol_class(op: MemoryOp) -> u32 {
        match op {
            MemoryOp::Request => 0,
            MemoryOp::Response => 1,
        }
    }
}

impl MessageSource for ProcessorSource {
    fn poll(&mut self, _now: VTime, _rng: &mut dyn RngCore) -> Option<Message> {
        if self.awaiting_response || self.remaining_requests == 0 {
            return None;
        }
        self.remaining_requests -= 1;
        self.awaiting_response = true;
        let mut m = Message::new(
            self.next_message_id,
            self.terminal_id,
            self.memory_terminal,
            Self::protocol_class(MemoryOp::Request),
        );
        m.packets.push(Packet::new(0, self.next_message_id, self.request_size));
        self.next_message_id += 1;
        Some(m)
    }

    fn is_exhausted(&self) -> bool {
        self.remaining_requests == 0 && !self.awaiting_response
    }
}

/// The memory terminal: answers every request it sees with a response of
/// `response_size` flits, sent back to the requester.
pub struct MemorySink {
    terminal_id: u32,
    response_size: u32,
    pending_responses: Vec<u32>,
    next_message_id: u64,
}

impl MemorySink {
    pub fn new(terminal_id: u32, response_size: u32) -> Self {
        MemorySink {
            terminal_id,
            response_size,
            pending_responses: Vec::new(),
            next_message_id: 1_000_000,
        }
    }

    pub fn drain_response(&mut self) -> Option<Message> {
        let requester = self.pending_responses.pop()?;
        let mut m = Message::new(self.next_message_id, self.terminal_id, requester, 1);
        m.packets.push(Packet::new(0, self.next_message_id, self.response_size));
        self.next_message_id += 1;
        Some(m)
    }
}

impl MessageSink for MemorySink {
    fn deliver(&mut self, message: Message, _now: VTime) {
        self.pending_responses.push(message.source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn processor_waits_for_response_before_next_request() {
        let mut src = ProcessorSource::new(0, 1, 2, 4, 4);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(src.poll(VTime::ZERO, &mut rng).is_some());
        assert!(src.poll(VTime::ZERO, &mut rng).is_none());
        src.on_response_received();
        assert!(src.poll(VTime::ZERO, &mut rng).is_some());
        assert!(src.is_exhausted() == false || src.poll(VTime::ZERO, &mut rng).is_none());
    }

    #[test]
    fn memory_sink_responds_to_requester() {
        let mut sink = MemorySink::new(9, 2);
        let mut req = Message::new(0, 3, 9, 0);
        req.packets.push(Packet::new(0, 0, 4));
        sink.deliver(req, VTime::ZERO);
        let resp = sink.drain_response().unwrap();
        assert_eq!(resp.destination, 3);
        assert_eq!(resp.source, 9);
    }
}
