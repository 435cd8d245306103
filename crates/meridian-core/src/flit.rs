//! The Flit/Packet/Message value tree and the per-packet routing scratch
//! extension. Grounded on `examples/original_source/src/types/Flit.h` (flit
//! fields) and the packet/message container conventions described across
//! `router/`; Rust realization follows Design Notes §9 ("per-packet heap
//! extension" → an owned enum) and `strata-transport::wire::Packet`'s
//! header+payload struct shape.

use crate::time::VTime;

/// State a routing algorithm stashes on a packet between hops. Exactly one
/// variant is live per topology family — the routing algorithm that set it
/// is the only one that reads or clears it.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingExtension {
    None,
    UpDown { going_up: bool },
    Dragonfly { misrouted: bool, deroutes: u8 },
}

impl Default for RoutingExtension {
    fn default() -> Self {
        RoutingExtension::None
    }
}

/// A single flit within a packet.
#[derive(Debug, Clone)]
pub struct Flit {
    pub id: u32,
    pub is_head: bool,
    pub is_tail: bool,
    pub vc: u32,
    pub traffic_class: u32,
    pub send_time: Option<VTime>,
    pub receive_time: Option<VTime>,
}

impl Flit {
    pub fn new(id: u32, is_head: bool, is_tail: bool) -> Self {
        Flit {
            id,
            is_head,
            is_tail,
            vc: 0,
            traffic_class: 0,
            send_time: None,
            receive_time: None,
        }
    }
}

/// A routed unit of data: a sequence of flits sharing one `vc` for the
/// packet's lifetime plus routing/extension state.
#[derive(Debug, Clone)]
pub struct Packet {
    pub id: u32,
    pub flits: Vec<Flit>,
    pub hops: u32,
    pub routing_extension: RoutingExtension,
    pub transaction_id: u64,
}

impl Packet {
    pub fn new(id: u32, transaction_id: u64, num_flits: u32) -> Self {
        let flits = (0..num_flits)
            .map(|i| Flit::new(i, i == 0, i == num_flits - 1))
            .collect();
        Packet {
            id,
            flits,
            hops: 0,
            routing_extension: RoutingExtension::None,
            transaction_id,
        }
    }

    pub fn num_flits(&self) -> usize {
        self.flits.len()
    }
}

/// A full end-to-end transaction: one or more packets moving between a pair
/// of terminals. `Message` is moved by value (`Box<Message>`) between the
/// stage currently holding it — there is no stored "owner" field, the
/// current holder of the box *is* the owner, per Design Notes §9's
/// simplification of `MessageOwner`'s two-callback contract.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: u64,
    pub source: u32,
    pub destination: u32,
    pub packets: Vec<Packet>,
    pub protocol_class: u32,
}

impl Message {
    pub fn new(id: u64, source: u32, destination: u32, protocol_class: u32) -> Self {
        Message {
            id,
            source,
            destination,
            packets: Vec::new(),
            protocol_class,
        }
    }

    pub fn num_flits(&self) -> usize {
        self.packets.iter().map(Packet::num_flits).sum()
    }
}

/// Credit accounting unit: a bounded stack of VC indices with credit
/// available, matching `types/Credit.h`'s ring-buffer-of-numbers semantics.
#[derive(Debug, Clone, Default)]
pub struct Credit {
    vc_indices: Vec<u32>,
}

impl Credit {
    pub fn new() -> Self {
        Credit { vc_indices: Vec::new() }
    }

    pub fn put_num(&mut self, vc_idx: u32) {
        self.vc_indices.push(vc_idx);
    }

    pub fn get_num(&mut self) -> Option<u32> {
        if self.vc_indices.is_empty() {
            None
        } else {
            Some(self.vc_indices.remove(0))
        }
    }

    pub fn more(&self) -> bool {
        !self.vc_indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_marks_head_and_tail() {
        let p = Packet::new(0, 1, 3);
        assert!(p.flits[0].is_head);
        assert!(!p.flits[0].is_tail);
        assert!(p.flits[2].is_tail);
        assert!(!p.flits[1].is_head && !p.flits[1].is_tail);
    }

    #[test]
    fn single_flit_packet_is_head_and_tail() {
        let p = Packet::new(0, 1, 1);
        assert!(p.flits[0].is_head);
        assert!(p.flits[0].is_tail);
    }

    #[test]
    fn credit_is_fifo() {
        let mut c = Credit::new();
        assert!(!c.more());
        c.put_num(3);
        c.put_num(7);
        assert_eq!(c.get_num(), Some(3));
        assert_eq!(c.get_num(), Some(7));
        assert_eq!(c.get_num(), None);
    }

    #[test]
    fn message_counts_flits_across_packets() {
        let mut m = Message::new(0, 0, 1, 0);
        m.packets.push(Packet::new(0, 0, 3));
        m.packets.push(Packet::new(1, 0, 2));
        assert_eq!(m.num_flits(), 5);
    }
}
