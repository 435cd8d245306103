//! VC allocation: input VCs compete for a downstream output VC.
//!
//! Grounded on `architecture/VcScheduler_TEST.cc` (only the test file was
//! retrieved, so the contract is inferred from its usage: clients request a
//! specific output vc index, the scheduler runs a separable allocation once
//! per cycle and reports back the winner per output vc) and on
//! `CrossbarScheduler.h`'s sibling shape for the request/response API.
//!
//! Per spec §4.6/§4.7, a granted output VC is held by its packet until the
//! tail flit releases it via [`VcScheduler::release_vc`] — a held VC is
//! excluded from arbitration for anyone else in the meantime, since only
//! head flits ever request one (body/tail flits inherit the head's grant).

use crate::allocator::{Allocator, Request};
use std::collections::HashMap;

/// One VC allocation request: an input client wants a specific flattened
/// output-vc index.
#[derive(Debug, Clone, Copy)]
pub struct VcRequest {
    pub client: usize,
    pub output_vc_idx: u32,
}

pub struct VcScheduler {
    allocator: Allocator,
    pending: Vec<VcRequest>,
    /// output-vc index -> client currently holding it.
    held: HashMap<usize, usize>,
}

impl VcScheduler {
    pub fn new(num_clients: usize, num_output_vcs: usize) -> Self {
        VcScheduler {
            allocator: Allocator::new(num_clients, num_output_vcs),
            pending: Vec::new(),
            held: HashMap::new(),
        }
    }

    pub fn request(&mut self, req: VcRequest) {
        self.pending.push(req);
    }

    /// Release a held output vc so it re-enters arbitration, called once
    /// the holding packet's tail flit has crossed the crossbar.
    pub fn release_vc(&mut self, output_vc_idx: u32) {
        self.held.remove(&(output_vc_idx as usize));
    }

    /// Run one allocation round and return, per output vc index, which
    /// client (if any) newly won it this cycle. Clears pending requests for
    /// the next cycle. A vc already held by an in-flight packet is excluded
    /// from arbitration, so it never shows up as a fresh grant here even
    /// though it remains unavailable to other clients.
    pub fn allocate(&mut self) -> Vec<Option<usize>> {
        let held = &self.held;
        let requests: Vec<Request> = self
            .pending
            .drain(..)
            .filter(|r| !held.contains_key(&(r.output_vc_idx as usize)))
            .map(|r| Request { client: r.client, resource: r.output_vc_idx as usize })
            .collect();
        let grants = self.allocator.allocate(&requests, true);
        for (resource, winner) in grants.iter().enumerate() {
            if let Some(client) = winner {
                self.held.insert(resource, *client);
            }
        }
        grants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grants_one_client_per_output_vc() {
        let mut sched = VcScheduler::new(3, 2);
        sched.request(VcRequest { client: 0, output_vc_idx: 0 });
        sched.request(VcRequest { client: 1, output_vc_idx: 0 });
        sched.request(VcRequest { client: 2, output_vc_idx: 1 });
        let grants = sched.allocate();
        assert!(grants[0].is_some());
        assert_eq!(grants[1], Some(2));
    }

    #[test]
    fn pending_requests_are_cleared_after_allocate() {
        let mut sched = VcScheduler::new(2, 2);
        sched.request(VcRequest { client: 0, output_vc_idx: 0 });
        sched.allocate();
        let grants = sched.allocate();
        assert!(grants.iter().all(|g| g.is_none()));
    }

    #[test]
    fn held_vc_is_excluded_from_arbitration_until_released() {
        let mut sched = VcScheduler::new(2, 1);
        sched.request(VcRequest { client: 0, output_vc_idx: 0 });
        let g1 = sched.allocate();
        assert_eq!(g1[0], Some(0));

        // Client 1 wants the same output vc while client 0 still holds it.
        sched.request(VcRequest { client: 1, output_vc_idx: 0 });
        let g2 = sched.allocate();
        assert_eq!(g2[0], None);

        sched.release_vc(0);
        sched.request(VcRequest { client: 1, output_vc_idx: 0 });
        let g3 = sched.allocate();
        assert_eq!(g3[0], Some(1));
    }
}
