//! Routing algorithm framework: the contract a topology-specific routing
//! algorithm implements, plus the shared [`reduction`] helper most
//! algorithms delegate their minimal/non-minimal candidate selection to.
//!
//! Grounded on `network/RoutingAlgorithm.h`'s `Client`/response pattern
//! (renamed here to a plain trait method returning a value rather than a
//! callback, since our kernel dispatches through `process_event` instead of
//! a bespoke `Client` interface per algorithm).

pub mod algorithms;
pub mod reduction;

use crate::congestion::CongestionSensor;
use crate::flit::Packet;
use rand::RngCore;

/// A single candidate output the routing algorithm is willing to use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub port: u32,
    pub vc: u32,
}

/// The full result of a routing decision: one or more candidates (the
/// allocator picks among them) plus whether this is a minimal route.
#[derive(Debug, Clone)]
pub struct Response {
    pub candidates: Vec<Candidate>,
}

impl Response {
    pub fn single(port: u32, vc: u32) -> Self {
        Response {
            candidates: vec![Candidate { port, vc }],
        }
    }
}

/// Per-hop routing decision contract. `num_vcs` and the current packet's
/// routing extension are passed explicitly rather than reaching for global
/// topology state, keeping the algorithm pure and testable.
pub trait RoutingAlgorithm {
    fn route(
        &self,
        packet: &mut Packet,
        current_router: u32,
        destination: u32,
        input_port: u32,
        input_vc: u32,
        sensor: &dyn CongestionSensor,
        num_vcs: u32,
        rng: &mut dyn RngCore,
    ) -> Response;
}
