//! The simplest possible topology: two interfaces connected through a
//! single router, one hop each way. Used by spec §8's single-flit and
//! single-packet end-to-end scenarios, where the topology itself isn't
//! under test. Supplemented — the original has no "trivial" topology of
//! its own, this is the minimal concrete case a generic router factory
//! (`network/NetworkFactory.h`) would produce for a two-node network.

use meridian_core::ids::{InterfaceId, RouterId};
use meridian_core::network::Topology;

pub struct PointToPoint;

impl Topology for PointToPoint {
    fn num_routers(&self) -> u32 {
        1
    }

    fn num_interfaces(&self) -> u32 {
        2
    }

    fn interface_to_router(&self, interface: InterfaceId) -> (RouterId, u32) {
        (RouterId(0), interface.0 as u32)
    }

    fn router_to_router(&self, _router: RouterId, _port: u32) -> Option<(RouterId, u32)> {
        None
    }
}
