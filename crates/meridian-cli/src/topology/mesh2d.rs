//! A minimal 2-D mesh: `width * height` routers, one local interface each,
//! connected to their N/S/E/W neighbors. Supplemented from
//! `util/DimensionIterator.h`'s dimension-stepping logic (simplified to two
//! dimensions) — full torus/hyperx/dragonfly/etc. enumerators remain out of
//! scope per spec's Non-goals; this exists only so `meridian-cli` has more
//! than one topology to exercise multi-hop routing end to end.

use meridian_core::ids::{InterfaceId, RouterId};
use meridian_core::network::Topology;

/// Port assignment per router: 0 = local interface, 1 = north, 2 = south,
/// 3 = east, 4 = west.
pub struct Mesh2d {
    pub width: u32,
    pub height: u32,
}

impl Mesh2d {
    pub fn new(width: u32, height: u32) -> Self {
        Mesh2d { width, height }
    }

    fn coords(&self, router: RouterId) -> (u32, u32) {
        let id = router.0 as u32;
        (id % self.width, id / self.width)
    }

    fn router_id(&self, x: u32, y: u32) -> RouterId {
        RouterId((y * self.width + x) as usize)
    }
}

impl Topology for Mesh2d {
    fn num_routers(&self) -> u32 {
        self.width * self.height
    }

    fn num_interfaces(&self) -> u32 {
        self.width * self.height
    }

    fn interface_to_router(&self, interface: InterfaceId) -> (RouterId, u32) {
        (RouterId(interface.0), 0)
    }

    fn router_to_router(&self, router: RouterId, port: u32) -> Option<(RouterId, u32)> {
        let (x, y) = self.coords(router);
        match port {
            1 if y + 1 < self.height => Some((self.router_id(x, y + 1), 2)),
            2 if y > 0 => Some((self.router_id(x, y - 1), 1)),
            3 if x + 1 < self.width => Some((self.router_id(x + 1, y), 4)),
            4 if x > 0 => Some((self.router_id(x - 1, y), 3)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_wire_up_reciprocally() {
        let topo = Mesh2d::new(3, 3);
        // router (1,1) = id 4; east neighbor is (2,1) = id 5 on port 4.
        let east = topo.router_to_router(RouterId(4), 3);
        assert_eq!(east, Some((RouterId(5), 4)));
        let back = topo.router_to_router(RouterId(5), 4);
        assert_eq!(back, Some((RouterId(4), 3)));
    }

    #[test]
    fn edge_routers_have_no_neighbor_off_grid() {
        let topo = Mesh2d::new(2, 2);
        assert!(topo.router_to_router(RouterId(0), 4).is_none()); // west edge
        assert!(topo.router_to_router(RouterId(0), 2).is_none()); // south edge
    }
}
