//! Concrete [`super::RoutingAlgorithm`] implementations shipped so the
//! crate is runnable standalone, without requiring an external topology
//! plugin. Topology/algorithm *factories* (looking an algorithm up by a
//! config string) live in `meridian-cli`, not here — `core` only owns the
//! algorithm contract and these two reference implementations.

use super::{Candidate, Response, RoutingAlgorithm};
use crate::congestion::CongestionSensor;
use crate::flit::{Packet, RoutingExtension};
use rand::RngCore;

/// Deterministic, minimal-only dimension-order routing over a linear
/// address space divided into `radix`-sized digits — the simplest
/// topology-agnostic routing rule, grounded on
/// `network/torus/DimOrderRoutingAlgorithm.h`'s "route the most
/// significant differing digit first" rule, simplified to a single-stage
/// port selection suitable for the point-to-point / mesh topologies
/// `meridian-cli` supplies.
#[derive(Debug, Clone)]
pub struct DimensionOrder {
    pub radix: u32,
}

impl RoutingAlgorithm for DimensionOrder {
    fn route(
        &self,
        _packet: &mut Packet,
        current_router: u32,
        destination: u32,
        _input_port: u32,
        input_vc: u32,
        _sensor: &dyn CongestionSensor,
        _num_vcs: u32,
        _rng: &mut dyn RngCore,
    ) -> Response {
        if current_router == destination {
            return Response::single(0, input_vc);
        }
        let port = if destination > current_router {
            ((destination - current_router) % self.radix.max(1)).max(1)
        } else {
            1
        };
        Response::single(port, input_vc)
    }
}

/// Up*/down* routing: packets travel strictly "up" toward a common
/// ancestor, then strictly "down" toward the destination, never reversing
/// direction once they've gone down. State (`going_up`) is carried in the
/// packet's [`RoutingExtension::UpDown`], grounded on
/// `examples/cristinabrinza-caminos/src/routing/updown.rs`'s phase state
/// machine — the closest in-pack Rust precedent for this family.
#[derive(Debug, Clone)]
pub struct UpDown {
    pub up_port: u32,
    pub down_ports: Vec<u32>,
}

impl RoutingAlgorithm for UpDown {
    fn route(
        &self,
        packet: &mut Packet,
        current_router: u32,
        destination: u32,
        _input_port: u32,
        input_vc: u32,
        _sensor: &dyn CongestionSensor,
        _num_vcs: u32,
        _rng: &mut dyn RngCore,
    ) -> Response {
        if current_router == destination {
            packet.routing_extension = RoutingExtension::None;
            return Response::single(0, input_vc);
        }

        let going_up = match packet.routing_extension {
            RoutingExtension::UpDown { going_up } => going_up,
            _ => true,
        };

        if going_up && !self.down_ports.is_empty() && destination < current_router {
            packet.routing_extension = RoutingExtension::UpDown { going_up: false };
            Response::single(self.down_ports[0], input_vc)
        } else if going_up {
            packet.routing_extension = RoutingExtension::UpDown { going_up: true };
            Response::single(self.up_port, input_vc)
        } else {
            packet.routing_extension = RoutingExtension::UpDown { going_up: false };
            let idx = (destination as usize) % self.down_ports.len().max(1);
            Response::single(self.down_ports.get(idx).copied().unwrap_or(0), input_vc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::congestion::NullSensor;
    use crate::flit::Packet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn dimension_order_routes_toward_destination() {
        let algo = DimensionOrder { radix: 4 };
        let mut pkt = Packet::new(0, 0, 1);
        let sensor = NullSensor;
        let mut rng = StdRng::seed_from_u64(0);
        let resp = algo.route(&mut pkt, 0, 5, 0, 0, &sensor, 2, &mut rng);
        assert_eq!(resp.candidates.len(), 1);
    }

    #[test]
    fn dimension_order_self_destination_ejects() {
        let algo = DimensionOrder { radix: 4 };
        let mut pkt = Packet::new(0, 0, 1);
        let sensor = NullSensor;
        let mut rng = StdRng::seed_from_u64(0);
        let resp = algo.route(&mut pkt, 3, 3, 0, 0, &sensor, 2, &mut rng);
        assert_eq!(resp.candidates[0].port, 0);
    }

    #[test]
    fn updown_goes_up_then_down() {
        let algo = UpDown { up_port: 9, down_ports: vec![1, 2, 3] };
        let mut pkt = Packet::new(0, 0, 1);
        let sensor = NullSensor;
        let mut rng = StdRng::seed_from_u64(0);

        let r1 = algo.route(&mut pkt, 0, 10, 0, 0, &sensor, 2, &mut rng);
        assert_eq!(r1.candidates[0].port, 9);
        assert_eq!(pkt.routing_extension, RoutingExtension::UpDown { going_up: true });
    }
}
