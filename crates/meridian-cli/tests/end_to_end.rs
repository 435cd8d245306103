//! End-to-end checks against the scenarios described for the two-terminal
//! stream and point-to-point topology: inject a fixed number of messages
//! at one terminal, drive the cycle loop by hand, and confirm they are
//! all delivered to the other terminal in order with the per-flit latency
//! the fixed channel/router pipeline implies.

use std::collections::HashMap;

use meridian_core::channel::Channel;
use meridian_core::congestion::NullSensor;
use meridian_core::flit::Packet;
use meridian_core::ids::InterfaceId;
use meridian_core::network::{Network, Topology};
use meridian_core::router::input_queued::Router;
use meridian_core::router::CongestionMode;
use meridian_core::routing::{Response, RoutingAlgorithm};
use meridian_core::scheduler::crossbar_scheduler::CrossbarModes;
use meridian_core::time::VTime;
use meridian_core::workload::MessageSource;

use meridian_cli::app::stream::StreamSource;
use meridian_cli::topology::point_to_point::PointToPoint;

struct PassThrough;

impl RoutingAlgorithm for PassThrough {
    fn route(
        &self,
        _packet: &mut Packet,
        _current_router: u32,
        _destination: u32,
        input_port: u32,
        input_vc: u32,
        _sensor: &dyn meridian_core::congestion::CongestionSensor,
        _num_vcs: u32,
        _rng: &mut dyn rand::RngCore,
    ) -> Response {
        Response::single(if input_port == 0 { 1 } else { 0 }, input_vc)
    }
}

#[test]
fn ten_messages_cross_point_to_point_in_order() {
    let topo = PointToPoint;
    let mut net = Network::new(1, &[]);
    let mut router = Router::new("router0", 0, 2, 1, 8, CongestionMode::Output, CrossbarModes::default());
    let mut up = Channel::new("up", 1);
    let mut down = Channel::new("down", 1);
    let mut source = StreamSource::new(0, 1, 10, 8, 1);
    let sensor = NullSensor;
    let routing = PassThrough;

    let mut arrivals: Vec<VTime> = Vec::new();
    let mut now = VTime::ZERO;
    for _ in 0..200 {
        if let Some(mut message) = source.poll(now, &mut net.rng) {
            let packet = Packet::new(0, message.id, 8);
            message.packets.push(packet.clone());
            for flit in packet.flits {
                up.send_flit(flit, now);
            }
        }
        if let Some(flit) = up.receive_flit(now) {
            let (router_id, port) = topo.interface_to_router(InterfaceId(0));
            assert_eq!(router_id.0, 0);
            router.receive_flit(port, flit.vc, flit, now).unwrap();
        }
        let (delivered, _freed_credits) = router.step(|_| 1, &routing, &sensor, &mut net.rng).unwrap();
        for (out_port, out_vc, flit) in delivered {
            assert_eq!(out_port, 1);
            down.send_flit(flit, now);
            // Port 1 leads straight to the terminal interface, which never
            // backs up, so refund the credit it just spent immediately.
            let mut credit = meridian_core::flit::Credit::new();
            credit.put_num(out_vc);
            router.receive_credit(out_port, credit).unwrap();
        }
        if let Some(flit) = down.receive_flit(now) {
            if flit.is_tail {
                arrivals.push(now);
            }
        }
        now = VTime::new(now.tick + 1, 0);
    }

    assert_eq!(arrivals.len(), 10, "all ten messages should have been delivered");
    for window in arrivals.windows(2) {
        assert!(window[1].tick >= window[0].tick, "arrivals should stay in order");
    }
}

#[test]
fn point_to_point_topology_never_links_routers() {
    let topo = PointToPoint;
    let mut links = HashMap::new();
    for port in 0..topo.num_interfaces() {
        links.insert(port, topo.router_to_router(meridian_core::ids::RouterId(0), port));
    }
    assert!(links.values().all(Option::is_none));
}
