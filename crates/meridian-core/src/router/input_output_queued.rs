//! Input-output-queued router: identical pipeline to the input-queued
//! variant, but a granted flit lands in a small per-output-port
//! [`OutputQueue`] rather than going straight onto the channel — this
//! decouples crossbar-grant timing from channel-send timing, trading a
//! little buffer area for reduced blocking when several flits want the
//! same output in the same cycle's channel slot. Grounded on
//! `router/inputoutputqueued/Router.h`.

use super::{CongestionMode, RouterContract};
use crate::allocator::pick_random;
use crate::congestion::CongestionSensor;
use crate::crossbar::Crossbar;
use crate::flit::Flit;
use crate::queue::input_queue::{InputQueue, InputQueueConfig};
use crate::queue::output_queue::OutputQueue;
use crate::routing::{Response, RoutingAlgorithm};
use crate::scheduler::crossbar_scheduler::{CrossbarModes, CrossbarScheduler};
use crate::scheduler::vc_scheduler::{VcRequest, VcScheduler};
use crate::time::VTime;
use rand::RngCore;
use std::collections::HashMap;

pub struct Router {
    name: String,
    id: u32,
    num_ports: u32,
    num_vcs: u32,
    congestion_mode: CongestionMode,
    queues: HashMap<(u32, u32), InputQueue>,
    output_queues: HashMap<u32, OutputQueue>,
    vc_scheduler: VcScheduler,
    crossbar_scheduler: CrossbarScheduler,
    crossbar: Crossbar,
}

impl Router {
    pub fn new(
        name: impl Into<String>,
        id: u32,
        num_ports: u32,
        num_vcs: u32,
        input_depth: u32,
        output_depth: u32,
        congestion_mode: CongestionMode,
        crossbar_modes: CrossbarModes,
    ) -> Self {
        let name = name.into();
        let mut queues = HashMap::new();
        for port in 0..num_ports {
            for vc in 0..num_vcs {
                queues.insert(
                    (port, vc),
                    InputQueue::new(port, vc, InputQueueConfig { depth: input_depth, vca_swa_wait: true }),
                );
            }
        }
        let mut output_queues = HashMap::new();
        for port in 0..num_ports {
            output_queues.insert(port, OutputQueue::new(output_depth as usize));
        }
        let num_clients = (num_ports * num_vcs) as usize;
        let num_output_vcs = num_clients;
        let mut crossbar_scheduler =
            CrossbarScheduler::new("xbar_sched", num_clients, num_ports as usize, num_output_vcs, crossbar_modes);
        for output_vc_idx in 0..num_output_vcs {
            crossbar_scheduler.init_credits(output_vc_idx, output_depth);
        }
        Router {
            name,
            id,
            num_ports,
            num_vcs,
            congestion_mode,
            queues,
            output_queues,
            vc_scheduler: VcScheduler::new(num_clients, num_clients),
            crossbar_scheduler,
            crossbar: Crossbar::new(num_ports as usize, num_ports as usize),
        }
    }

    pub fn receive_flit(&mut self, port: u32, vc: u32, flit: Flit, now: VTime) -> Result<(), &'static str> {
        self.queues.get_mut(&(port, vc)).ok_or("no such input queue")?.receive_flit(flit, now)
    }

    /// A credit packet returning from downstream on output `port`: replenish
    /// credit for each vc it frees, per spec §4.7's `incrementCredit`. The
    /// channel a credit arrives on already identifies which output port it
    /// is scoped to, matching how `Credit` only ever carries vc numbers.
    pub fn receive_credit(&mut self, port: u32, mut credit: crate::flit::Credit) -> crate::error::Result<()> {
        while let Some(vc) = credit.get_num() {
            let output_vc_idx = (port * self.num_vcs + vc) as usize;
            self.crossbar_scheduler.increment_credit(output_vc_idx)?;
        }
        Ok(())
    }

    /// Drive one full cycle. Returns the `(in_port, in_vc)` pairs whose
    /// input buffer freed a slot — the caller turns each into a credit sent
    /// back upstream. Delivered flits land in the per-port output queue,
    /// drained separately via [`Self::drain_output`].
    #[allow(clippy::too_many_arguments)]
    pub fn step(
        &mut self,
        destination_of: impl Fn(&Flit) -> u32,
        routing_algorithm: &dyn RoutingAlgorithm,
        sensor: &dyn CongestionSensor,
        rng: &mut dyn RngCore,
    ) -> crate::error::Result<Vec<(u32, u32)>> {
        let keys: Vec<(u32, u32)> = self.queues.keys().copied().collect();
        for key in &keys {
            let q = self.queues.get_mut(key).unwrap();
            if let Some(flit) = q.try_start_rfe() {
                let dest = destination_of(flit);
                let mut pkt = crate::flit::Packet::new(0, 0, 1);
                let response = routing_algorithm.route(
                    &mut pkt,
                    self.id,
                    dest,
                    key.0,
                    key.1,
                    sensor,
                    self.num_vcs,
                    rng,
                );
                q.complete_rfe(response);
            }
        }

        for key in &keys {
            self.queues.get_mut(key).unwrap().advance_rfe_to_vca();
        }
        let client_of = |port: u32, vc: u32| -> usize { (port * self.num_vcs + vc) as usize };
        let mut vca_clients: Vec<(u32, u32, Response)> = Vec::new();
        for key in &keys {
            let q = self.queues.get_mut(key).unwrap();
            if let Some(resp) = q.vca_candidates() {
                vca_clients.push((key.0, key.1, resp.clone()));
            }
        }
        for (port, vc, resp) in &vca_clients {
            let candidate = pick_random(rng, &resp.candidates);
            self.vc_scheduler.request(VcRequest {
                client: client_of(*port, *vc),
                output_vc_idx: candidate.port * self.num_vcs + candidate.vc,
            });
        }
        let vc_grants = self.vc_scheduler.allocate();
        for (resource_idx, winner) in vc_grants.iter().enumerate() {
            if let Some(client) = winner {
                let out_port = resource_idx as u32 / self.num_vcs;
                let out_vc = resource_idx as u32 % self.num_vcs;
                let in_port = *client as u32 / self.num_vcs;
                let in_vc = *client as u32 % self.num_vcs;
                self.queues.get_mut(&(in_port, in_vc)).unwrap().complete_vca(out_port, out_vc);
            }
        }

        for key in &keys {
            self.queues.get_mut(key).unwrap().advance_vca_to_swa();
        }
        for key in &keys {
            self.queues.get_mut(key).unwrap().try_advance_body_to_swa();
        }
        for key in &keys {
            let q = self.queues.get_mut(key).unwrap();
            if let Some((port, vc, is_tail)) = q.swa_request() {
                let output_vc_idx = (port * self.num_vcs + vc) as usize;
                self.crossbar_scheduler.request(client_of(key.0, key.1), port as usize, output_vc_idx, is_tail);
            } else {
                self.crossbar_scheduler.note_idle(client_of(key.0, key.1));
            }
        }
        let xbar_grants = self.crossbar_scheduler.allocate();

        for (out_port, winner) in xbar_grants.into_iter().enumerate() {
            if let Some(client) = winner {
                let in_port = client as u32 / self.num_vcs;
                let in_vc = client as u32 % self.num_vcs;
                if let Some((flit, port, vc)) = self.queues.get_mut(&(in_port, in_vc)).unwrap().take_granted_flit() {
                    if self.crossbar.traverse(in_port as usize, out_port, flit.clone()).is_ok() {
                        let output_vc_idx = (port * self.num_vcs + vc) as usize;
                        self.crossbar_scheduler.decrement_credit(output_vc_idx)?;
                        if flit.is_tail {
                            self.vc_scheduler.release_vc(output_vc_idx as u32);
                        }
                        let _ = self.output_queues.get_mut(&(out_port as u32)).unwrap().push(flit);
                    }
                }
            }
        }

        let mut freed_credits = Vec::new();
        for key in &keys {
            let n = self.queues.get_mut(key).unwrap().take_freed_credits();
            for _ in 0..n {
                freed_credits.push(*key);
            }
        }
        Ok(freed_credits)
    }

    /// Drain one flit (if any) ready to leave on `port` toward the channel.
    pub fn drain_output(&mut self, port: u32) -> Option<Flit> {
        self.output_queues.get_mut(&port)?.pop()
    }
}

impl RouterContract for Router {
    fn full_name(&self) -> &str {
        &self.name
    }
    fn num_ports(&self) -> u32 {
        self.num_ports
    }
    fn num_vcs(&self) -> u32 {
        self.num_vcs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::congestion::NullSensor;
    use crate::routing::algorithms::DimensionOrder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn flit_lands_in_output_queue_after_step() {
        let mut router = Router::new(
            "r0",
            0,
            2,
            1,
            4,
            4,
            CongestionMode::Output,
            CrossbarModes::default(),
        );
        router.receive_flit(0, 0, Flit::new(0, true, true), VTime::new(0, 0)).unwrap();

        let algo = DimensionOrder { radix: 4 };
        let sensor = NullSensor;
        let mut rng = StdRng::seed_from_u64(0);
        let _freed_credits = router.step(|_| 1, &algo, &sensor, &mut rng).unwrap();

        let flit = router.drain_output(1);
        assert!(flit.is_some());
        assert_eq!(flit.unwrap().id, 0);
    }
}
