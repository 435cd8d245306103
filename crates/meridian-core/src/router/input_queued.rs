//! Input-queued router: buffering lives only at the input side; a granted
//! flit crosses the crossbar straight onto its output channel the same
//! cycle. Grounded on `router/inputqueued/Router.h`.

use super::{CongestionMode, RouterContract};
use crate::allocator::pick_random;
use crate::congestion::CongestionSensor;
use crate::crossbar::Crossbar;
use crate::flit::Flit;
use crate::queue::input_queue::{InputQueue, InputQueueConfig};
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
        congestion_mode: CongestionMode,
        crossbar_modes: CrossbarModes,
    ) -> Self {
        let name = name.into();
        let mut queues = HashMap::new();
        for port in 0..num_ports {
            for vc in 0..num_vcs {
                queues.insert(
                    (port, vc),
                    InputQueue::new(port, vc, InputQueueConfig { depth: input_depth, vca_swa_wait: false }),
                );
            }
        }
        let num_clients = (num_ports * num_vcs) as usize;
        let num_output_vcs = num_clients;
        let mut crossbar_scheduler =
            CrossbarScheduler::new("xbar_sched", num_clients, num_ports as usize, num_output_vcs, crossbar_modes);
        for output_vc_idx in 0..num_output_vcs {
            crossbar_scheduler.init_credits(output_vc_idx, input_depth);
        }
        Router {
            name,
            id,
            num_ports,
            num_vcs,
            congestion_mode,
            queues,
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

    /// Drive one full cycle: RFE → VCA → SWA → crossbar. Returns the flits
    /// that successfully crossed this cycle as `(out_port, out_vc, flit)`,
    /// plus the `(in_port, in_vc)` pairs whose input buffer freed a slot —
    /// the caller turns each into a credit sent back upstream.
    #[allow(clippy::too_many_arguments)]
    pub fn step(
        &mut self,
        destination_of: impl Fn(&Flit) -> u32,
        routing_algorithm: &dyn RoutingAlgorithm,
        sensor: &dyn CongestionSensor,
        rng: &mut dyn RngCore,
    ) -> crate::error::Result<(Vec<(u32, u32, Flit)>, Vec<(u32, u32)>)> {
        // RFE (head flits only)
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

        // advance RFE -> VCA, collect VCA requests (head flits only)
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

        // advance VCA -> SWA (head flits); body/tail flits bypass both
        // stages and go straight to SWA with the packet's held (port, vc).
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
            }
        }
        let xbar_grants = self.crossbar_scheduler.allocate();

        let mut delivered = Vec::new();
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
                        delivered.push((out_port as u32, vc, flit));
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
        Ok((delivered, freed_credits))
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
    fn single_flit_crosses_in_one_step() {
        let mut router = Router::new(
            "r0",
            0,
            2,
            1,
            4,
            CongestionMode::Output,
            CrossbarModes::default(),
        );
        router.receive_flit(0, 0, Flit::new(0, true, true), VTime::new(0, 0)).unwrap();

        let algo = DimensionOrder { radix: 4 };
        let sensor = NullSensor;
        let mut rng = StdRng::seed_from_u64(0);
        let (delivered, _freed_credits) = router.step(|_| 1, &algo, &sensor, &mut rng).unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].2.id, 0);
    }
}
