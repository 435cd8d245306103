//! Owns every structural object in a simulation run — routers, interfaces,
//! channels — behind the dense-integer handles in [`crate::ids`], and
//! drives the event kernel's dispatch loop. Grounded on the ownership
//! pattern in `strata-bonding::runtime::BondingRuntime` (one top-level
//! struct assembling and owning every worker/link) generalized from a
//! threaded runtime to a single-threaded simulation driver, and on
//! `network/NetworkFactory.h`'s role as the thing that assembles a
//! concrete topology's routers/channels — here split into the `Topology`
//! trait a `meridian-cli` topology implements.

use crate::component::ComponentRegistry;
use crate::event::EventKernel;
use crate::ids::{ChannelId, InterfaceId, RouterId};
use crate::time::ClockPeriods;

/// A concrete topology supplies the wiring: how many routers/interfaces it
/// has and which channel connects which pair of ports. `meridian-core`
/// never enumerates topology families itself (spec §1 Non-goals) — this is
/// the seam a `meridian-cli` topology module implements.
pub trait Topology {
    fn num_routers(&self) -> u32;
    fn num_interfaces(&self) -> u32;

    /// The router id and input port a given interface's output channel
    /// feeds into.
    fn interface_to_router(&self, interface: InterfaceId) -> (RouterId, u32);

    /// The router id and input port a given router's output port's channel
    /// feeds into (`None` if that port leads to an interface, not another
    /// router).
    fn router_to_router(&self, router: RouterId, port: u32) -> Option<(RouterId, u32)>;
}

/// Top-level simulation state: the event kernel, the debug-name registry,
/// and the seeded PRNG every stochastic decision in the run draws from —
/// never a module-local RNG, per spec §5's determinism invariant.
pub struct Network {
    pub kernel: EventKernel,
    pub registry: ComponentRegistry,
    pub rng: rand::rngs::StdRng,
    channel_ids: Vec<ChannelId>,
}

impl Network {
    pub fn new(seed: u64, debug_names: &[String]) -> Self {
        Self::with_periods(seed, debug_names, ClockPeriods::default())
    }

    pub fn with_periods(seed: u64, debug_names: &[String], periods: ClockPeriods) -> Self {
        use rand::SeedableRng;
        Network {
            kernel: EventKernel::with_periods(periods),
            registry: ComponentRegistry::new(debug_names),
            rng: rand::rngs::StdRng::seed_from_u64(seed),
            channel_ids: Vec::new(),
        }
    }

    pub fn allocate_channel(&mut self) -> ChannelId {
        let id = ChannelId(self.channel_ids.len());
        self.channel_ids.push(id);
        id
    }

    pub fn num_channels(&self) -> usize {
        self.channel_ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_produces_same_rng_sequence() {
        use rand::RngCore;
        let mut a = Network::new(7, &[]);
        let mut b = Network::new(7, &[]);
        for _ in 0..10 {
            assert_eq!(a.rng.next_u64(), b.rng.next_u64());
        }
    }

    #[test]
    fn channel_ids_are_sequential() {
        let mut net = Network::new(1, &[]);
        let c0 = net.allocate_channel();
        let c1 = net.allocate_channel();
        assert_eq!(c0, ChannelId(0));
        assert_eq!(c1, ChannelId(1));
        assert_eq!(net.num_channels(), 2);
    }
}
