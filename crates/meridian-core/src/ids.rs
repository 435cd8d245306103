//! Dense-integer handles for the structural objects `Network` owns.
//!
//! Modeled after `strata-transport::pool::PacketHandle` (a thin `Copy`
//! newtype over a `usize` slab key) rather than pointers or `Rc`/`Arc` —
//! routers, interfaces, and channels never hold cyclic back-references to
//! each other, only these handles, which `Network` resolves.

macro_rules! handle {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);
    };
}

handle!(RouterId);
handle!(InterfaceId);
handle!(ChannelId);

/// A VC index flattened across all ports of a device: `port * num_vcs + vc`.
/// Mirrors `PortedDevice::vcIndex`/`vcIndexInv` in the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VcIndex(pub u32);

impl VcIndex {
    pub fn from_port_vc(num_vcs: u32, port: u32, vc: u32) -> Self {
        VcIndex(port * num_vcs + vc)
    }

    pub fn to_port_vc(self, num_vcs: u32) -> (u32, u32) {
        (self.0 / num_vcs, self.0 % num_vcs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vc_index_roundtrip() {
        let idx = VcIndex::from_port_vc(4, 3, 2);
        assert_eq!(idx.0, 14);
        assert_eq!(idx.to_port_vc(4), (3, 2));
    }
}
