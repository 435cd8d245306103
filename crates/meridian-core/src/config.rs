//! Configuration types mirroring the JSON schema described in spec §6.
//! `meridian-core` only owns the pieces that shape simulation mechanics
//! (channel latency, queue depth, congestion/routing knobs); topology
//! layout and workload selection are `meridian-cli` concerns that embed
//! these structs.

use crate::time::ClockPeriods;
use serde::{Deserialize, Serialize};

fn default_cycle_time() -> u64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub latency: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    pub num_ports: u32,
    pub num_vcs: u32,
    pub input_queue_depth: u32,
    pub output_queue_depth: u32,
    pub congestion: CongestionConfig,
    pub crossbar: CrossbarConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CongestionConfig {
    Null,
    BufferOccupancy {
        granularity: CongestionGranularity,
        phantom: Option<PhantomConfig>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CongestionGranularity {
    Vc,
    Port,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhantomConfig {
    pub value_coeff: f64,
    pub length_coeff: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossbarConfig {
    #[serde(default)]
    pub full_packet: bool,
    #[serde(default)]
    pub packet_lock: bool,
    #[serde(default)]
    pub idle_unlock: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum RoutingConfig {
    DimensionOrder { radix: u32 },
    UpDown { up_port: u32, down_ports: Vec<u32> },
    Adaptive {
        max_outputs: usize,
        strategy: ReductionStrategyConfig,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReductionStrategyConfig {
    LeastCongestedMinimal,
    Weighted {
        congestion_bias: f64,
        independent_bias: f64,
        non_minimal_weight_func: NonMinimalWeightFuncConfig,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NonMinimalWeightFuncConfig {
    Regular,
    Bimodal,
    Differential,
    Proportional,
    ProportionalDifferential,
}

/// Top-level simulation settings applicable regardless of topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub seed: u64,
    #[serde(default)]
    pub debug: Vec<String>,
    pub channel: ChannelConfig,
    pub router: RouterConfig,
    pub routing: RoutingConfig,
    /// Ticks per Channel-domain cycle (spec `simulator.cycle_time_channel`).
    #[serde(default = "default_cycle_time")]
    pub cycle_time_channel: u64,
    /// Ticks per Router-domain cycle (spec `simulator.cycle_time_router`).
    #[serde(default = "default_cycle_time")]
    pub cycle_time_router: u64,
    /// Ticks per Interface-domain cycle (spec `simulator.cycle_time_interface`).
    #[serde(default = "default_cycle_time")]
    pub cycle_time_interface: u64,
}

impl SimulationConfig {
    pub fn clock_periods(&self) -> ClockPeriods {
        ClockPeriods::new(self.cycle_time_channel, self.cycle_time_router, self.cycle_time_interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_config() {
        let json = r#"{
            "seed": 42,
            "channel": {"latency": 2},
            "router": {
                "num_ports": 4,
                "num_vcs": 2,
                "input_queue_depth": 8,
                "output_queue_depth": 4,
                "congestion": {"mode": "null"},
                "crossbar": {}
            },
            "routing": {"algorithm": "dimension_order", "radix": 4}
        }"#;
        let cfg: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.router.num_ports, 4);
        assert_eq!(cfg.clock_periods(), ClockPeriods::new(1, 1, 1));
    }

    #[test]
    fn cycle_times_override_defaults() {
        let json = r#"{
            "seed": 42,
            "channel": {"latency": 2},
            "router": {
                "num_ports": 4,
                "num_vcs": 2,
                "input_queue_depth": 8,
                "output_queue_depth": 4,
                "congestion": {"mode": "null"},
                "crossbar": {}
            },
            "routing": {"algorithm": "dimension_order", "radix": 4},
            "cycle_time_channel": 2,
            "cycle_time_router": 3,
            "cycle_time_interface": 4
        }"#;
        let cfg: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.clock_periods(), ClockPeriods::new(2, 3, 4));
    }
}
