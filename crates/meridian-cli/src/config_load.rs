//! Loads and validates a [`SimulationConfig`] from a JSON file on disk.
//! Grounded on the `anyhow::Context`-chained error style used throughout
//! the agent crate's startup paths (e.g. `strata-agent::main`'s
//! `cli.portal_addr.parse()?`), adapted to file I/O.

use std::path::Path;

use anyhow::{Context, Result};
use meridian_core::config::SimulationConfig;

pub fn load(path: &Path) -> Result<SimulationConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let config: SimulationConfig = serde_json::from_str(&raw)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &SimulationConfig) -> Result<()> {
    if config.router.num_ports == 0 {
        anyhow::bail!("router.num_ports must be at least 1");
    }
    if config.router.num_vcs == 0 {
        anyhow::bail!("router.num_vcs must be at least 1");
    }
    if config.channel.latency == 0 {
        anyhow::bail!("channel.latency must be at least 1 cycle");
    }
    if let meridian_core::config::RoutingConfig::Adaptive { max_outputs, .. } = &config.routing {
        if *max_outputs == 0 {
            anyhow::bail!("routing.max_outputs must be at least 1");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct TempFile(std::path::PathBuf);

    impl TempFile {
        fn new(name: &str, contents: &str) -> Self {
            let mut path = std::env::temp_dir();
            path.push(name);
            let mut f = std::fs::File::create(&path).unwrap();
            f.write_all(contents.as_bytes()).unwrap();
            TempFile(path)
        }
    }

    impl Drop for TempFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    fn rejects_zero_ports() {
        let json = r#"{
            "seed": 1,
            "channel": {"latency": 1},
            "router": {
                "num_ports": 0, "num_vcs": 1,
                "input_queue_depth": 4, "output_queue_depth": 4,
                "congestion": {"mode": "null"}, "crossbar": {}
            },
            "routing": {"algorithm": "dimension_order", "radix": 1}
        }"#;
        let file = TempFile::new("meridian-cfg-test-zero-ports.json", json);
        let err = load(&file.0).unwrap_err();
        assert!(err.to_string().contains("num_ports"));
    }

    #[test]
    fn loads_valid_config() {
        let json = r#"{
            "seed": 1,
            "channel": {"latency": 2},
            "router": {
                "num_ports": 5, "num_vcs": 2,
                "input_queue_depth": 4, "output_queue_depth": 4,
                "congestion": {"mode": "null"}, "crossbar": {}
            },
            "routing": {"algorithm": "dimension_order", "radix": 4}
        }"#;
        let file = TempFile::new("meridian-cfg-test-valid.json", json);
        let config = load(&file.0).unwrap();
        assert_eq!(config.router.num_ports, 5);
    }
}
