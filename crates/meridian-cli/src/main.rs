//! Command-line simulation runner.
//!
//! Loads a JSON config, builds the chosen topology, wires routers,
//! channels, and interfaces together, and drives the cycle loop until
//! every terminal's traffic source is exhausted and the network has
//! drained. Grounded on `strata-agent::main`'s clap-derived CLI plus
//! `tracing_subscriber::fmt` startup sequence, adapted from an async
//! daemon to a single-threaded cycle-stepped driver.

mod app;
mod config_load;
mod log;
mod topology;

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use meridian_core::congestion::{CongestionSensor, NullSensor};
use meridian_core::flit::{Flit, Packet};
use meridian_core::ids::{InterfaceId, RouterId};
use meridian_core::interface::{Interface, VcSelection};
use meridian_core::network::{Network, Topology};
use meridian_core::router::input_queued::Router;
use meridian_core::router::CongestionMode;
use meridian_core::routing::algorithms::DimensionOrder;
use meridian_core::routing::{Response, RoutingAlgorithm};
use meridian_core::scheduler::crossbar_scheduler::CrossbarModes;
use meridian_core::stats::TerminalStats;
use meridian_core::time::VTime;
use meridian_core::workload::MessageSource;
use rand::RngCore;
use tracing_subscriber::EnvFilter;

use app::stream::StreamSource;
use log::message_log::MessageLog;
use topology::mesh2d::Mesh2d;
use topology::point_to_point::PointToPoint;

/// Simulator CLI: drives a cycle-stepped run and writes a message log.
#[derive(Parser, Debug)]
#[command(name = "meridian", about = "Cycle-accurate interconnection network simulator")]
struct Cli {
    /// Path to a simulation config JSON file.
    #[arg(long)]
    config: PathBuf,

    /// Topology to build: "point-to-point" or "mesh:<width>x<height>".
    #[arg(long, default_value = "point-to-point")]
    topology: String,

    /// Override the config's seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Component full names to enable debug logging for.
    #[arg(long, value_delimiter = ',')]
    debug: Vec<String>,

    /// Number of messages each terminal injects.
    #[arg(long, default_value_t = 10)]
    num_messages: u32,

    /// Flits per message.
    #[arg(long, default_value_t = 8)]
    message_size: u32,

    /// Cycles between message injections at a terminal.
    #[arg(long, default_value_t = 1)]
    interval: u64,

    /// Upper bound on simulated cycles, as a safety net against a
    /// misconfigured run that never drains.
    #[arg(long, default_value_t = 100_000)]
    max_cycles: u64,

    /// Directory to write message_log.csv.gz into (defaults to the OS
    /// temp directory).
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

/// Point-to-point's single router has exactly two ports, one per
/// interface; routing is just "send it out the other one". Grounded on
/// `network/NetworkFactory.h`'s handling of the minimal two-node case,
/// where a real routing algorithm has nothing to decide.
struct PassThroughRouting;

impl RoutingAlgorithm for PassThroughRouting {
    fn route(
        &self,
        _packet: &mut Packet,
        _current_router: u32,
        _destination: u32,
        input_port: u32,
        input_vc: u32,
        _sensor: &dyn CongestionSensor,
        _num_vcs: u32,
        _rng: &mut dyn RngCore,
    ) -> Response {
        Response::single(if input_port == 0 { 1 } else { 0 }, input_vc)
    }
}

fn build_topology(spec: &str) -> Result<(Box<dyn Topology>, Box<dyn RoutingAlgorithm>)> {
    if spec == "point-to-point" {
        return Ok((Box::new(PointToPoint), Box::new(PassThroughRouting)));
    }
    if let Some(dims) = spec.strip_prefix("mesh:") {
        let (w, h) = dims.split_once('x').context("mesh topology must be WxH, e.g. mesh:4x4")?;
        let width: u32 = w.parse().context("invalid mesh width")?;
        let height: u32 = h.parse().context("invalid mesh height")?;
        return Ok((Box::new(Mesh2d::new(width, height)), Box::new(DimensionOrder { radix: width.max(height).max(1) })));
    }
    anyhow::bail!("unknown topology '{spec}', expected 'point-to-point' or 'mesh:WxH'")
}

struct MessageMeta {
    source: u32,
    destination: u32,
    num_flits: usize,
    start: VTime,
}

fn interface_for_router_port(topo: &dyn Topology, router: u32, port: u32) -> Option<u32> {
    (0..topo.num_interfaces()).find(|&i| topo.interface_to_router(InterfaceId(i as usize)) == (RouterId(router as usize), port))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = config_load::load(&cli.config)?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    tracing::info!(topology = %cli.topology, seed = config.seed, "meridian starting");

    let (topo, routing_algorithm) = build_topology(&cli.topology)?;
    let clock_periods = config.clock_periods();
    let mut net = Network::with_periods(config.seed, &cli.debug, clock_periods);

    let num_routers = topo.num_routers();
    let num_interfaces = topo.num_interfaces();

    let mut routers: Vec<Router> = (0..num_routers)
        .map(|id| {
            Router::new(
                format!("router{id}"),
                id,
                config.router.num_ports,
                config.router.num_vcs,
                config.router.input_queue_depth,
                CongestionMode::Output,
                CrossbarModes::default(),
            )
        })
        .collect();

    let mut uplinks: Vec<meridian_core::channel::Channel> = (0..num_interfaces)
        .map(|i| meridian_core::channel::Channel::with_periods(format!("if{i}_up"), config.channel.latency, clock_periods))
        .collect();
    let mut downlinks: Vec<meridian_core::channel::Channel> = (0..num_interfaces)
        .map(|i| meridian_core::channel::Channel::with_periods(format!("if{i}_down"), config.channel.latency, clock_periods))
        .collect();

    let mut router_links: HashMap<(u32, u32), meridian_core::channel::Channel> = HashMap::new();
    // Reverse lookup: (downstream router, downstream port) -> the upstream
    // (router, port) channel key carrying flits into it, so a freed input
    // buffer slot can send its credit back over the same channel.
    let mut router_link_sources: HashMap<(u32, u32), (u32, u32)> = HashMap::new();
    for r in 0..num_routers {
        for port in 0..config.router.num_ports {
            if let Some((next_router, next_port)) = topo.router_to_router(RouterId(r as usize), port) {
                router_links.insert(
                    (r, port),
                    meridian_core::channel::Channel::with_periods(format!("router{r}_p{port}"), config.channel.latency, clock_periods),
                );
                router_link_sources.insert((next_router.0 as u32, next_port), (r, port));
            }
        }
    }

    let mut vcs_per_class = HashMap::new();
    vcs_per_class.insert(0, (0..config.router.num_vcs).collect::<Vec<_>>());
    let mut interfaces: Vec<Interface> =
        (0..num_interfaces).map(|i| Interface::new(format!("if{i}"), VcSelection::Random, vcs_per_class.clone())).collect();

    let mut sources: Vec<StreamSource> = (0..num_interfaces)
        .map(|i| {
            let dest = (i + 1) % num_interfaces.max(1);
            StreamSource::new(i, dest, cli.num_messages, cli.message_size, cli.interval)
        })
        .collect();

    let sensor = NullSensor;

    let mut flit_destination_router: HashMap<u32, u32> = HashMap::new();
    let mut flit_message: HashMap<u32, u64> = HashMap::new();
    let mut message_info: HashMap<u64, MessageMeta> = HashMap::new();
    let mut next_global_flit_id: u32 = 0;

    let mut stats = TerminalStats::default();
    let log_path = cli.log_dir.unwrap_or_else(std::env::temp_dir).join("message_log.csv.gz");
    let mut message_log = MessageLog::create(&log_path).context("creating message log")?;

    let mut now = VTime::ZERO;
    let mut cycle: u64 = 0;
    loop {
        if cycle >= cli.max_cycles {
            tracing::warn!(max_cycles = cli.max_cycles, "run hit the cycle safety net before draining");
            break;
        }
        let all_exhausted = sources.iter().all(MessageSource::is_exhausted);
        if all_exhausted && message_info.is_empty() && cycle > 0 {
            break;
        }

        for i in 0..num_interfaces {
            if let Some(mut message) = sources[i as usize].poll(now, &mut net.rng) {
                interfaces[i as usize].inject(&mut message, cli.message_size);
                let (dest_router, _) = topo.interface_to_router(InterfaceId(message.destination as usize));
                message_info.insert(
                    message.id,
                    MessageMeta { source: message.source, destination: message.destination, num_flits: message.num_flits(), start: now },
                );
                stats.record_injection(message.num_flits() as u64);
                for packet in &message.packets {
                    for flit in &packet.flits {
                        let id = next_global_flit_id;
                        next_global_flit_id += 1;
                        let mut f = flit.clone();
                        f.id = id;
                        f.send_time = Some(now);
                        flit_destination_router.insert(id, dest_router.0 as u32);
                        flit_message.insert(id, message.id);
                        uplinks[i as usize].send_flit(f, now);
                    }
                }
            }
        }

        for i in 0..num_interfaces {
            if let Some(flit) = uplinks[i as usize].receive_flit(now) {
                let (router, port) = topo.interface_to_router(InterfaceId(i as usize));
                let _ = routers[router.0].receive_flit(port, flit.vc, flit, now);
            }
        }
        for ((r, port), chan) in router_links.iter_mut() {
            if let Some(flit) = chan.receive_flit(now) {
                if let Some((next_router, next_port)) = topo.router_to_router(RouterId(*r as usize), *port) {
                    let _ = routers[next_router.0].receive_flit(next_port, flit.vc, flit, now);
                }
            }
            if let Some(credit) = chan.receive_credit(now) {
                routers[*r as usize].receive_credit(*port, credit)?;
            }
        }

        for r in 0..num_routers {
            let destination_of = |flit: &Flit| *flit_destination_router.get(&flit.id).unwrap_or(&r);
            let (delivered, freed_credits) = routers[r as usize].step(destination_of, routing_algorithm.as_ref(), &sensor, &mut net.rng)?;
            for (out_port, out_vc, flit) in delivered {
                if let Some(iface) = interface_for_router_port(topo.as_ref(), r, out_port) {
                    downlinks[iface as usize].send_flit(flit, now);
                    // Interfaces absorb flits unconditionally, so their
                    // output vc's credit is refunded the same cycle it is
                    // spent rather than waiting on a round trip.
                    let mut credit = meridian_core::flit::Credit::new();
                    credit.put_num(out_vc);
                    routers[r as usize].receive_credit(out_port, credit)?;
                } else if let Some((next_router, next_port)) = topo.router_to_router(RouterId(r as usize), out_port) {
                    if let Some(chan) = router_links.get_mut(&(next_router.0 as u32, next_port)) {
                        chan.send_flit(flit, now);
                    }
                }
            }
            // Batch every freed vc for the same upstream channel into one
            // credit packet: a channel carries at most one credit per cycle.
            let mut outgoing_credits: HashMap<(u32, u32), meridian_core::flit::Credit> = HashMap::new();
            for (in_port, in_vc) in freed_credits {
                if let Some(&(up_router, up_port)) = router_link_sources.get(&(r, in_port)) {
                    outgoing_credits.entry((up_router, up_port)).or_default().put_num(in_vc);
                }
                // Interface-facing ports need no credit back; the interface
                // absorbs flits unconditionally.
            }
            for (link_key, credit) in outgoing_credits {
                if let Some(chan) = router_links.get_mut(&link_key) {
                    chan.send_credit(credit, now);
                }
            }
        }

        for i in 0..num_interfaces {
            if let Some(flit) = downlinks[i as usize].receive_flit(now) {
                if flit.is_tail {
                    if let Some(message_id) = flit_message.get(&flit.id).copied() {
                        if let Some(meta) = message_info.remove(&message_id) {
                            let mut message = meridian_core::flit::Message::new(message_id, meta.source, meta.destination, 0);
                            message.packets.push(Packet::new(0, message_id, meta.num_flits as u32));
                            message_log.record(&message, meta.start, now)?;
                            stats.record_delivery(meta.num_flits as u64, now.tick.saturating_sub(meta.start.tick));
                        }
                    }
                }
                flit_destination_router.remove(&flit.id);
                flit_message.remove(&flit.id);
            }
        }

        now = VTime::new(now.tick + 1, 0);
        cycle += 1;
    }

    message_log.finish().context("flushing message log")?;

    tracing::info!(
        messages_delivered = stats.messages_delivered,
        mean_latency = stats.mean_latency(),
        cycles = cycle,
        log_path = %log_path.display(),
        "meridian run complete"
    );

    Ok(())
}
