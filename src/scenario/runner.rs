use tracing::info;

use super::spec::{ms_to_time, FlowSpec, ScenarioSpec};
use crate::error::{ConfigError, SimError};
use crate::mac::{MacConfig, MacStats};
use crate::net::{Destination, FlowId, FlowStatistics, Network, NodeId, PhyConfig, WifiWorld, DEFAULT_SEED};
use crate::sim::{SimTime, Simulator};
use crate::trace::TraceLog;
use crate::traffic::{FlowConfig, OnOff};

/// 一个组装好的场景：仿真器 + 无线世界
pub struct Scenario {
    sim: Simulator,
    world: WifiWorld,
}

impl Scenario {
    /// 空场景（节点、链路、流由调用方继续添加）
    pub fn new(phy: PhyConfig, mac: MacConfig, seed: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            sim: Simulator::default(),
            world: WifiWorld::new(Network::new(phy, mac, seed)?),
        })
    }

    /// 按场景文件构建；所有配置错误都在运行前返回
    pub fn build(spec: &ScenarioSpec) -> Result<Self, SimError> {
        if spec.nodes.is_empty() {
            return Err(ConfigError::NoNodes.into());
        }
        let mut sc = Self::new(spec.phy_config(), spec.mac_config(), spec.seed.unwrap_or(DEFAULT_SEED))?;

        for (i, n) in spec.nodes.iter().enumerate() {
            let name = n.name.clone().unwrap_or_else(|| format!("n{i}"));
            sc.network_mut().add_node(name, n.role);
        }
        for l in &spec.links {
            let (a, b) = (NodeId(l.from), NodeId(l.to));
            if l.symmetric {
                sc.network_mut().set_symmetric_loss(a, b, l.loss_db)?;
            } else {
                sc.network_mut().set_loss(a, b, l.loss_db)?;
            }
        }
        for (i, f) in spec.flows.iter().enumerate() {
            let cfg = flow_config(i, f)?;
            sc.add_flow(cfg)?;
        }
        info!(
            nodes = spec.nodes.len(),
            links = spec.links.len(),
            flows = spec.flows.len(),
            "🧩 场景构建完成"
        );
        Ok(sc)
    }

    pub fn add_flow(&mut self, cfg: FlowConfig) -> Result<FlowId, SimError> {
        self.world.net.add_flow(cfg, &mut self.sim)
    }

    /// 运行到 `until`，返回各流统计
    pub fn run(&mut self, until: SimTime) -> Result<FlowStatistics, SimError> {
        self.sim.run_until(until, &mut self.world)?;
        Ok(self.world.net.flow_statistics())
    }

    pub fn now(&self) -> SimTime {
        self.sim.now()
    }

    pub fn network(&self) -> &Network {
        &self.world.net
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.world.net
    }

    pub fn trace(&self) -> &TraceLog {
        &self.world.net.trace
    }

    pub fn mac_stats(&self, node: NodeId) -> Option<&MacStats> {
        self.world.net.mac_stats(node)
    }

    pub fn into_trace(self) -> TraceLog {
        self.world.net.trace
    }
}

fn flow_config(i: usize, f: &FlowSpec) -> Result<FlowConfig, ConfigError> {
    let bad_time = ConfigError::InvalidFlow {
        flow: i,
        reason: "times must be finite and non-negative",
    };
    let start = ms_to_time(f.start_ms).ok_or_else(|| bad_time.clone())?;
    let stop = ms_to_time(f.stop_ms).ok_or_else(|| bad_time.clone())?;
    let on_off = match (f.on_ms, f.off_ms) {
        (None, None) => None,
        (on, off) => Some(OnOff {
            on: match on {
                Some(ms) => ms_to_time(ms).ok_or_else(|| bad_time.clone())?,
                None => stop.saturating_sub(start),
            },
            off: match off {
                Some(ms) => ms_to_time(ms).ok_or_else(|| bad_time.clone())?,
                None => SimTime::ZERO,
            },
        }),
    };
    Ok(FlowConfig {
        src: NodeId(f.src),
        dst: f.dst.map(|d| Destination::Unicast(NodeId(d))).unwrap_or(Destination::Broadcast),
        payload_bytes: f.payload_bytes,
        rate_bps: f.rate_bps,
        start,
        stop,
        on_off,
    })
}

/// 构建并运行场景，返回各流统计
pub fn run_scenario(spec: &ScenarioSpec, until: SimTime) -> Result<FlowStatistics, SimError> {
    let mut sc = Scenario::build(spec)?;
    sc.run(until)
}
