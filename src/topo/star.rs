//! 星型竞争拓扑
//!
//! 一个 AP 与 n 个站点全互联，所有站点同时向 AP 发送。

use super::WlanOpts;
use crate::error::{ConfigError, SimError};
use crate::net::{FlowId, NodeId, NodeRole};
use crate::scenario::Scenario;

#[derive(Debug, Clone)]
pub struct Star {
    pub ap: NodeId,
    pub stations: Vec<NodeId>,
    pub flows: Vec<FlowId>,
}

pub fn build_star(opts: &WlanOpts, n_stations: usize) -> Result<(Scenario, Star), SimError> {
    if n_stations == 0 {
        return Err(ConfigError::NoNodes.into());
    }
    let mut sc = opts.scenario()?;
    let net = sc.network_mut();
    let ap = net.add_node("ap", NodeRole::Coordinator);
    let stations: Vec<NodeId> = (0..n_stations)
        .map(|i| net.add_node(format!("sta{i}"), NodeRole::Peer))
        .collect();

    let all: Vec<NodeId> = std::iter::once(ap).chain(stations.iter().copied()).collect();
    for (i, &x) in all.iter().enumerate() {
        for &y in &all[i + 1..] {
            net.set_symmetric_loss(x, y, opts.link_loss_db)?;
        }
    }

    let mut flows = Vec::with_capacity(n_stations);
    for &s in &stations {
        flows.push(opts.unicast_flow(&mut sc, s, ap)?);
    }
    Ok((sc, Star { ap, stations, flows }))
}
