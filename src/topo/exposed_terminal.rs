//! 暴露终端拓扑
//!
//! 两对节点 A/a 与 B/b，站点 a 与 b 互相可达：
//!
//! ```text
//! A <-> a <-> b <-> B
//! ```
//!
//! 业务流 a -> A 与 B -> b。B 听不到 a，a 的数据帧在 b 处与 B 的数据帧碰撞；
//! a 又会因 b 回给 B 的 ACK 而推迟发送。

use super::WlanOpts;
use crate::error::SimError;
use crate::net::{FlowId, NodeId, NodeRole};
use crate::scenario::Scenario;

#[derive(Debug, Clone, Copy)]
pub struct ExposedTerminal {
    pub ap_a: NodeId,
    pub sta_a: NodeId,
    pub ap_b: NodeId,
    pub sta_b: NodeId,
    /// a -> A
    pub flow_a: FlowId,
    /// B -> b
    pub flow_b: FlowId,
}

pub fn build_exposed_terminal(opts: &WlanOpts) -> Result<(Scenario, ExposedTerminal), SimError> {
    let mut sc = opts.scenario()?;
    let net = sc.network_mut();
    let ap_a = net.add_node("A", NodeRole::Coordinator);
    let sta_a = net.add_node("a", NodeRole::Peer);
    let ap_b = net.add_node("B", NodeRole::Coordinator);
    let sta_b = net.add_node("b", NodeRole::Peer);
    net.set_symmetric_loss(sta_a, ap_a, opts.link_loss_db)?;
    net.set_symmetric_loss(sta_b, ap_b, opts.link_loss_db)?;
    net.set_symmetric_loss(sta_a, sta_b, opts.link_loss_db)?;

    let flow_a = opts.unicast_flow(&mut sc, sta_a, ap_a)?;
    let flow_b = opts.unicast_flow(&mut sc, ap_b, sta_b)?;
    Ok((
        sc,
        ExposedTerminal {
            ap_a,
            sta_a,
            ap_b,
            sta_b,
            flow_a,
            flow_b,
        },
    ))
}
