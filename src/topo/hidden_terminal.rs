//! 隐藏终端拓扑
//!
//! 拓扑结构：A <-> B <-> C，A 与 C 互相听不到；A、C 同时向 B 发送。

use super::WlanOpts;
use crate::error::SimError;
use crate::net::{FlowId, NodeId, NodeRole};
use crate::scenario::Scenario;

#[derive(Debug, Clone, Copy)]
pub struct HiddenTerminal {
    pub a: NodeId,
    pub b: NodeId,
    pub c: NodeId,
    /// A -> B
    pub flow_a: FlowId,
    /// C -> B
    pub flow_c: FlowId,
}

/// 构建隐藏终端场景
pub fn build_hidden_terminal(opts: &WlanOpts) -> Result<(Scenario, HiddenTerminal), SimError> {
    let mut sc = opts.scenario()?;
    let net = sc.network_mut();
    let a = net.add_node("A", NodeRole::Peer);
    let b = net.add_node("B", NodeRole::Coordinator);
    let c = net.add_node("C", NodeRole::Peer);
    net.set_symmetric_loss(a, b, opts.link_loss_db)?;
    net.set_symmetric_loss(b, c, opts.link_loss_db)?;

    let flow_a = opts.unicast_flow(&mut sc, a, b)?;
    let flow_c = opts.unicast_flow(&mut sc, c, b)?;
    Ok((sc, HiddenTerminal { a, b, c, flow_a, flow_c }))
}
