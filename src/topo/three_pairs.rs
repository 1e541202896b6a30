//! 三对节点的部分连通拓扑
//!
//! 三个 AP（A、B、C）各带一个站点（a、b、c），业务流 A->a、B->b、C->c。
//! 中间一对 B/b 能听到两侧的大部分节点，两侧的 A/a 与 C/c 互相听不到。

use super::WlanOpts;
use crate::error::SimError;
use crate::net::{FlowId, NodeId, NodeRole};
use crate::scenario::Scenario;

#[derive(Debug, Clone, Copy)]
pub struct ThreePairs {
    /// [A, B, C]
    pub aps: [NodeId; 3],
    /// [a, b, c]
    pub stations: [NodeId; 3],
    pub flows: [FlowId; 3],
}

pub fn build_three_pairs(opts: &WlanOpts) -> Result<(Scenario, ThreePairs), SimError> {
    let mut sc = opts.scenario()?;
    let net = sc.network_mut();
    let ap_a = net.add_node("A", NodeRole::Coordinator);
    let sta_a = net.add_node("a", NodeRole::Peer);
    let ap_b = net.add_node("B", NodeRole::Coordinator);
    let sta_b = net.add_node("b", NodeRole::Peer);
    let ap_c = net.add_node("C", NodeRole::Coordinator);
    let sta_c = net.add_node("c", NodeRole::Peer);

    let pairs = [
        (sta_a, ap_a),
        (sta_b, ap_b),
        (sta_c, ap_c),
        (sta_a, sta_b),
        (sta_b, sta_c),
        (ap_a, ap_b),
        (ap_b, ap_c),
        (sta_a, ap_b),
        (ap_a, sta_b),
        (sta_b, ap_c),
        (ap_b, sta_c),
    ];
    for (x, y) in pairs {
        net.set_symmetric_loss(x, y, opts.link_loss_db)?;
    }

    let flows = [
        opts.unicast_flow(&mut sc, ap_a, sta_a)?,
        opts.unicast_flow(&mut sc, ap_b, sta_b)?,
        opts.unicast_flow(&mut sc, ap_c, sta_c)?,
    ];
    Ok((
        sc,
        ThreePairs {
            aps: [ap_a, ap_b, ap_c],
            stations: [sta_a, sta_b, sta_c],
            flows,
        },
    ))
}
