//! 数据报
//!
//! 作为 MAC 载荷承载的类 UDP 数据报。

use crate::net::{Destination, FlowId, NodeId};
use crate::sim::SimTime;

/// 一个应用层数据报
#[derive(Debug, Clone, PartialEq)]
pub struct Datagram {
    pub flow: FlowId,
    /// 流内序号，从 0 开始
    pub seq: u64,
    pub src: NodeId,
    pub dst: Destination,
    pub size_bytes: u32,
    pub created_at: SimTime,
}
