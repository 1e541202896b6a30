//! 帧类型
//!
//! 定义 MAC 帧及其目的地址。

use serde::{Deserialize, Serialize};

use super::id::NodeId;
use crate::sim::SimTime;
use crate::traffic::Datagram;

/// 帧类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Data,
    Rts,
    Cts,
    Ack,
}

/// 目的地址：单播或广播
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Unicast(NodeId),
    Broadcast,
}

impl Destination {
    pub fn node(self) -> Option<NodeId> {
        match self {
            Destination::Unicast(id) => Some(id),
            Destination::Broadcast => None,
        }
    }
}

/// MAC 帧
#[derive(Debug, Clone)]
pub struct Frame {
    pub kind: FrameKind,
    pub src: NodeId,
    pub dst: Destination,
    pub size_bytes: u32,
    /// 空口时长
    pub airtime: SimTime,
    /// Duration 字段：旁听到该帧的节点据此设置 NAV
    pub nav: SimTime,
    /// MAC 序列号（12 位），用于接收端去重
    pub seq: u16,
    pub retry: bool,
    pub payload: Option<Datagram>,
}

impl Frame {
    /// 是否单播给 `node`
    pub fn is_for(&self, node: NodeId) -> bool {
        self.dst == Destination::Unicast(node)
    }

    /// 控制帧（不携带业务载荷）
    pub fn control(kind: FrameKind, src: NodeId, dst: NodeId, size_bytes: u32, airtime: SimTime, nav: SimTime) -> Self {
        Self {
            kind,
            src,
            dst: Destination::Unicast(dst),
            size_bytes,
            airtime,
            nav,
            seq: 0,
            retry: false,
            payload: None,
        }
    }
}
