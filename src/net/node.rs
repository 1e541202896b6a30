//! 节点类型
//!
//! 定义无线节点：身份、角色、MAC 实例以及接收端去重状态。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::id::NodeId;
use crate::mac::Mac;

/// 节点角色（只影响拓扑构建与展示，不改变 MAC 行为）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// 接入点 / 网络协调者
    Coordinator,
    #[default]
    Peer,
}

/// 信道层面的逐节点计数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeStats {
    /// 送上空口的帧（含响应帧）
    pub frames_sent: u64,
    /// 本节点发出、目标接收端成功解码的帧
    pub tx_succeeded: u64,
    /// 本节点发出、目标接收端碰撞或不可达的帧
    pub tx_failed: u64,
    /// 发给本节点（或广播）并成功解码的帧
    pub rx_decoded: u64,
    /// 发给本节点（或广播）但被破坏的帧
    pub rx_collided: u64,
    /// 被去重过滤掉的重传数据帧
    pub duplicates: u64,
}

/// 无线节点
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    name: String,
    role: NodeRole,
    pub(crate) mac: Mac,
    /// 每个发送端最近一次收到的 MAC 序列号
    last_rx_seq: HashMap<NodeId, u16>,
    pub stats: NodeStats,
}

impl Node {
    /// 创建新节点
    pub fn new(id: NodeId, name: impl Into<String>, role: NodeRole, mac: Mac) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            mac,
            last_rx_seq: HashMap::new(),
            stats: NodeStats::default(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn mac(&self) -> &Mac {
        &self.mac
    }

    /// 记录收到的数据帧序列号；若是重传的重复帧返回 true
    pub(crate) fn is_duplicate(&mut self, from: NodeId, seq: u16, retry: bool) -> bool {
        let prev = self.last_rx_seq.insert(from, seq);
        retry && prev == Some(seq)
    }
}
