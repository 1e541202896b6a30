//! 连通矩阵（冲突图）
//!
//! 用显式的有向两两可达/衰减表代替几何传播模型。矩阵对所有有序节点对都有定义，
//! 未设置的节点对默认不可达；只有显式设置为对称时才对称。

use serde::{Deserialize, Serialize};

use super::id::NodeId;
use crate::error::ConfigError;

/// 一条有向链路的损耗结果
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkLoss {
    #[default]
    Unreachable,
    Reachable { attenuation_db: f64 },
}

impl LinkLoss {
    pub fn is_reachable(self) -> bool {
        matches!(self, LinkLoss::Reachable { .. })
    }
}

/// 有向连通矩阵
#[derive(Debug, Clone, Default)]
pub struct ConnectivityMatrix {
    n: usize,
    entries: Vec<LinkLoss>,
}

impl ConnectivityMatrix {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            entries: vec![LinkLoss::Unreachable; n.saturating_mul(n)],
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// 扩展到 `n` 个节点，保留已有条目；新节点对默认不可达
    pub fn resize(&mut self, n: usize) {
        if n == self.n {
            return;
        }
        let mut next = vec![LinkLoss::Unreachable; n.saturating_mul(n)];
        let keep = self.n.min(n);
        for a in 0..keep {
            for b in 0..keep {
                next[a * n + b] = self.entries[a * self.n + b];
            }
        }
        self.n = n;
        self.entries = next;
    }

    fn check(&self, id: NodeId) -> Result<(), ConfigError> {
        if id.0 >= self.n {
            return Err(ConfigError::UnknownNode(id.0));
        }
        Ok(())
    }

    fn set(&mut self, a: NodeId, b: NodeId, loss: LinkLoss) -> Result<(), ConfigError> {
        self.check(a)?;
        self.check(b)?;
        if a == b {
            // 节点永远收不到自己的帧
            return Ok(());
        }
        self.entries[a.0 * self.n + b.0] = loss;
        Ok(())
    }

    /// 设置 a -> b 的衰减（有向）
    pub fn set_loss(&mut self, a: NodeId, b: NodeId, attenuation_db: f64) -> Result<(), ConfigError> {
        self.set(a, b, LinkLoss::Reachable { attenuation_db })
    }

    /// 同时设置 a -> b 与 b -> a
    pub fn set_symmetric_loss(&mut self, a: NodeId, b: NodeId, attenuation_db: f64) -> Result<(), ConfigError> {
        self.set_loss(a, b, attenuation_db)?;
        self.set_loss(b, a, attenuation_db)
    }

    /// 显式把 a -> b 设为不可达
    pub fn set_unreachable(&mut self, a: NodeId, b: NodeId) -> Result<(), ConfigError> {
        self.set(a, b, LinkLoss::Unreachable)
    }

    /// 查询 a -> b；任何越界或未设置的节点对都返回不可达
    pub fn query(&self, a: NodeId, b: NodeId) -> LinkLoss {
        if a.0 >= self.n || b.0 >= self.n || a == b {
            return LinkLoss::Unreachable;
        }
        self.entries[a.0 * self.n + b.0]
    }

    /// 能收到 `a` 所发帧的所有节点（按 id 升序）
    pub fn reachable_from(&self, a: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.n)
            .map(NodeId)
            .filter(move |&b| self.query(a, b).is_reachable())
    }
}
