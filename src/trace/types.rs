use serde::{Deserialize, Serialize};

use crate::net::FrameKind;

/// 一次（发送端, 接收端）尝试的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceOutcome {
    Succeeded,
    Collided,
    /// 连通矩阵里接收端根本听不到发送端
    Unreachable,
}

/// 一条轨迹记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// 开始发送时刻（纳秒，和 `SimTime.0` 同口径）
    pub t_ns: u64,
    /// 发送结束时刻（纳秒）
    pub end_ns: u64,
    pub sender: usize,
    /// 广播帧在无人可达时为空
    pub receiver: Option<usize>,
    pub kind: FrameKind,
    pub bytes: u32,
    pub outcome: TraceOutcome,
    #[serde(default)]
    pub retry: bool,
}

/// 某一类帧的结果计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceSummary {
    pub succeeded: u64,
    pub collided: u64,
    pub unreachable: u64,
}

impl TraceSummary {
    pub fn total(&self) -> u64 {
        self.succeeded + self.collided + self.unreachable
    }

    /// 可达尝试中发生碰撞的比例；没有可达尝试时为 0
    pub fn collision_rate(&self) -> f64 {
        let reachable = self.succeeded + self.collided;
        if reachable == 0 {
            return 0.0;
        }
        self.collided as f64 / reachable as f64
    }
}

/// 内存中的轨迹收集器（仿真结束后可整体写成 JSON）
#[derive(Debug, Default, Clone)]
pub struct TraceLog {
    pub records: Vec<TraceRecord>,
}

impl TraceLog {
    pub fn push(&mut self, rec: TraceRecord) {
        self.records.push(rec);
    }

    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 按帧类型（以及可选的接收端）汇总
    pub fn summary(&self, kind: FrameKind, receiver: Option<usize>) -> TraceSummary {
        let mut s = TraceSummary::default();
        let matching = self
            .records
            .iter()
            .filter(|r| r.kind == kind)
            .filter(|r| receiver.is_none() || r.receiver == receiver);
        for r in matching {
            match r.outcome {
                TraceOutcome::Succeeded => s.succeeded += 1,
                TraceOutcome::Collided => s.collided += 1,
                TraceOutcome::Unreachable => s.unreachable += 1,
            }
        }
        s
    }

    pub fn collision_rate(&self, kind: FrameKind, receiver: Option<usize>) -> f64 {
        self.summary(kind, receiver).collision_rate()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.records)
    }
}
