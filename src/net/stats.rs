//! 统计信息
//!
//! 定义按业务流汇总的投递统计。

use serde::Serialize;

/// 单条业务流的统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowReport {
    pub flow: usize,
    pub src: usize,
    /// 广播流为空
    pub dst: Option<usize>,
    pub sent: u64,
    pub received: u64,
    pub received_bytes: u64,
    /// MAC 确认送达（广播流：发送完毕）的数据报
    pub delivery_succeeded: u64,
    /// MAC 重传耗尽的数据报
    pub delivery_failed: u64,
    pub queue_drops: u64,
    pub mean_latency_ns: Option<u64>,
    /// 接收字节数按流的活跃时长折算（bps）
    pub goodput_bps: f64,
}

impl FlowReport {
    /// 发送但未被接收的比例
    pub fn loss_ratio(&self) -> f64 {
        if self.sent == 0 {
            return 0.0;
        }
        1.0 - (self.received.min(self.sent) as f64 / self.sent as f64)
    }
}

/// 所有业务流的统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowStatistics {
    pub flows: Vec<FlowReport>,
}

impl FlowStatistics {
    pub fn get(&self, flow: usize) -> Option<&FlowReport> {
        self.flows.get(flow)
    }

    pub fn total_sent(&self) -> u64 {
        self.flows.iter().map(|f| f.sent).sum()
    }

    pub fn total_received(&self) -> u64 {
        self.flows.iter().map(|f| f.received).sum()
    }
}

impl std::fmt::Display for FlowReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dst = match self.dst {
            Some(d) => d.to_string(),
            None => "broadcast".to_string(),
        };
        write!(
            f,
            "flow={} src={} dst={} sent={} received={} loss={:.3} failed={} queue_drops={} goodput_bps={:.0}",
            self.flow,
            self.src,
            dst,
            self.sent,
            self.received,
            self.loss_ratio(),
            self.delivery_failed,
            self.queue_drops,
            self.goodput_bps
        )?;
        if let Some(ns) = self.mean_latency_ns {
            write!(f, " mean_latency_us={:.1}", ns as f64 / 1_000.0)?;
        }
        Ok(())
    }
}
