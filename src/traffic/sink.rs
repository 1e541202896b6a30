//! 接收端
//!
//! 统计到达的数据报及到达顺序。不重排也不去重，空洞与乱序原样保留。

use crate::sim::SimTime;

use super::datagram::Datagram;

#[derive(Debug, Clone, Default)]
pub struct FlowSink {
    received: u64,
    received_bytes: u64,
    latency_sum_ns: u128,
    arrivals: Vec<u64>,
}

impl FlowSink {
    pub fn on_receive(&mut self, d: &Datagram, now: SimTime) {
        self.received += 1;
        self.received_bytes += d.size_bytes as u64;
        self.latency_sum_ns += now.saturating_sub(d.created_at).as_nanos() as u128;
        self.arrivals.push(d.seq);
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn received_bytes(&self) -> u64 {
        self.received_bytes
    }

    /// 按到达顺序排列的序号
    pub fn arrivals(&self) -> &[u64] {
        &self.arrivals
    }

    pub fn mean_latency(&self) -> Option<SimTime> {
        if self.received == 0 {
            return None;
        }
        Some(SimTime((self.latency_sum_ns / self.received as u128) as u64))
    }
}
