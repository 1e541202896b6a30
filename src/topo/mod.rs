//! 内置场景拓扑
//!
//! 每个构建函数只负责摆放节点、填写衰减矩阵并挂上业务流。

pub mod exposed_terminal;
pub mod hidden_terminal;
pub mod star;
pub mod three_pairs;

use crate::error::SimError;
use crate::mac::MacConfig;
use crate::net::{Destination, FlowId, NodeId, PhyConfig};
use crate::scenario::Scenario;
use crate::sim::SimTime;
use crate::traffic::FlowConfig;

/// 内置场景共用的配置选项
#[derive(Debug, Clone)]
pub struct WlanOpts {
    pub payload_bytes: u32,
    /// 每条流的 CBR 速率（bps）
    pub rate_bps: u64,
    pub start: SimTime,
    pub stop: SimTime,
    /// 可达链路的衰减（dB）
    pub link_loss_db: f64,
    pub seed: u64,
    pub mac: MacConfig,
    pub phy: PhyConfig,
}

impl Default for WlanOpts {
    fn default() -> Self {
        Self {
            payload_bytes: 1024,
            rate_bps: 11_000_000,
            start: SimTime::from_millis(200),
            stop: SimTime::from_secs(2),
            link_loss_db: 0.0,
            seed: 1,
            mac: MacConfig::default(),
            phy: PhyConfig::default(),
        }
    }
}

impl WlanOpts {
    /// 运行时长：流停止后再留 100ms
    pub fn until(&self) -> SimTime {
        self.stop + SimTime::from_millis(100)
    }

    pub(crate) fn scenario(&self) -> Result<Scenario, SimError> {
        Ok(Scenario::new(self.phy.clone(), self.mac.clone(), self.seed)?)
    }

    pub(crate) fn unicast_flow(&self, sc: &mut Scenario, src: NodeId, dst: NodeId) -> Result<FlowId, SimError> {
        sc.add_flow(FlowConfig {
            src,
            dst: Destination::Unicast(dst),
            payload_bytes: self.payload_bytes,
            rate_bps: self.rate_bps,
            start: self.start,
            stop: self.stop,
            on_off: None,
        })
    }
}
