use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mac::MacConfig;
use crate::net::{NodeRole, PhyConfig};
use crate::sim::SimTime;

/// 场景文件（JSON）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub schema_version: u32,
    #[serde(default)]
    pub meta: Option<ScenarioMeta>,
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    #[serde(default)]
    pub mac: Option<MacSpec>,
    #[serde(default)]
    pub phy: Option<PhySpec>,
    #[serde(default)]
    pub flows: Vec<FlowSpec>,
    #[serde(default)]
    pub seed: Option<u64>,
    /// 仿真运行到多少毫秒
    #[serde(default)]
    pub until_ms: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioMeta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: NodeRole,
}

/// 一条（默认有向的）衰减条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSpec {
    pub from: usize,
    pub to: usize,
    pub loss_db: f64,
    #[serde(default)]
    pub symmetric: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MacSpec {
    #[serde(default)]
    pub rts_threshold: Option<u32>,
    #[serde(default)]
    pub cw_min: Option<u32>,
    #[serde(default)]
    pub cw_max: Option<u32>,
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub queue_pkts: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhySpec {
    #[serde(default)]
    pub data_rate_bps: Option<u64>,
    #[serde(default)]
    pub control_rate_bps: Option<u64>,
    #[serde(default)]
    pub preamble_us: Option<u64>,
    #[serde(default)]
    pub slot_us: Option<u64>,
    #[serde(default)]
    pub sifs_us: Option<u64>,
    #[serde(default)]
    pub prop_delay_ns: Option<u64>,
    #[serde(default)]
    pub data_overhead_bytes: Option<u32>,
    #[serde(default)]
    pub max_loss_db: Option<f64>,
}

/// 业务流；`dst` 省略表示广播
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSpec {
    pub src: usize,
    #[serde(default)]
    pub dst: Option<usize>,
    pub payload_bytes: u32,
    pub rate_bps: u64,
    #[serde(default)]
    pub start_ms: f64,
    pub stop_ms: f64,
    #[serde(default)]
    pub on_ms: Option<f64>,
    #[serde(default)]
    pub off_ms: Option<f64>,
}

impl MacSpec {
    pub fn to_config(&self) -> MacConfig {
        let d = MacConfig::default();
        MacConfig {
            rts_threshold: self.rts_threshold,
            cw_min: self.cw_min.unwrap_or(d.cw_min),
            cw_max: self.cw_max.unwrap_or(d.cw_max),
            max_retries: self.max_retries.unwrap_or(d.max_retries),
            queue_pkts: self.queue_pkts.unwrap_or(d.queue_pkts),
        }
    }
}

impl PhySpec {
    pub fn to_config(&self) -> PhyConfig {
        let d = PhyConfig::default();
        PhyConfig {
            data_rate_bps: self.data_rate_bps.unwrap_or(d.data_rate_bps),
            control_rate_bps: self.control_rate_bps.unwrap_or(d.control_rate_bps),
            preamble: self.preamble_us.map(SimTime::from_micros).unwrap_or(d.preamble),
            slot: self.slot_us.map(SimTime::from_micros).unwrap_or(d.slot),
            sifs: self.sifs_us.map(SimTime::from_micros).unwrap_or(d.sifs),
            prop_delay: self.prop_delay_ns.map(SimTime::from_nanos).unwrap_or(d.prop_delay),
            data_overhead_bytes: self.data_overhead_bytes.unwrap_or(d.data_overhead_bytes),
            max_loss_db: self.max_loss_db.unwrap_or(d.max_loss_db),
        }
    }
}

/// 毫秒（浮点）转仿真时间；负数与非有限值返回 None
pub(crate) fn ms_to_time(ms: f64) -> Option<SimTime> {
    if !ms.is_finite() || ms < 0.0 {
        return None;
    }
    Some(SimTime((ms * 1_000_000.0).round() as u64))
}

impl ScenarioSpec {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn mac_config(&self) -> MacConfig {
        self.mac.clone().unwrap_or_default().to_config()
    }

    pub fn phy_config(&self) -> PhyConfig {
        self.phy.clone().unwrap_or_default().to_config()
    }

    /// 未显式给出运行时长时：最晚的流停止时刻之后再留 100ms 排空队列
    pub fn default_until(&self) -> Result<SimTime, ConfigError> {
        if let Some(ms) = self.until_ms {
            return ms_to_time(ms).ok_or(ConfigError::InvalidDuration("until_ms must be finite and non-negative"));
        }
        let last_stop = self
            .flows
            .iter()
            .filter_map(|f| ms_to_time(f.stop_ms))
            .max()
            .unwrap_or(SimTime::ZERO);
        Ok(last_stop + SimTime::from_millis(100))
    }
}
