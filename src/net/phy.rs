//! 物理层时序
//!
//! 物理层被抽象为“是否可达”的二元判断，这里只负责空口时长与帧间隔的计算。
//! 默认值对应 802.11b DSSS 11 Mbps、长前导码。

use crate::error::ConfigError;
use crate::sim::SimTime;

/// RTS 帧长度（字节）
pub const RTS_BYTES: u32 = 20;
/// CTS 帧长度（字节）
pub const CTS_BYTES: u32 = 14;
/// ACK 帧长度（字节）
pub const ACK_BYTES: u32 = 14;
/// 最大 MPDU 长度（字节），RTS 门限不能超过它
pub const MAX_MPDU_BYTES: u32 = 2346;

#[derive(Debug, Clone)]
pub struct PhyConfig {
    /// 数据帧速率（bps）
    pub data_rate_bps: u64,
    /// 控制帧（RTS/CTS/ACK）速率（bps）
    pub control_rate_bps: u64,
    /// PLCP 前导码 + 头部时长
    pub preamble: SimTime,
    pub slot: SimTime,
    pub sifs: SimTime,
    /// 固定传播时延
    pub prop_delay: SimTime,
    /// 数据帧在业务载荷之外的开销：MAC 头 + FCS + LLC/SNAP + IP + UDP
    pub data_overhead_bytes: u32,
    /// 接收门限：衰减超过该值的链路视为不可达
    pub max_loss_db: f64,
}

impl Default for PhyConfig {
    fn default() -> Self {
        Self {
            data_rate_bps: 11_000_000,
            control_rate_bps: 11_000_000,
            preamble: SimTime::from_micros(192),
            slot: SimTime::from_micros(20),
            sifs: SimTime::from_micros(10),
            prop_delay: SimTime::from_micros(1),
            data_overhead_bytes: 64,
            max_loss_db: 100.0,
        }
    }
}

impl PhyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_rate_bps == 0 || self.control_rate_bps == 0 {
            return Err(ConfigError::InvalidPhy("rates must be positive"));
        }
        if self.slot == SimTime::ZERO {
            return Err(ConfigError::InvalidPhy("slot time must be positive"));
        }
        if self.max_loss_db.is_nan() {
            return Err(ConfigError::InvalidPhy("max_loss_db must be a number"));
        }
        Ok(())
    }

    /// DIFS = SIFS + 2 * slot
    pub fn difs(&self) -> SimTime {
        self.sifs + self.slot.times(2)
    }

    /// 以给定速率发送 `bytes` 字节所需的空口时间（含前导码）
    pub fn airtime(&self, bytes: u32, rate_bps: u64) -> SimTime {
        // ceil(bytes*8 / bps) 秒 -> 纳秒
        if rate_bps == 0 {
            return SimTime(u64::MAX / 4);
        }
        let bits = (bytes as u128).saturating_mul(8);
        let nanos = (bits.saturating_mul(1_000_000_000u128) + (rate_bps as u128 - 1)) / rate_bps as u128;
        self.preamble + SimTime(nanos.min(u64::MAX as u128) as u64)
    }

    /// 携带 `payload_bytes` 业务载荷的数据帧长度
    pub fn data_frame_bytes(&self, payload_bytes: u32) -> u32 {
        payload_bytes.saturating_add(self.data_overhead_bytes)
    }

    pub fn data_airtime(&self, payload_bytes: u32) -> SimTime {
        self.airtime(self.data_frame_bytes(payload_bytes), self.data_rate_bps)
    }

    pub fn rts_airtime(&self) -> SimTime {
        self.airtime(RTS_BYTES, self.control_rate_bps)
    }

    pub fn cts_airtime(&self) -> SimTime {
        self.airtime(CTS_BYTES, self.control_rate_bps)
    }

    pub fn ack_airtime(&self) -> SimTime {
        self.airtime(ACK_BYTES, self.control_rate_bps)
    }

    /// 等待响应帧（CTS/ACK）的超时，从请求帧发送结束时刻起算
    pub fn response_timeout(&self, response_airtime: SimTime) -> SimTime {
        self.sifs + response_airtime + self.slot + self.prop_delay.times(2)
    }
}
