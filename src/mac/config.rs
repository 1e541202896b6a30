//! MAC 配置

use crate::error::ConfigError;
use crate::net::MAX_MPDU_BYTES;
use crate::queue::DEFAULT_QUEUE_PKTS;

#[derive(Debug, Clone)]
pub struct MacConfig {
    /// RTS 门限：载荷超过该值的单播数据帧先做 RTS/CTS 握手；`Some(0)` 表示所有单播
    /// 数据帧都用 RTS/CTS，`None` 表示关闭。
    pub rts_threshold: Option<u32>,
    /// 初始竞争窗口（时隙数），退避计数在 `[0, cw)` 中均匀抽取
    pub cw_min: u32,
    /// 竞争窗口上限
    pub cw_max: u32,
    /// 最大重传次数，超过后丢弃该帧
    pub max_retries: u32,
    /// 接口队列容量（数据报个数）
    pub queue_pkts: usize,
}

impl Default for MacConfig {
    fn default() -> Self {
        Self {
            rts_threshold: None,
            cw_min: 32,
            cw_max: 1024,
            max_retries: 7,
            queue_pkts: DEFAULT_QUEUE_PKTS,
        }
    }
}

impl MacConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cw_min == 0 {
            return Err(ConfigError::InvalidMac("cw_min must be at least 1"));
        }
        if self.cw_min > self.cw_max {
            return Err(ConfigError::InvalidMac("cw_min must not exceed cw_max"));
        }
        if self.queue_pkts == 0 {
            return Err(ConfigError::InvalidMac("queue must hold at least one datagram"));
        }
        if let Some(threshold) = self.rts_threshold {
            if threshold > MAX_MPDU_BYTES {
                return Err(ConfigError::RtsThreshold {
                    threshold,
                    max: MAX_MPDU_BYTES,
                });
            }
        }
        Ok(())
    }

    /// 载荷为 `payload_bytes` 的单播数据帧是否需要 RTS/CTS
    pub fn uses_rts(&self, payload_bytes: u32) -> bool {
        match self.rts_threshold {
            None => false,
            Some(0) => true,
            Some(t) => payload_bytes > t,
        }
    }
}
