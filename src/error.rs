//! 错误类型
//!
//! 配置错误在仿真开始前被拒绝；调度错误意味着内部缺陷，会中止运行。
//! 帧重传耗尽（DeliveryFailed）不是错误，而是 MAC 上报给业务流的结果。

use crate::sim::SimTime;
use thiserror::Error;

/// 场景配置错误（运行前检查）
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown node id {0}")]
    UnknownNode(usize),
    #[error("scenario has no nodes")]
    NoNodes,
    #[error("flow {flow}: start {start:?} must be before stop {stop:?}")]
    InvalidSchedule {
        flow: usize,
        start: SimTime,
        stop: SimTime,
    },
    #[error("flow {flow}: {reason}")]
    InvalidFlow { flow: usize, reason: &'static str },
    #[error("rts threshold {threshold} exceeds the maximum MPDU size {max}")]
    RtsThreshold { threshold: u32, max: u32 },
    #[error("invalid mac config: {0}")]
    InvalidMac(&'static str),
    #[error("invalid phy config: {0}")]
    InvalidPhy(&'static str),
    #[error("invalid duration: {0}")]
    InvalidDuration(&'static str),
}

/// 调度错误：向过去调度事件
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulingError {
    #[error("cannot schedule at {at:?}, current time is {now:?}")]
    InvalidTime { at: SimTime, now: SimTime },
    #[error("event executed against an unexpected world type")]
    WorldMismatch,
}

/// 顶层错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
}
