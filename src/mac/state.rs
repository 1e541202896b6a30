//! MAC 状态机状态
//!
//! 每个挂起点都带着对应的定时器句柄，状态切换时由状态机自己撤销。

use crate::sim::{EventId, SimTime};

/// 退避倒计时正在进行（媒介空闲时才存在）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    /// 倒计时开始的时刻（媒介空闲 + DIFS）
    pub resume_at: SimTime,
    pub timer: EventId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacState {
    Idle,
    /// 剩余退避时隙；媒介忙时 `countdown` 为空，计数冻结
    BackingOff {
        slots: u32,
        countdown: Option<Countdown>,
    },
    /// RTS 在空口上时 `timeout` 为空，RTS 发完后挂上 CTS 超时
    WaitingCts { timeout: Option<EventId> },
    /// 收到 CTS 后等待 SIFS 时 `sifs_timer` 非空；否则数据帧正在空口上
    Transmitting { sifs_timer: Option<EventId> },
    WaitingAck { timeout: Option<EventId> },
}

/// 不带负载的状态标签，便于日志与测试
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacStateKind {
    Idle,
    BackingOff,
    WaitingCts,
    Transmitting,
    WaitingAck,
}

impl MacState {
    pub fn kind(&self) -> MacStateKind {
        match self {
            MacState::Idle => MacStateKind::Idle,
            MacState::BackingOff { .. } => MacStateKind::BackingOff,
            MacState::WaitingCts { .. } => MacStateKind::WaitingCts,
            MacState::Transmitting { .. } => MacStateKind::Transmitting,
            MacState::WaitingAck { .. } => MacStateKind::WaitingAck,
        }
    }
}
