//! 开关式恒定码率源
//!
//! 处于"开"阶段时，每隔 `payload * 8 / rate` 秒产生一个数据报。
//! 开/关相位从流的起始时间算起。

use crate::error::{ConfigError, SimError};
use crate::net::{Destination, FlowId, NodeId, WifiWorld};
use crate::sim::{downcast_world, Event, SimTime, Simulator, World};

use super::datagram::Datagram;
use super::sink::FlowSink;

/// 开/关阶段时长
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnOff {
    pub on: SimTime,
    pub off: SimTime,
}

/// 场景层交给网络的业务流描述
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub src: NodeId,
    pub dst: Destination,
    pub payload_bytes: u32,
    pub rate_bps: u64,
    pub start: SimTime,
    pub stop: SimTime,
    pub on_off: Option<OnOff>,
}

impl FlowConfig {
    /// 不依赖节点表的校验
    pub fn validate(&self, flow: usize) -> Result<(), ConfigError> {
        if self.start >= self.stop {
            return Err(ConfigError::InvalidSchedule {
                flow,
                start: self.start,
                stop: self.stop,
            });
        }
        if self.payload_bytes == 0 {
            return Err(ConfigError::InvalidFlow {
                flow,
                reason: "payload must be at least one byte",
            });
        }
        if self.rate_bps == 0 {
            return Err(ConfigError::InvalidFlow {
                flow,
                reason: "rate must be positive",
            });
        }
        if self.dst == Destination::Unicast(self.src) {
            return Err(ConfigError::InvalidFlow {
                flow,
                reason: "source and destination are the same node",
            });
        }
        if let Some(oo) = self.on_off {
            if oo.on == SimTime::ZERO {
                return Err(ConfigError::InvalidFlow {
                    flow,
                    reason: "on period must be positive",
                });
            }
        }
        Ok(())
    }

    /// "开"阶段内相邻两个数据报的间隔
    pub fn interval(&self) -> SimTime {
        let bits = (self.payload_bytes as u128) * 8;
        let nanos = (bits * 1_000_000_000u128 + (self.rate_bps as u128 - 1)) / self.rate_bps as u128;
        SimTime(nanos.min(u64::MAX as u128) as u64).max(SimTime(1))
    }
}

/// 发送侧计数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowCounters {
    pub sent: u64,
    /// MAC 重传耗尽后丢弃的数据报
    pub delivery_failed: u64,
    /// MAC 报告已确认（或已广播）的数据报
    pub delivery_succeeded: u64,
    pub queue_drops: u64,
}

/// 运行中的业务源，连同目的端的接收统计
#[derive(Debug)]
pub struct Flow {
    pub id: FlowId,
    pub cfg: FlowConfig,
    next_seq: u64,
    active: bool,
    pub counters: FlowCounters,
    pub sink: FlowSink,
}

impl Flow {
    pub fn new(id: FlowId, cfg: FlowConfig) -> Self {
        Self {
            id,
            cfg,
            next_seq: 0,
            active: false,
            counters: FlowCounters::default(),
            sink: FlowSink::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn activate(&mut self) {
        self.active = true;
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
    }

    /// 不早于 `t` 且落在"开"阶段内的最早时刻
    fn align_to_on(&self, t: SimTime) -> SimTime {
        let Some(oo) = self.cfg.on_off else {
            return t;
        };
        let cycle = (oo.on + oo.off).as_nanos();
        if cycle == 0 || oo.off == SimTime::ZERO {
            return t;
        }
        let phase = t.saturating_sub(self.cfg.start).as_nanos() % cycle;
        if phase < oo.on.as_nanos() {
            t
        } else {
            t + SimTime(cycle - phase)
        }
    }

    /// 在 `now` 发出一个数据报后，下一个的发送时刻（须早于 stop）
    pub fn next_send_after(&self, now: SimTime) -> Option<SimTime> {
        let next = self.align_to_on(now + self.cfg.interval());
        (next < self.cfg.stop).then_some(next)
    }

    /// 不早于 start 的首次发送时刻
    pub fn first_send(&self) -> Option<SimTime> {
        let first = self.align_to_on(self.cfg.start);
        (first < self.cfg.stop).then_some(first)
    }

    pub(crate) fn make_datagram(&mut self, now: SimTime) -> Datagram {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.counters.sent += 1;
        Datagram {
            flow: self.id,
            seq,
            src: self.cfg.src,
            dst: self.cfg.dst,
            size_bytes: self.cfg.payload_bytes,
            created_at: now,
        }
    }
}

/// 事件：业务流到达起始时间
#[derive(Debug)]
pub struct FlowStart {
    pub flow: FlowId,
}

impl Event for FlowStart {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<(), SimError> {
        let FlowStart { flow } = *self;
        let w = downcast_world::<WifiWorld>(world)?;
        w.net.on_flow_start(flow, sim)
    }
}

/// 事件：业务流产生下一个数据报
#[derive(Debug)]
pub struct FlowTick {
    pub flow: FlowId,
}

impl Event for FlowTick {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<(), SimError> {
        let FlowTick { flow } = *self;
        let w = downcast_world::<WifiWorld>(world)?;
        w.net.on_flow_tick(flow, sim)
    }
}

/// 事件：业务流到达结束时间
#[derive(Debug)]
pub struct FlowStop {
    pub flow: FlowId,
}

impl Event for FlowStop {
    fn execute(self: Box<Self>, _sim: &mut Simulator, world: &mut dyn World) -> Result<(), SimError> {
        let FlowStop { flow } = *self;
        let w = downcast_world::<WifiWorld>(world)?;
        w.net.on_flow_stop(flow);
        Ok(())
    }
}
