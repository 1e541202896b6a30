//! 调度事件
//!
//! 队列中的一项：触发时刻、撤销句柄与事件本体。

use super::event::Event;
use super::time::SimTime;
use std::cmp::{Ordering, Reverse};

/// 事件句柄：由 `Simulator::schedule` 返回，可用于在触发前撤销事件。
/// 句柄按分配顺序递增，同时充当同一时刻事件的先后次序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub(crate) u64);

pub struct ScheduledEvent {
    pub(crate) at: SimTime,
    pub(crate) id: EventId,
    pub(crate) ev: Box<dyn Event>,
}

impl ScheduledEvent {
    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn at(&self) -> SimTime {
        self.at
    }

    /// 出堆次序：时刻最早者优先，同刻先入先出（BinaryHeap 是大顶堆，故取反）
    fn key(&self) -> Reverse<(SimTime, EventId)> {
        Reverse((self.at, self.id))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ScheduledEvent {}
