//! 仿真器
//!
//! 定义事件驱动仿真器，维护当前时间与事件队列。

use super::event::Event;
use super::scheduled_event::{EventId, ScheduledEvent};
use super::time::SimTime;
use super::world::World;
use crate::error::{SchedulingError, SimError};
use std::collections::{BinaryHeap, HashSet};
use tracing::{debug, info, trace};

/// 事件驱动仿真器：维护当前时间与事件队列。
///
/// 单线程协作式执行：一次只执行一个事件，且执行到结束为止。
#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_id: u64,
    q: BinaryHeap<ScheduledEvent>,
    queued: HashSet<EventId>,
    cancelled: HashSet<EventId>,
    executed: u64,
}

impl Simulator {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 已执行的事件数
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// 队列中尚未触发（且未被撤销）的事件数
    pub fn pending(&self) -> usize {
        self.queued.len()
    }

    /// 调度事件在指定时间执行；不允许调度到过去。
    #[tracing::instrument(level = "trace", skip(self, ev), fields(event_type = std::any::type_name::<E>(), schedule_at = ?at))]
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) -> Result<EventId, SchedulingError> {
        if at < self.now {
            return Err(SchedulingError::InvalidTime { at, now: self.now });
        }
        let id = EventId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        trace!(now = ?self.now, id = id.0, "调度事件");

        self.queued.insert(id);
        self.q.push(ScheduledEvent {
            at,
            id,
            ev: Box::new(ev),
        });
        Ok(id)
    }

    /// 在当前时间之后 `delay` 调度事件
    pub fn schedule_in<E: Event>(&mut self, delay: SimTime, ev: E) -> Result<EventId, SchedulingError> {
        self.schedule(self.now + delay, ev)
    }

    /// 撤销一个尚未触发的事件。被撤销的事件永远不会执行；对已触发的事件无效果。
    pub fn cancel(&mut self, id: EventId) -> bool {
        if !self.queued.remove(&id) {
            return false;
        }
        trace!(id = id.0, "撤销事件");
        self.cancelled.insert(id);
        true
    }

    fn pop_live(&mut self) -> Option<ScheduledEvent> {
        while let Some(item) = self.q.pop() {
            if self.cancelled.remove(&item.id()) {
                continue;
            }
            self.queued.remove(&item.id());
            return Some(item);
        }
        None
    }

    fn peek_live_at(&mut self) -> Option<SimTime> {
        while let Some(top) = self.q.peek() {
            let id = top.id();
            if !self.cancelled.contains(&id) {
                return Some(top.at());
            }
            self.q.pop();
            self.cancelled.remove(&id);
        }
        None
    }

    fn execute(&mut self, item: ScheduledEvent, world: &mut dyn World) -> Result<(), SimError> {
        self.now = item.at;
        self.executed += 1;
        item.ev.execute(self, world)?;
        world.on_tick(self);
        Ok(())
    }

    /// 运行直到事件队列为空或下一个事件晚于 `until`；之后丢弃剩余事件，时间推进到 `until`。
    #[tracing::instrument(skip(self, world))]
    pub fn run_until(&mut self, until: SimTime, world: &mut dyn World) -> Result<(), SimError> {
        info!("▶️  开始运行仿真");
        while let Some(at) = self.peek_live_at() {
            if at > until {
                break;
            }
            let Some(item) = self.pop_live() else { break };
            self.execute(item, world)?;
        }

        let discarded = self.pending();
        self.q.clear();
        self.queued.clear();
        self.cancelled.clear();
        self.now = self.now.max(until);

        info!(
            total_events = self.executed,
            discarded,
            final_time = ?self.now,
            "✅ 仿真完成"
        );
        Ok(())
    }

    /// 运行所有事件直到队列为空。
    #[tracing::instrument(skip(self, world))]
    pub fn run(&mut self, world: &mut dyn World) -> Result<(), SimError> {
        info!("▶️  开始运行仿真");
        debug!(now = ?self.now, queue_size = self.q.len(), "初始状态");

        while let Some(item) = self.pop_live() {
            debug!(
                now = ?self.now,
                scheduled_at = ?item.at,
                id = item.id().0,
                remaining_queue = self.q.len(),
                "执行事件"
            );
            self.execute(item, world)?;
        }

        info!(
            total_events = self.executed,
            final_time = ?self.now,
            "✅ 仿真完成"
        );
        Ok(())
    }
}
