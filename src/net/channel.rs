//! 共享信道
//!
//! 对每个接收端维护正在到达的信号集合。纯碰撞模型：一个信号在其整个空口区间内，
//! 只要接收端同时存在另一个可达信号，或接收端自己在发送（半双工），就被破坏。
//! 不可达发送端的信号根本不会出现在接收端，因此不参与碰撞。

use std::collections::BTreeMap;

use super::frame::Frame;
use super::id::{NodeId, TxId};
use crate::mac::MediumView;
use crate::sim::SimTime;
use tracing::trace;

/// 一个正在某接收端到达的信号
#[derive(Debug, Clone, Copy)]
struct Signal {
    tx: TxId,
    corrupted: bool,
}

/// 单个节点的射频状态（物理载波侦听 + NAV）
#[derive(Debug, Default)]
struct Radio {
    incoming: Vec<Signal>,
    transmitting: Option<TxId>,
    nav_until: SimTime,
    busy: bool,
    idle_since: SimTime,
}

impl Radio {
    fn sense_busy(&self, now: SimTime) -> bool {
        self.transmitting.is_some() || !self.incoming.is_empty() || self.nav_until > now
    }
}

/// 一次空口传输
#[derive(Debug)]
pub struct Transmission {
    pub frame: Frame,
    /// 尚未结束接收的接收端数
    receivers_left: usize,
    sender_done: bool,
}

/// 信号在接收端结束时的结果
#[derive(Debug, Clone)]
pub struct Reception {
    pub frame: Frame,
    pub decoded: bool,
}

/// 媒介忙闲状态的变化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediumChange {
    BecameBusy,
    BecameIdle,
}

#[derive(Debug, Default)]
pub struct Channel {
    radios: Vec<Radio>,
    active: BTreeMap<TxId, Transmission>,
    next_tx: u64,
}

impl Channel {
    pub fn add_radio(&mut self) {
        self.radios.push(Radio::default());
    }

    /// 开始一次传输：发送端进入发送状态，其正在接收的信号全部被破坏
    pub fn begin_tx(&mut self, frame: Frame, receivers: usize) -> TxId {
        let tx = TxId(self.next_tx);
        self.next_tx = self.next_tx.wrapping_add(1);

        let radio = &mut self.radios[frame.src.0];
        radio.transmitting = Some(tx);
        for s in radio.incoming.iter_mut() {
            s.corrupted = true;
        }

        self.active.insert(
            tx,
            Transmission {
                frame,
                receivers_left: receivers,
                sender_done: false,
            },
        );
        tx
    }

    /// 发送端结束发送
    pub fn end_tx(&mut self, node: NodeId, tx: TxId) -> Option<Frame> {
        let radio = &mut self.radios[node.0];
        if radio.transmitting == Some(tx) {
            radio.transmitting = None;
        }
        let t = self.active.get_mut(&tx)?;
        t.sender_done = true;
        let frame = t.frame.clone();
        self.gc(tx);
        Some(frame)
    }

    /// 信号开始到达接收端
    pub fn signal_arrives(&mut self, node: NodeId, tx: TxId) {
        let radio = &mut self.radios[node.0];
        let mut corrupted = radio.transmitting.is_some();
        if !radio.incoming.is_empty() {
            corrupted = true;
            for s in radio.incoming.iter_mut() {
                s.corrupted = true;
            }
        }
        trace!(node = node.0, tx = tx.0, corrupted, overlapping = radio.incoming.len(), "信号到达");
        radio.incoming.push(Signal { tx, corrupted });
    }

    /// 信号在接收端结束；返回帧及是否成功解码
    pub fn signal_departs(&mut self, node: NodeId, tx: TxId) -> Option<Reception> {
        let radio = &mut self.radios[node.0];
        let pos = radio.incoming.iter().position(|s| s.tx == tx)?;
        let signal = radio.incoming.remove(pos);

        let t = self.active.get_mut(&tx)?;
        t.receivers_left = t.receivers_left.saturating_sub(1);
        let reception = Reception {
            frame: t.frame.clone(),
            decoded: !signal.corrupted,
        };
        self.gc(tx);
        Some(reception)
    }

    fn gc(&mut self, tx: TxId) {
        let done = self
            .active
            .get(&tx)
            .map(|t| t.sender_done && t.receivers_left == 0)
            .unwrap_or(false);
        if done {
            self.active.remove(&tx);
        }
    }

    pub fn transmission(&self, tx: TxId) -> Option<&Transmission> {
        self.active.get(&tx)
    }

    pub fn is_transmitting(&self, node: NodeId) -> bool {
        self.radios[node.0].transmitting.is_some()
    }

    pub fn nav_until(&self, node: NodeId) -> SimTime {
        self.radios[node.0].nav_until
    }

    /// 延长 NAV；返回是否确实延长
    pub fn extend_nav(&mut self, node: NodeId, until: SimTime) -> bool {
        let radio = &mut self.radios[node.0];
        if until > radio.nav_until {
            radio.nav_until = until;
            return true;
        }
        false
    }

    /// MAC 视角下的媒介状态
    pub fn medium(&self, node: NodeId, now: SimTime) -> MediumView {
        let radio = &self.radios[node.0];
        MediumView {
            busy: radio.sense_busy(now),
            idle_since: radio.idle_since,
        }
    }

    /// 重新评估节点的忙闲状态，发生翻转时返回变化
    pub fn refresh(&mut self, node: NodeId, now: SimTime) -> Option<MediumChange> {
        let radio = &mut self.radios[node.0];
        let busy = radio.sense_busy(now);
        if busy == radio.busy {
            return None;
        }
        radio.busy = busy;
        if busy {
            Some(MediumChange::BecameBusy)
        } else {
            radio.idle_since = now;
            Some(MediumChange::BecameIdle)
        }
    }
}
