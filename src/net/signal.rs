//! 信号事件
//!
//! 一次传输在空口上的三个时刻：信号到达接收端、信号在接收端结束、发送端发完。

use super::id::{NodeId, TxId};
use super::net_world::WifiWorld;
use crate::error::SimError;
use crate::sim::{downcast_world, Event, Simulator, World};

/// 事件：信号开始到达某接收端
#[derive(Debug)]
pub struct RxStart {
    pub node: NodeId,
    pub tx: TxId,
}

impl Event for RxStart {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<(), SimError> {
        let RxStart { node, tx } = *self;
        let w = downcast_world::<WifiWorld>(world)?;
        w.net.on_rx_start(node, tx, sim)
    }
}

/// 事件：信号在某接收端结束
#[derive(Debug)]
pub struct RxEnd {
    pub node: NodeId,
    pub tx: TxId,
}

impl Event for RxEnd {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<(), SimError> {
        let RxEnd { node, tx } = *self;
        let w = downcast_world::<WifiWorld>(world)?;
        w.net.on_rx_end(node, tx, sim)
    }
}

/// 事件：发送端发完一帧
#[derive(Debug)]
pub struct TxEnd {
    pub node: NodeId,
    pub tx: TxId,
}

impl Event for TxEnd {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<(), SimError> {
        let TxEnd { node, tx } = *self;
        let w = downcast_world::<WifiWorld>(world)?;
        w.net.on_tx_end(node, tx, sim)
    }
}
