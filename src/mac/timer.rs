//! MAC 定时器事件

use crate::error::SimError;
use crate::net::{NodeId, WifiWorld};
use crate::sim::{downcast_world, Event, Simulator, World};

/// 定时器种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacTimer {
    /// 退避计数归零
    Backoff,
    CtsTimeout,
    AckTimeout,
    /// 收到 CTS 后等待 SIFS 再发数据
    SendData,
}

/// 事件：某节点的 MAC 定时器到期
#[derive(Debug)]
pub struct MacTimerFired {
    pub node: NodeId,
    pub timer: MacTimer,
}

impl Event for MacTimerFired {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<(), SimError> {
        let MacTimerFired { node, timer } = *self;
        let w = downcast_world::<WifiWorld>(world)?;
        w.net.on_mac_timer(node, timer, sim)
    }
}
