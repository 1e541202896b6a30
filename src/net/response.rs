//! 响应帧与 NAV 到期事件

use super::frame::Frame;
use super::id::NodeId;
use super::net_world::WifiWorld;
use crate::error::SimError;
use crate::sim::{downcast_world, Event, Simulator, World};

/// 事件：SIFS 之后发出 CTS/ACK（不做载波侦听）
#[derive(Debug)]
pub struct SendResponse {
    pub frame: Frame,
}

impl Event for SendResponse {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<(), SimError> {
        let SendResponse { frame } = *self;
        let w = downcast_world::<WifiWorld>(world)?;
        w.net.on_send_response(frame, sim)
    }
}

/// 事件：某节点的 NAV 可能到期
#[derive(Debug)]
pub struct NavExpire {
    pub node: NodeId,
}

impl Event for NavExpire {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) -> Result<(), SimError> {
        let NavExpire { node } = *self;
        let w = downcast_world::<WifiWorld>(world)?;
        w.net.on_nav_expire(node, sim)
    }
}
