//! 世界 trait
//!
//! 定义仿真世界接口。

use super::simulator::Simulator;
use crate::error::SchedulingError;
use std::any::Any;

/// 仿真世界：由业务层实现（例如无线网络/统计等）。
pub trait World: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn on_tick(&mut self, _sim: &mut Simulator) {}
}

/// 把事件收到的 `&mut dyn World` 还原成具体类型。
pub fn downcast_world<W: World>(world: &mut dyn World) -> Result<&mut W, SchedulingError> {
    world
        .as_any_mut()
        .downcast_mut::<W>()
        .ok_or(SchedulingError::WorldMismatch)
}
