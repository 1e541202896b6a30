//! 网络世界实现
//!
//! 定义无线仿真的世界（World）实现，持有网络。

use super::network::Network;
use crate::sim::World;
use std::any::Any;

/// 默认的无线世界实现：持有 Network。
#[derive(Debug, Default)]
pub struct WifiWorld {
    pub net: Network,
}

impl WifiWorld {
    pub fn new(net: Network) -> Self {
        Self { net }
    }
}

impl World for WifiWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
