//! 场景描述与运行
//!
//! 场景文件只描述节点、衰减矩阵、MAC/PHY 参数和业务流；
//! 所有机制都在库内实现。

mod runner;
mod spec;

pub use runner::{run_scenario, Scenario};
pub use spec::{FlowSpec, LinkSpec, MacSpec, NodeSpec, PhySpec, ScenarioMeta, ScenarioSpec};
