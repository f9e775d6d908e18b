//! 流与成员关系模块
//!
//! 节点存储层的进程内占位：注册表持有活动流，
//! 调度器只消费 StreamView 快照

pub mod registry;
pub mod view;

pub use registry::StreamRegistry;
pub use view::{Stream, StreamView};
