//! 数据模型模块

pub mod event;
pub mod stream_id;

pub use event::*;
pub use stream_id::*;
