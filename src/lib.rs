pub mod config;
pub mod error;
pub mod infra;
pub mod logging;
pub mod model;
pub mod push;
pub mod stream;

pub use config::PushConfig;
pub use error::{Result, ServerError};
pub use model::*;
pub use push::{
    DispatchOutcome, HttpSink, MockSink, NotificationDispatcher, NotificationKind,
    NotificationRequest, NotificationSink, SkipReason,
};
pub use stream::{Stream, StreamRegistry, StreamView};
