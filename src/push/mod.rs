pub mod dispatcher;
pub mod sink;
pub mod types;

pub use dispatcher::NotificationDispatcher;
pub use sink::{HttpSink, MockSink, NotificationSink};
pub use types::{
    DispatchOutcome, NotificationContent, NotificationKind, NotificationPayload,
    NotificationRequest, SkipReason,
};
