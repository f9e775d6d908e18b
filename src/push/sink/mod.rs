pub mod http;
pub mod mock;
pub mod sink_trait;

pub use http::HttpSink;
pub use mock::MockSink;
pub use sink_trait::NotificationSink;
