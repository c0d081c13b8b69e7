//! Ports layer: trait boundaries of the aggregation core.

pub mod inbound;
pub mod outbound;

pub use inbound::FeedReader;
pub use outbound::{EventSink, FeedEvent};
