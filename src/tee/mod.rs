//! Request mirroring to the analytics collector
//!
//! A served request is filtered by path, turned into an
//! [`AnalyticsEvent`], and posted to the collector on a background task.
//! Delivery is best-effort and never affects the response.

pub mod collector;
pub mod event;
pub mod filter;
pub mod robot;

pub use collector::{EventSink, HttpCollector, Tee};
pub use event::AnalyticsEvent;
pub use filter::should_tee;
pub use robot::is_robot;
