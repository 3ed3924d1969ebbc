//! Alert delivery: one `Notifier` per channel and an `AlertDispatcher`
//! implementing `AlertSink` on top of them.

pub mod desktop;
pub mod dispatch;
pub mod slack;
