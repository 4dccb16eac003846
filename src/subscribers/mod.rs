//! # Event subscribers.
//!
//! The [`Subscribe`] trait is the extension point for observers of the pool:
//! log writers, metrics collectors, a GUI status panel, a test harness.
//! [`SubscriberSet`] fans every bus event out to all subscribers without
//! awaiting them, through per-subscriber bounded queues with panic
//! isolation. [`LogWriter`] is a built-in subscriber printing the frozen log
//! wire shape to stdout.

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
