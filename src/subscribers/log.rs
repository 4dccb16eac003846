//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints every event to stdout as one line in the frozen log
//! wire shape:
//!
//! ```text
//! 2024-05-01T12:00:00.103Z INFO worker 1: launched
//! 2024-05-01T12:00:00.104Z INFO worker 1: task 'open-browser' started
//! 2024-05-01T12:00:02.371Z ERROR worker 1: task 'open-browser' failed: connection refused
//! ```
//!
//! Intended for development and demos; a GUI or structured logger implements
//! its own [`Subscribe`](crate::Subscribe) and consumes
//! [`Event::to_record`](crate::Event::to_record) directly.

use async_trait::async_trait;

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Stdout logging subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, event: &Event) {
        println!("{}", event.to_record());
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
