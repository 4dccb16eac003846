//! # Runtime events, the broadcast bus, and the log wire shape.
//!
//! Everything the pool reports (worker lifecycle, per-task progress, state
//! transitions, errors) flows through one [`Bus`] as [`Event`] values.
//! Events carry a monotonic global sequence number and a wall-clock
//! timestamp; [`Event::to_record`] converts any event into the frozen
//! [`LogRecord`] wire shape consumed by external log viewers.

mod bus;
mod event;
mod record;

pub use bus::Bus;
pub use event::{Event, EventKind};
pub use record::{LogLevel, LogRecord};
