//! Order lifecycle events.
//!
//! The engine publishes an event after the transaction that caused it has committed. Subscribers install hooks in
//! [`EventHooks`]; each hook runs on its own channel, so a slow subscriber never delays order processing.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
