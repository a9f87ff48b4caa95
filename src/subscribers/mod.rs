//! # Event subscribers for the widget runtime.
//!
//! This module provides the [`Subscribe`] trait and the fan-out machinery that
//! delivers runtime events broadcast through the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   spawn_all / worker / coordinator ── publish(Event) ──► Bus ──► subscriber_listener
//!                                                                        │
//!                                                                  SubscriberSet::emit
//!                                                                  ┌─────┴─────┐
//!                                                                  ▼           ▼
//!                                                              LogWriter    Custom ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use widgetvisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct TimeoutAlarm;
//!
//! #[async_trait]
//! impl Subscribe for TimeoutAlarm {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::ExitTimedOut {
//!             // notify someone
//!         }
//!     }
//!     fn name(&self) -> &'static str { "timeout-alarm" }
//! }
//! ```

mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
mod log;

pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
pub(crate) use subscriber_set::panic_message;

#[cfg(feature = "logging")]
pub use log::LogWriter;
