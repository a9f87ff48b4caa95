//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the lifecycle manager, the shutdown
//! coordinator, widget workers and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `LifecycleManager::spawn_all`, the worker wrapper, `shutdown::coordinate`,
//!   `LifecycleManager::surface_ready`, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the manager's subscriber listener (fans out to `SubscriberSet`),
//!   and anyone holding a receiver from [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
