//! Runtime core: spawning, update delivery and shutdown.
//!
//! The public entry point is [`LifecycleManager`]; the rest is what it hands
//! out or coordinates.
//!
//! Internal modules:
//! - [`runner`]: one OS thread per worker, publishes its terminal event;
//! - [`manager`]: spawns widgets, owns the session objects;
//! - [`shutdown`]: lock-before-broadcast stop, join or abort per widget;
//! - [`exit`]: the per-widget exit handshake;
//! - [`queue`]: worker → scripting thread update queue;
//! - [`registry`]: the slot-per-spec widget collection.

mod builder;
pub(crate) mod exit;
mod gate;
mod handle;
mod manager;
pub(crate) mod queue;
mod registry;
mod runner;
mod shutdown;
mod stop;

pub use builder::ManagerBuilder;
pub use gate::ReadinessGate;
pub use handle::WidgetHandle;
pub use manager::LifecycleManager;
pub use queue::{PendingUpdate, UpdateReceiver, UpdateSender, UpdateTarget, update_channel};
pub use registry::{Registry, Widget};
pub use shutdown::ShutdownReport;
pub use stop::StopSignal;
