//! # Data marshaling callback: one queued update → one `onDataChanged` call.
//!
//! Runs on the thread owning the scripting environment, never on a worker.
//!
//! ## Flow
//! ```text
//! PendingUpdate ──► object alive? ── no ──► ERROR, BridgeMissingContext (consumed dropped)
//!                        │ yes
//!                        ▼
//!                 marshal values into ctx
//!                        ▼
//!                 lookup obj.onDataChanged
//!                        ▼
//!                 signal "consumed" (exactly once)
//!                        ▼
//!                 callable? ── no ──► DEBUG, NoHandler
//!                        │ yes
//!                        ▼
//!                 call(values...) ──► Invoked
//! ```
//!
//! The update is taken by value: a delivery can never run the handler twice
//! and never re-queues itself. The worker re-arms by sending its next update.

use crate::core::queue::PendingUpdate;
use crate::error::WidgetError;
use crate::script::context::ScriptContext;
use crate::script::value::ScriptValue;

/// Property looked up on the widget object.
pub const DATA_CHANGED_HANDLER: &str = "onDataChanged";

/// Outcome of a successful delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// The handler was called.
    Invoked,
    /// No callable `onDataChanged` was set; nothing ran.
    NoHandler,
}

/// Converts a tagged value into the environment's value type.
pub fn marshal<C: ScriptContext>(ctx: &mut C, value: &ScriptValue) -> C::Value {
    match value {
        ScriptValue::Boolean(b) => ctx.boolean(*b),
        ScriptValue::Null => ctx.null(),
        ScriptValue::Number(n) => ctx.number(*n),
        ScriptValue::String(s) => ctx.string(s),
        ScriptValue::Object(handle) => ctx.object(*handle),
        ScriptValue::Undefined => ctx.undefined(),
    }
}

/// Delivers one update to the widget's `onDataChanged` handler.
pub fn deliver_update<C: ScriptContext>(
    ctx: &mut C,
    update: PendingUpdate,
) -> Result<Delivery, WidgetError> {
    let PendingUpdate {
        target,
        values,
        consumed,
    } = update;

    let Some(object) = target.script_object.filter(|obj| ctx.contains_object(*obj)) else {
        tracing::error!(widget = %target.name, "missing script context or object");
        return Err(WidgetError::BridgeMissingContext {
            widget: target.name.to_string(),
        });
    };

    let args: Vec<C::Value> = values.iter().map(|v| marshal(ctx, v)).collect();
    let handler = ctx.get_property(object, DATA_CHANGED_HANDLER);

    // The producer may reuse its buffer from here on.
    drop(values);
    let _ = consumed.send(());

    let handler = match handler {
        Ok(h) if ctx.is_function(&h) => h,
        _ => {
            tracing::debug!(
                widget = %target.name,
                widget_type = %target.widget_type,
                "onDataChanged callback is not a function or is not set"
            );
            return Ok(Delivery::NoHandler);
        }
    };

    if let Err(e) = ctx.call_function(&handler, &args) {
        tracing::warn!(widget = %target.name, error = %e, "onDataChanged handler failed");
    }
    Ok(Delivery::Invoked)
}
