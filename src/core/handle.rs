//! # Worker handle: everything a widget's worker may touch.
//!
//! A [`WidgetHandle`] is passed by value into [`WidgetModule::run`](crate::WidgetModule::run).
//! It carries the widget's identity and configuration, the session stop token
//! and the producer side of the update queue. It never exposes the scripting
//! environment.
//!
//! ## Update handshake
//! ```text
//! update(values) ──► queue ──► (gate open) ──► deliver_update ──► consumed
//!       │                                                           │
//!       └────────────── waits for consumed or stop ◄────────────────┘
//! ```

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::core::queue::{PendingUpdate, UpdateSender, UpdateTarget};
use crate::error::UpdateError;
use crate::script::ScriptValue;

/// Handle given to a widget's worker.
#[derive(Clone, Debug)]
pub struct WidgetHandle {
    target: UpdateTarget,
    config: Arc<Value>,
    stop: CancellationToken,
    updates: UpdateSender,
}

impl WidgetHandle {
    pub(crate) fn new(
        target: UpdateTarget,
        config: Arc<Value>,
        stop: CancellationToken,
        updates: UpdateSender,
    ) -> Self {
        Self {
            target,
            config,
            stop,
            updates,
        }
    }

    /// Unique widget name.
    pub fn name(&self) -> &str {
        self.target.name()
    }

    /// Logical widget type.
    pub fn widget_type(&self) -> &str {
        self.target.widget_type()
    }

    /// Configuration lent to this widget.
    pub fn config(&self) -> &Value {
        &self.config
    }

    /// Clone of the session stop token.
    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    /// Returns `true` once shutdown has been requested.
    pub fn is_stopping(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Completes when shutdown is requested.
    pub async fn stopped(&self) {
        self.stop.cancelled().await
    }

    /// Hands `values` to the widget's `onDataChanged` and waits until they were consumed.
    ///
    /// # Errors
    /// - [`UpdateError::Stopped`] if the stop notification fires first
    /// - [`UpdateError::Closed`] if the scripting side is gone
    /// - [`UpdateError::Rejected`] if the update was dropped without delivery
    pub async fn update(&self, values: Vec<ScriptValue>) -> Result<(), UpdateError> {
        if self.stop.is_cancelled() {
            return Err(UpdateError::Stopped);
        }

        let (update, consumed) = PendingUpdate::new(self.target.clone(), values);
        self.updates.send(update)?;

        tokio::select! {
            biased;
            res = consumed => res.map_err(|_| UpdateError::Rejected),
            _ = self.stop.cancelled() => Err(UpdateError::Stopped),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gate::ReadinessGate;
    use crate::core::queue::update_channel;
    use crate::testing::{FakeScript, FakeValue};
    use serde_json::json;

    fn handle_for(
        ctx: &mut FakeScript,
        gate: ReadinessGate,
    ) -> (WidgetHandle, crate::core::queue::UpdateReceiver) {
        let obj = ctx.plain_object();
        ctx.set_handler(obj);
        let (tx, rx) = update_channel(gate);
        let handle = WidgetHandle::new(
            UpdateTarget::new("clock", "time", Some(obj)),
            Arc::new(json!({ "format": "%H:%M" })),
            CancellationToken::new(),
            tx,
        );
        (handle, rx)
    }

    #[tokio::test]
    async fn update_returns_once_consumed() {
        let gate = ReadinessGate::new();
        gate.open();
        let mut ctx = FakeScript::new();
        let (handle, mut rx) = handle_for(&mut ctx, gate);

        assert_eq!(handle.name(), "clock");
        assert_eq!(handle.widget_type(), "time");
        assert_eq!(handle.config()["format"], "%H:%M");

        let worker = tokio::spawn({
            let handle = handle.clone();
            async move { handle.update(vec!["12:00".into()]).await }
        });

        let update = rx.next().await.unwrap();
        crate::script::deliver_update(&mut ctx, update).unwrap();

        assert_eq!(worker.await.unwrap(), Ok(()));
        assert_eq!(ctx.calls()[0].1, vec![FakeValue::Str("12:00".into())]);
    }

    #[tokio::test]
    async fn stop_releases_a_pending_update() {
        let mut ctx = FakeScript::new();
        let (handle, _rx) = handle_for(&mut ctx, ReadinessGate::new());

        let worker = tokio::spawn({
            let handle = handle.clone();
            async move { handle.update(vec![true.into()]).await }
        });
        tokio::task::yield_now().await;

        handle.stop_token().cancel();
        assert_eq!(worker.await.unwrap(), Err(UpdateError::Stopped));
        assert!(handle.is_stopping());
        assert_eq!(handle.update(Vec::new()).await, Err(UpdateError::Stopped));
    }

    #[tokio::test]
    async fn dropped_update_is_rejected() {
        let gate = ReadinessGate::new();
        gate.open();
        let (tx, mut rx) = update_channel(gate);
        let handle = WidgetHandle::new(
            UpdateTarget::new("mpd", "mpd", None),
            Arc::new(Value::Null),
            CancellationToken::new(),
            tx,
        );
        let mut ctx = FakeScript::new();

        let worker = tokio::spawn({
            let handle = handle.clone();
            async move { handle.update(vec!["x".into()]).await }
        });
        let update = rx.next().await.unwrap();
        assert!(crate::script::deliver_update(&mut ctx, update).is_err());

        assert_eq!(worker.await.unwrap(), Err(UpdateError::Rejected));
    }

    #[tokio::test]
    async fn closed_queue_is_reported() {
        let mut ctx = FakeScript::new();
        let (handle, rx) = handle_for(&mut ctx, ReadinessGate::new());
        drop(rx);
        assert_eq!(handle.update(Vec::new()).await, Err(UpdateError::Closed));
    }
}
