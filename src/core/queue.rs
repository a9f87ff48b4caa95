//! # Order-preserving update queue from workers to the scripting thread.
//!
//! Workers never touch the scripting environment. They enqueue a
//! [`PendingUpdate`] and wait for its "consumed" signal; the thread owning the
//! environment drains the queue and runs [`deliver_update`] for each entry.
//!
//! ```text
//! worker A ──┐  update(values)                      ┌─► deliver_update(ctx, A1)
//! worker B ──┼──► [unbounded mpsc, FIFO] ──► gate ──┼─► deliver_update(ctx, B1)
//! worker A ──┘    (blocks on consumed)              └─► deliver_update(ctx, A2)
//! ```
//!
//! ## Rules
//! - Updates from one widget are serialized: its worker waits for "consumed" before the next.
//! - Updates of different widgets interleave in arrival order.
//! - Nothing is delivered while the [`ReadinessGate`] is closed.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::core::gate::ReadinessGate;
use crate::error::UpdateError;
use crate::script::{ObjectHandle, ScriptContext, ScriptValue, deliver_update};

/// Which widget an update is for.
#[derive(Clone, Debug)]
pub struct UpdateTarget {
    pub(crate) name: Arc<str>,
    pub(crate) widget_type: Arc<str>,
    pub(crate) script_object: Option<ObjectHandle>,
}

impl UpdateTarget {
    pub fn new(
        name: impl Into<Arc<str>>,
        widget_type: impl Into<Arc<str>>,
        script_object: Option<ObjectHandle>,
    ) -> Self {
        Self {
            name: name.into(),
            widget_type: widget_type.into(),
            script_object,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn widget_type(&self) -> &str {
        &self.widget_type
    }

    pub fn script_object(&self) -> Option<ObjectHandle> {
        self.script_object
    }
}

/// One queued update: target, tagged values and the consumed signal.
#[derive(Debug)]
pub struct PendingUpdate {
    pub(crate) target: UpdateTarget,
    pub(crate) values: Vec<ScriptValue>,
    pub(crate) consumed: oneshot::Sender<()>,
}

impl PendingUpdate {
    /// Builds an update and the receiver its producer waits on.
    pub fn new(target: UpdateTarget, values: Vec<ScriptValue>) -> (Self, oneshot::Receiver<()>) {
        let (consumed, rx) = oneshot::channel();
        (
            Self {
                target,
                values,
                consumed,
            },
            rx,
        )
    }

    pub fn target(&self) -> &UpdateTarget {
        &self.target
    }

    pub fn values(&self) -> &[ScriptValue] {
        &self.values
    }
}

/// Creates a connected sender/receiver pair gated by `gate`.
pub fn update_channel(gate: ReadinessGate) -> (UpdateSender, UpdateReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        UpdateSender { tx },
        UpdateReceiver {
            rx,
            gate,
            held: None,
        },
    )
}

/// Producer side, cloned into every worker handle.
#[derive(Clone, Debug)]
pub struct UpdateSender {
    tx: mpsc::UnboundedSender<PendingUpdate>,
}

impl UpdateSender {
    /// Enqueues `update`; fails only when the receiver is gone.
    pub fn send(&self, update: PendingUpdate) -> Result<(), UpdateError> {
        self.tx.send(update).map_err(|_| UpdateError::Closed)
    }
}

/// Consumer side, owned by the thread that owns the scripting environment.
#[derive(Debug)]
pub struct UpdateReceiver {
    rx: mpsc::UnboundedReceiver<PendingUpdate>,
    gate: ReadinessGate,
    /// Taken off the queue just as the gate closed; goes out first on reopen.
    held: Option<PendingUpdate>,
}

impl UpdateReceiver {
    /// Waits for the gate to open, then for the next update.
    ///
    /// If the gate closes while waiting, waits for it to open again.
    ///
    /// Returns `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<PendingUpdate> {
        loop {
            self.gate.wait_open().await;
            let update = match self.held.take() {
                Some(update) => update,
                None => tokio::select! {
                    biased;
                    _ = self.gate.wait_closed() => continue,
                    update = self.rx.recv() => update?,
                },
            };
            if self.gate.is_open() {
                return Some(update);
            }
            self.held = Some(update);
        }
    }

    /// Delivers every update already queued, without waiting.
    ///
    /// For hosts that pump their own main loop. Does nothing while the gate is
    /// closed. Returns how many updates were taken off the queue.
    pub fn drain<C: ScriptContext>(&mut self, ctx: &mut C) -> usize {
        if !self.gate.is_open() {
            return 0;
        }
        let mut taken = 0;
        if let Some(update) = self.held.take() {
            let _ = deliver_update(ctx, update);
            taken += 1;
        }
        while let Ok(update) = self.rx.try_recv() {
            let _ = deliver_update(ctx, update);
            taken += 1;
        }
        taken
    }

    /// Delivers updates as they arrive until every sender is gone.
    pub async fn run<C: ScriptContext>(&mut self, ctx: &mut C) {
        while let Some(update) = self.next().await {
            let _ = deliver_update(ctx, update);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeScript, FakeValue};

    fn target_for(ctx: &mut FakeScript, name: &str) -> (UpdateTarget, u64) {
        let obj = ctx.plain_object();
        let handler = ctx.set_handler(obj);
        (UpdateTarget::new(name, name, Some(obj)), handler)
    }

    #[test]
    fn closed_gate_holds_updates_back() {
        let gate = ReadinessGate::new();
        let (tx, mut rx) = update_channel(gate.clone());
        let mut ctx = FakeScript::new();
        let (target, _) = target_for(&mut ctx, "clock");

        let (update, mut consumed) = PendingUpdate::new(target, vec!["12:00".into()]);
        tx.send(update).unwrap();

        assert_eq!(rx.drain(&mut ctx), 0);
        assert!(ctx.calls().is_empty());
        assert!(consumed.try_recv().is_err());

        gate.open();
        assert_eq!(rx.drain(&mut ctx), 1);
        assert_eq!(ctx.calls().len(), 1);
        assert!(consumed.try_recv().is_ok());
    }

    #[test]
    fn updates_are_delivered_in_arrival_order() {
        let gate = ReadinessGate::new();
        gate.open();
        let (tx, mut rx) = update_channel(gate);
        let mut ctx = FakeScript::new();
        let (a, ha) = target_for(&mut ctx, "a");
        let (b, hb) = target_for(&mut ctx, "b");

        for (target, n) in [(a.clone(), 1), (b, 2), (a, 3)] {
            let (update, _rx) = PendingUpdate::new(target, vec![n.into()]);
            tx.send(update).unwrap();
        }
        assert_eq!(rx.drain(&mut ctx), 3);

        let order: Vec<(u64, Vec<FakeValue>)> = ctx.calls().to_vec();
        assert_eq!(
            order,
            vec![
                (ha, vec![FakeValue::Number(1.0)]),
                (hb, vec![FakeValue::Number(2.0)]),
                (ha, vec![FakeValue::Number(3.0)]),
            ]
        );
    }

    #[tokio::test]
    async fn run_ends_when_senders_are_gone() {
        let gate = ReadinessGate::new();
        gate.open();
        let (tx, mut rx) = update_channel(gate);
        let mut ctx = FakeScript::new();
        let (target, _) = target_for(&mut ctx, "clock");

        let (update, consumed) = PendingUpdate::new(target, vec![ScriptValue::Null]);
        tx.send(update).unwrap();
        drop(tx);

        rx.run(&mut ctx).await;
        assert!(consumed.await.is_ok());
        assert_eq!(ctx.calls().len(), 1);
    }

    #[test]
    fn send_fails_once_receiver_is_dropped() {
        let (tx, rx) = update_channel(ReadinessGate::new());
        drop(rx);
        let (update, _consumed) =
            PendingUpdate::new(UpdateTarget::new("x", "x", None), Vec::new());
        assert_eq!(tx.send(update), Err(UpdateError::Closed));
    }

    #[tokio::test(start_paused = true)]
    async fn closing_the_gate_pauses_next() {
        let gate = ReadinessGate::new();
        gate.open();
        let (tx, mut rx) = update_channel(gate.clone());

        let consumer = tokio::spawn(async move { rx.next().await.is_some() });
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        gate.close();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let (update, _consumed) =
            PendingUpdate::new(UpdateTarget::new("x", "x", None), Vec::new());
        tx.send(update).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(!consumer.is_finished());

        gate.open();
        assert!(consumer.await.unwrap());
    }

    #[tokio::test]
    async fn update_arriving_with_a_close_stays_queued() {
        let gate = ReadinessGate::new();
        gate.open();
        let (tx, mut rx) = update_channel(gate.clone());

        {
            let next = rx.next();
            tokio::pin!(next);
            assert!(futures::poll!(next.as_mut()).is_pending());

            let (update, _consumed) =
                PendingUpdate::new(UpdateTarget::new("x", "x", None), Vec::new());
            tx.send(update).unwrap();
            gate.close();
            assert!(futures::poll!(next.as_mut()).is_pending());
        }

        gate.open();
        let update = rx.next().await.unwrap();
        assert_eq!(update.target().name(), "x");
    }
}
