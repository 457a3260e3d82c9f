use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info};
use uuid::Uuid;
use wow_types::Snapshot;

use crate::error::HubResult;
use crate::message::{Frame, PushMessage};

/// Identifier of one live observer connection.
pub type ObserverId = Uuid;

/// Configuration for the [`BroadcastHub`].
#[derive(Clone, Debug)]
pub struct HubConfig {
    /// Frames buffered per observer before it counts as not ready.
    pub observer_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self { observer_buffer: 16 }
    }
}

/// Receiving end handed to an observer on registration.
#[derive(Debug)]
pub struct Subscription {
    id: ObserverId,
    receiver: mpsc::Receiver<Frame>,
}

impl Subscription {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Wait for the next frame. `None` once the hub has dropped this observer.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.receiver.recv().await
    }

    /// Take a frame if one is already queued.
    pub fn try_recv(&mut self) -> Option<Frame> {
        self.receiver.try_recv().ok()
    }
}

/// Per-broadcast delivery counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Observers that had the frame queued.
    pub delivered: usize,
    /// Observers whose buffer was full; they miss this frame only.
    pub skipped: usize,
    /// Observers whose receiver was gone; removed from the set.
    pub pruned: usize,
}

/// Registry of live observers with whole-state fan-out.
///
/// Membership only, no ordering between observers. Sends never block: a
/// full observer is skipped and a closed one is pruned, so one slow client
/// can never hold up the rest.
pub struct BroadcastHub {
    observers: RwLock<HashMap<ObserverId, mpsc::Sender<Frame>>>,
    config: HubConfig,
}

impl BroadcastHub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            observers: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Register an observer and queue `snapshot` as its first message.
    ///
    /// The snapshot is encoded before the observer joins, so an encoding
    /// failure leaves the set untouched.
    pub fn connect(&self, snapshot: &Snapshot) -> HubResult<Subscription> {
        let frame = PushMessage::WishesList(snapshot.clone()).encode()?;
        let subscription = self.register();
        self.send_to(subscription.id, frame);
        info!(observer = %subscription.id, wishes = snapshot.len(), "observer connected");
        Ok(subscription)
    }

    /// Add an observer without sending anything.
    pub fn register(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.config.observer_buffer.max(1));
        let id = Uuid::now_v7();
        self.observers
            .write()
            .expect("hub lock poisoned")
            .insert(id, tx);
        Subscription { id, receiver: rx }
    }

    /// Remove an observer. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ObserverId) -> bool {
        let removed = self
            .observers
            .write()
            .expect("hub lock poisoned")
            .remove(&id)
            .is_some();
        if removed {
            info!(observer = %id, "observer disconnected");
        }
        removed
    }

    /// Queue a frame for a single observer. Returns `true` if it was queued.
    pub fn send_to(&self, id: ObserverId, frame: Frame) -> bool {
        let observers = self.observers.read().expect("hub lock poisoned");
        match observers.get(&id) {
            Some(sender) => sender.try_send(frame).is_ok(),
            None => false,
        }
    }

    /// Push `snapshot` to every connected observer.
    ///
    /// Fails only if the snapshot cannot be encoded, in which case nothing
    /// is sent to anyone.
    pub fn broadcast(&self, snapshot: &Snapshot) -> HubResult<BroadcastReport> {
        let frame = PushMessage::WishesList(snapshot.clone()).encode()?;
        let mut report = BroadcastReport::default();

        let mut observers = self.observers.write().expect("hub lock poisoned");
        observers.retain(|id, sender| match sender.try_send(frame.clone()) {
            Ok(()) => {
                report.delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                debug!(observer = %id, "observer not ready; skipped");
                report.skipped += 1;
                true
            }
            Err(TrySendError::Closed(_)) => {
                debug!(observer = %id, "observer gone; pruned");
                report.pruned += 1;
                false
            }
        });

        debug!(
            delivered = report.delivered,
            skipped = report.skipped,
            pruned = report.pruned,
            "snapshot broadcast"
        );
        Ok(report)
    }

    /// Current number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.read().expect("hub lock poisoned").len()
    }

    pub fn contains(&self, id: ObserverId) -> bool {
        self.observers
            .read()
            .expect("hub lock poisoned")
            .contains_key(&id)
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

impl std::fmt::Debug for BroadcastHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastHub")
            .field("observers", &self.observer_count())
            .field("observer_buffer", &self.config.observer_buffer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wow_types::WishDisplay;

    fn snapshot_with(total_donations: u64) -> Snapshot {
        Snapshot::new(vec![WishDisplay {
            id: 1,
            title: "Peace".into(),
            timestamp: Utc::now(),
            pubkey: "addr".into(),
            wallet_address: None,
            signature: None,
            total_donations,
        }])
    }

    fn decode(frame: Frame) -> Snapshot {
        let PushMessage::WishesList(snapshot) = PushMessage::decode(&frame).unwrap();
        snapshot
    }

    #[tokio::test]
    async fn connect_sends_initial_snapshot() {
        let hub = BroadcastHub::default();
        let mut sub = hub.connect(&snapshot_with(0)).unwrap();
        assert_eq!(hub.observer_count(), 1);
        assert!(hub.contains(sub.id()));

        let first = decode(sub.recv().await.unwrap());
        assert_eq!(first.wishes()[0].total_donations, 0);
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn broadcast_reaches_every_observer() {
        let hub = BroadcastHub::default();
        let mut a = hub.register();
        let mut b = hub.register();

        let report = hub.broadcast(&snapshot_with(2)).unwrap();
        assert_eq!(report.delivered, 2);

        for sub in [&mut a, &mut b] {
            let snap = decode(sub.recv().await.unwrap());
            assert_eq!(snap.wishes()[0].total_donations, 2);
        }
    }

    #[test]
    fn disconnect_is_idempotent() {
        let hub = BroadcastHub::default();
        let sub = hub.register();
        assert!(hub.disconnect(sub.id()));
        assert!(!hub.disconnect(sub.id()));
        assert_eq!(hub.observer_count(), 0);
        assert!(!hub.send_to(sub.id(), Frame::from("x")));
    }

    #[test]
    fn full_observer_is_skipped_not_blocking() {
        let hub = BroadcastHub::new(HubConfig { observer_buffer: 1 });
        let mut slow = hub.register();
        let mut fast = hub.register();

        assert_eq!(hub.broadcast(&snapshot_with(1)).unwrap().delivered, 2);
        // Fast observer drains, slow one does not.
        assert!(fast.try_recv().is_some());

        let report = hub.broadcast(&snapshot_with(2)).unwrap();
        assert_eq!(report.delivered, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(hub.observer_count(), 2);

        assert_eq!(decode(fast.try_recv().unwrap()).wishes()[0].total_donations, 2);
        // The slow observer kept only the frame it had room for.
        assert_eq!(decode(slow.try_recv().unwrap()).wishes()[0].total_donations, 1);
        assert!(slow.try_recv().is_none());
    }

    #[test]
    fn closed_observer_is_pruned() {
        let hub = BroadcastHub::default();
        let gone = hub.register();
        let _alive = hub.register();
        drop(gone);

        let report = hub.broadcast(&snapshot_with(0)).unwrap();
        assert_eq!(report.delivered, 1);
        assert_eq!(report.pruned, 1);
        assert_eq!(hub.observer_count(), 1);
    }

    #[test]
    fn late_observer_gets_state_not_history() {
        let hub = BroadcastHub::default();
        hub.broadcast(&snapshot_with(1)).unwrap();
        hub.broadcast(&snapshot_with(2)).unwrap();

        let mut late = hub.connect(&snapshot_with(2)).unwrap();
        assert_eq!(decode(late.try_recv().unwrap()).wishes()[0].total_donations, 2);
        assert!(late.try_recv().is_none());
    }
}
