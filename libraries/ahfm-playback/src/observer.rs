//! Observer registry for playback events

use crate::types::PlaybackEvent;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Callback invoked for every playback event
pub type Observer = Arc<dyn Fn(&PlaybackEvent) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe
///
/// Ids increase monotonically, so an id also tells when an observer joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

/// Explicit list of observers with add/remove
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    entries: Vec<(SubscriptionId, Observer)>,
}

impl ObserverRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn contains(&self, id: SubscriptionId) -> bool {
        self.entries.iter().any(|(entry_id, _)| *entry_id == id)
    }

    /// Id the next subscriber will get
    ///
    /// Events record this when queued so observers that subscribe later do
    /// not receive them.
    pub(crate) fn watermark(&self) -> SubscriptionId {
        SubscriptionId(self.next_id)
    }

    /// Observers that were already subscribed when `watermark` was taken
    pub(crate) fn snapshot(&self, watermark: SubscriptionId) -> Vec<(SubscriptionId, Observer)> {
        self.entries
            .iter()
            .filter(|(id, _)| *id < watermark)
            .map(|(id, observer)| (*id, Arc::clone(observer)))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
