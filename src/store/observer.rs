//! Change notification for the project store

use crate::types::NodeId;

/// What changed in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Nodes were created, deleted, renamed or toggled
    TreeChanged { revision: u64 },
    /// A file's content was overwritten
    ContentChanged { revision: u64, file: NodeId },
    /// Open tabs, active tab or selection changed
    TabsChanged { revision: u64 },
    /// The whole project was replaced by an import or a session load
    ProjectReplaced { revision: u64 },
}

/// Handle returned by subscribe, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&StoreEvent)>;

/// Subscriber list, notified in subscription order
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn notify(&mut self, event: &StoreEvent) {
        for (_, callback) in &mut self.subscribers {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
