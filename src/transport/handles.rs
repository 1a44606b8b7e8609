use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use super::error::TransportError;
use super::traits::HandleId;

/// Which side of a topic a handle was opened for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleRole {
    Reader,
    Writer,
}

/// Bookkeeping of open handles, shared by the in-process transports
#[derive(Debug, Default)]
pub struct HandleTable {
    next: AtomicU64,
    open: DashMap<HandleId, (HandleRole, String)>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, role: HandleRole, topic: &str) -> HandleId {
        let id = HandleId(self.next.fetch_add(1, Ordering::Relaxed) + 1);
        self.open.insert(id, (role, topic.to_string()));
        id
    }

    pub fn release(&self, id: HandleId) -> Result<(), TransportError> {
        self.open
            .remove(&id)
            .map(|_| ())
            .ok_or(TransportError::UnknownHandle(id))
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    pub fn role(&self, id: HandleId) -> Option<HandleRole> {
        self.open.get(&id).map(|entry| entry.value().0)
    }
}
