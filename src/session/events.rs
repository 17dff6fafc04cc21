//! Session events delivered to observers

use crate::path::VirtualPath;
use crate::session::state::SessionState;

/// Bytes sent so far for one file of an upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    pub file: String,
    pub transferred: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StateChanged(SessionState),
    /// A path repeated the container name and was rewritten.
    ContainerPrefixStripped {
        original: String,
        resolved: VirtualPath,
    },
    UploadProgress(UploadProgress),
    UploadCompleted { key: VirtualPath },
    /// The listing refresh that follows a mutation failed.
    RefreshFailed(String),
}

pub type Observer = Box<dyn Fn(&SessionEvent) + Send + Sync>;

/// Fan-out of events to every subscribed observer.
#[derive(Default)]
pub struct Observers {
    observers: Vec<Observer>,
}

impl Observers {
    pub fn subscribe(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    pub fn emit(&self, event: &SessionEvent) {
        for observer in &self.observers {
            observer(event);
        }
    }
}
