//! Thread liveness: is the thread on the other end of a pipe still running?
//!
//! Each thread owns a heartbeat token in a thread-local. A [`ThreadHandle`]
//! keeps only a weak reference to it, which stops upgrading once the thread
//! has exited and its thread-locals have been dropped.

use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

thread_local! {
    static HEARTBEAT: Arc<()> = Arc::new(());
}

/// Identity and liveness of a thread that touched a pipe.
#[derive(Clone, Debug)]
pub(crate) struct ThreadHandle {
    id: ThreadId,
    name: Option<String>,
    heartbeat: Weak<()>,
}

impl ThreadHandle {
    /// Handle for the calling thread.
    pub(crate) fn current() -> Self {
        let current = thread::current();
        // During thread teardown the token is already gone: treat as dead.
        let heartbeat = HEARTBEAT.try_with(Arc::downgrade).unwrap_or_default();
        Self {
            id: current.id(),
            name: current.name().map(str::to_string),
            heartbeat,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.heartbeat.strong_count() > 0
    }

    pub(crate) fn is_current(&self) -> bool {
        self.id == thread::current().id()
    }

    pub(crate) fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_thread_is_alive() {
        let handle = ThreadHandle::current();
        assert!(handle.is_alive());
        assert!(handle.is_current());
    }

    #[test]
    fn test_exited_thread_is_dead() {
        let handle = std::thread::Builder::new()
            .name("short-lived".into())
            .spawn(ThreadHandle::current)
            .unwrap()
            .join()
            .unwrap();

        assert!(!handle.is_current());
        assert_eq!(handle.name(), "short-lived");
        assert!(!handle.is_alive());
    }
}
