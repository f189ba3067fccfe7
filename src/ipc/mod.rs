//! Cross-process event hand-off
//!
//! A window owned by a user process gets its own inbox. The compositor
//! appends a translated copy of every event routed to the window; the process
//! layer pops them later through a non-blocking poll. This is the only state
//! touched from outside the compositor's thread of control, so every access
//! goes through a lock.

use log::warn;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::input::GuiEvent;

/// Identifier of the process owning a window. 0 is the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct OwnerId(pub u32);

impl OwnerId {
    pub const KERNEL: OwnerId = OwnerId(0);

    /// Kernel-owned windows never receive cross-process copies.
    pub fn is_kernel(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid {}", self.0)
    }
}

/// Shared handle to a window's inbound event queue.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct WindowInbox {
    queue: Arc<Mutex<VecDeque<GuiEvent>>>,
    capacity: usize,
}

impl fmt::Debug for WindowInbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowInbox")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl WindowInbox {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            queue: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(64)))),
            capacity,
        }
    }

    /// Appends an event, dropping the oldest one when the inbox is full.
    ///
    /// Returns `false` if an event had to be dropped.
    pub fn push(&self, event: GuiEvent) -> bool {
        let mut queue = self.queue.lock();
        let mut kept_all = true;
        if queue.len() >= self.capacity {
            queue.pop_front();
            kept_all = false;
        }
        queue.push_back(event);
        drop(queue);

        if !kept_all {
            warn!("📭 Window inbox full ({}), dropped oldest event", self.capacity);
        }
        kept_all
    }

    /// Pops the next event without blocking. `None` means "no event".
    pub fn try_next(&self) -> Option<GuiEvent> {
        self.queue.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.queue.lock().clear();
    }
}
