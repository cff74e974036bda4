//! Input activity as seen by the inactivity monitor.
//!
//! The UI layer forwards raw input events into an [`ActivitySurface`]; each
//! mounted monitor holds one listener on it for as long as it is mounted.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    MouseDown,
    KeyDown,
    Scroll,
    TouchStart,
    Click,
    MouseMove,
    KeyUp,
    Focus,
}

impl InputKind {
    /// Inputs that count as the user being present
    pub const QUALIFYING: [InputKind; 5] = [
        InputKind::MouseDown,
        InputKind::KeyDown,
        InputKind::Scroll,
        InputKind::TouchStart,
        InputKind::Click,
    ];

    pub fn is_qualifying(self) -> bool {
        Self::QUALIFYING.contains(&self)
    }
}

/// Global input surface. Cloneable; all clones feed the same listeners.
#[derive(Clone)]
pub struct ActivitySurface {
    tx: broadcast::Sender<InputKind>,
}

impl ActivitySurface {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tx: broadcast::channel(capacity).0,
        }
    }

    /// Forward one input event. No-op when nothing is listening.
    pub fn emit(&self, kind: InputKind) {
        let _ = self.tx.send(kind);
    }

    /// Number of registered listeners (one per mounted, enabled monitor)
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub(crate) fn listen(&self) -> broadcast::Receiver<InputKind> {
        self.tx.subscribe()
    }
}

impl Default for ActivitySurface {
    fn default() -> Self {
        Self::new()
    }
}

/// Last-activity timestamp, owned by a single monitor task
#[derive(Debug, Clone, Copy)]
pub(crate) struct ActivityState {
    last_activity: Instant,
}

impl ActivityState {
    pub(crate) fn new(now: Instant) -> Self {
        Self { last_activity: now }
    }

    pub(crate) fn touch(&mut self, now: Instant) {
        self.last_activity = now;
    }

    pub(crate) fn last_activity(&self) -> Instant {
        self.last_activity
    }

    pub(crate) fn deadline(&self, timeout: Duration) -> Instant {
        self.last_activity + timeout
    }
}
