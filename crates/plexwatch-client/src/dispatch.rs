//! Kind-to-handler dispatch table.

use std::collections::HashMap;
use std::fmt;

use plexwatch_events::{EventKind, KNOWN_EVENT_KINDS, Notification};

/// Callback invoked for each notification of a registered kind.
pub type Handler = Box<dyn FnMut(&Notification) + Send + 'static>;

/// Maps notification kinds to handlers.
///
/// A fresh table already holds a no-op for every known kind, so only the
/// kinds a caller cares about need registering. The table is moved into the
/// read task when a session starts; handlers run there, one at a time, in
/// frame order.
pub struct NotificationEvents {
    handlers: HashMap<EventKind, Handler>,
}

impl NotificationEvents {
    /// Table with a no-op handler for each known kind.
    pub fn new() -> Self {
        let mut handlers: HashMap<EventKind, Handler> = HashMap::with_capacity(KNOWN_EVENT_KINDS.len());
        for kind in KNOWN_EVENT_KINDS {
            let _ = handlers.insert(kind, Box::new(|_: &Notification| {}));
        }
        Self { handlers }
    }

    /// Table with no handlers at all.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Install `handler` for `kind`, replacing whatever was there.
    pub fn register<F>(&mut self, kind: impl Into<EventKind>, handler: F) -> &mut Self
    where
        F: FnMut(&Notification) + Send + 'static,
    {
        let _ = self.handlers.insert(kind.into(), Box::new(handler));
        self
    }

    /// Handler for `kind`, if one is registered.
    pub fn resolve(&mut self, kind: &EventKind) -> Option<&mut Handler> {
        self.handlers.get_mut(kind)
    }

    /// Whether `kind` has a handler.
    pub fn contains(&self, kind: &EventKind) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Run the handler for `notification`'s kind. Returns `false` when the
    /// kind has no handler.
    pub fn dispatch(&mut self, notification: &Notification) -> bool {
        match self.resolve(notification.kind()) {
            Some(handler) => {
                handler(notification);
                true
            }
            None => false,
        }
    }

    /// Registered kinds, in no particular order.
    pub fn kinds(&self) -> impl Iterator<Item = &EventKind> {
        self.handlers.keys()
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no kind is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    // ─── Shortcuts ───────────────────────────────────────────────────────

    /// Handle `playing` notifications.
    pub fn on_playing<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&Notification) + Send + 'static,
    {
        self.register(EventKind::Playing, handler)
    }

    /// Handle `transcodeSession.update` notifications.
    pub fn on_transcode_update<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&Notification) + Send + 'static,
    {
        self.register(EventKind::TranscodeSessionUpdate, handler)
    }

    /// Handle `reachability` notifications.
    pub fn on_reachability<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&Notification) + Send + 'static,
    {
        self.register(EventKind::Reachability, handler)
    }

    /// Handle `activity` notifications.
    pub fn on_activity<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&Notification) + Send + 'static,
    {
        self.register(EventKind::Activity, handler)
    }

    /// Handle `timeline` notifications.
    pub fn on_timeline<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&Notification) + Send + 'static,
    {
        self.register(EventKind::Timeline, handler)
    }

    /// Handle `status` notifications.
    pub fn on_status<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&Notification) + Send + 'static,
    {
        self.register(EventKind::Status, handler)
    }
}

impl Default for NotificationEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NotificationEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.handlers.keys().map(EventKind::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("NotificationEvents").field("kinds", &kinds).finish()
    }
}
