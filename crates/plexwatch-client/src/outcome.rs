//! One-shot terminal callback guard.
//!
//! Both session tasks may race to report how the session ended. Whichever
//! reports first takes the callbacks; later reports are logged and dropped.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::errors::NotifyError;

type ErrorCallback = Box<dyn FnOnce(NotifyError) + Send + 'static>;
type DoneCallback = Box<dyn FnOnce() + Send + 'static>;

struct Callbacks {
    on_error: ErrorCallback,
    on_done: DoneCallback,
}

/// Holds the caller's terminal callbacks until one of them fires.
pub(crate) struct Outcome {
    callbacks: Mutex<Option<Callbacks>>,
}

impl Outcome {
    pub(crate) fn new<E, D>(on_error: E, on_done: D) -> Arc<Self>
    where
        E: FnOnce(NotifyError) + Send + 'static,
        D: FnOnce() + Send + 'static,
    {
        Arc::new(Self {
            callbacks: Mutex::new(Some(Callbacks {
                on_error: Box::new(on_error),
                on_done: Box::new(on_done),
            })),
        })
    }

    /// Report a failure. Returns whether `on_error` ran.
    pub(crate) fn fail(&self, error: NotifyError) -> bool {
        // Lock released before the callback runs.
        let taken = self.callbacks.lock().take();
        match taken {
            Some(callbacks) => {
                (callbacks.on_error)(error);
                true
            }
            None => {
                debug!(error = %error, kind = error.error_kind(), "outcome already reported, dropping error");
                false
            }
        }
    }

    /// Report a normal closure. Returns whether `on_done` ran.
    pub(crate) fn complete(&self) -> bool {
        let taken = self.callbacks.lock().take();
        match taken {
            Some(callbacks) => {
                (callbacks.on_done)();
                true
            }
            None => {
                debug!("outcome already reported, dropping completion");
                false
            }
        }
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.callbacks.lock().is_none()
    }
}
