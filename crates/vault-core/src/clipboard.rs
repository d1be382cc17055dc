//! Copy secrets to the clipboard and clear them after a delay
//!
//! Each copy replaces the pending clear task; a clear never fires for a
//! copy that has since been superseded.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::Result;

/// System clipboard access, implemented by the UI layer
pub trait Clipboard: Send + Sync + 'static {
    fn set_text(&self, text: &str) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Clipboard wrapper with a cancellable auto-clear task
pub struct ClipboardGuard<C: Clipboard> {
    clipboard: Arc<C>,
    clear_after: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<C: Clipboard> ClipboardGuard<C> {
    pub fn new(clipboard: Arc<C>, clear_after: Duration) -> Self {
        Self {
            clipboard,
            clear_after,
            pending: Mutex::new(None),
        }
    }

    /// Copy `secret` and schedule the clipboard to be cleared
    ///
    /// Must be called from within a tokio runtime.
    pub async fn copy(&self, secret: &str) -> Result<()> {
        let mut pending = self.pending.lock().await;
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        self.clipboard.set_text(secret)?;

        let clipboard = self.clipboard.clone();
        let delay = self.clear_after;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match clipboard.clear() {
                Ok(()) => debug!("Cleared clipboard after {:?}", delay),
                Err(e) => warn!("Failed to clear clipboard: {}", e),
            }
        }));

        Ok(())
    }

    /// Cancel the pending clear; returns whether one was still pending
    pub async fn cancel(&self) -> bool {
        match self.pending.lock().await.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Whether a clear is still scheduled
    pub async fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<C: Clipboard> Drop for ClipboardGuard<C> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}
