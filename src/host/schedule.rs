//! Cancellable settle timer.

use std::fmt;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::identifiers::DispatchId;

// ============================================================================
// PendingSend
// ============================================================================

/// A token send waiting for its settle delay to elapse.
///
/// Dropping the handle detaches the timer; call [`PendingSend::cancel`] to
/// stop it.
pub struct PendingSend {
    id: DispatchId,
    task: JoinHandle<()>,
}

impl fmt::Debug for PendingSend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingSend")
            .field("id", &self.id)
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

impl PendingSend {
    /// Runs `fire` on `runtime` once `delay` has elapsed.
    pub(crate) fn schedule<F>(runtime: &Handle, delay: Duration, fire: F) -> Self
    where
        F: FnOnce(DispatchId) + Send + 'static,
    {
        let id = DispatchId::generate();
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            fire(id);
        });

        trace!(dispatch_id = %id, delay_ms = delay.as_millis() as u64, "Token send scheduled");
        Self { id, task }
    }

    /// Returns the dispatch id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> DispatchId {
        self.id
    }

    /// Returns `true` once the timer has fired or been cancelled.
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the timer. Has no effect if it already fired.
    pub fn cancel(self) {
        trace!(dispatch_id = %self.id, "Token send cancelled");
        self.task.abort();
    }
}

// ============================================================================
// Tests
// ============================================================================
