use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::models::error::CaptureError;

/// Why a start attempt was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The user asked to stop. A recording that already went live is kept.
    Stop,
    /// The user asked to abort. Nothing is kept.
    Abort,
    /// The shared display ended.
    SourceEnded,
}

/// Cancellation token shared by a start attempt and whoever may abort it.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<Option<CancelReason>>, Condvar)>,
}

impl CancelToken {
    /// The first reason sticks, except that `Abort` overrides any other.
    pub fn cancel(&self, reason: CancelReason) {
        let (slot, cvar) = &*self.inner;
        let mut current = slot.lock();
        if current.is_none() || reason == CancelReason::Abort {
            *current = Some(reason);
        }
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.0.lock().is_some()
    }

    pub fn reason(&self) -> Option<CancelReason> {
        *self.inner.0.lock()
    }

    /// Sleep up to `timeout`. Returns `true` if cancelled meanwhile.
    pub fn wait(&self, timeout: Duration) -> bool {
        let (slot, cvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut reason = slot.lock();
        while reason.is_none() {
            if cvar.wait_until(&mut reason, deadline).timed_out() {
                break;
            }
        }
        reason.is_some()
    }
}

/// Count down from `steps` to 1, calling `on_step` before each wait.
///
/// Fails with `CaptureAborted` as soon as `token` is cancelled.
pub fn run_countdown<F>(
    steps: u8,
    interval: Duration,
    token: &CancelToken,
    mut on_step: F,
) -> Result<(), CaptureError>
where
    F: FnMut(u8),
{
    for remaining in (1..=steps).rev() {
        if token.is_cancelled() {
            return Err(CaptureError::CaptureAborted);
        }
        on_step(remaining);
        if token.wait(interval) {
            return Err(CaptureError::CaptureAborted);
        }
    }
    if token.is_cancelled() {
        return Err(CaptureError::CaptureAborted);
    }
    Ok(())
}
