use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Cancellable countdown for the automated-reply trigger. At most one
/// countdown/trigger pair is pending at a time: arming a new one supersedes
/// the previous, and `cancel` stops both the countdown and the trigger as a
/// unit. The visible countdown is derived from the stored deadline.
pub struct ReplyScheduler {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    pending: Option<Pending>,
    generation: u64,
}

struct Pending {
    generation: u64,
    deadline: Instant,
    handle: JoinHandle<()>,
}

impl Default for ReplyScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplyScheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Arms the countdown; `fire` runs exactly once when it expires. Any
    /// previously armed countdown is cancelled first.
    pub fn start<F>(&self, delay: Duration, fire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut inner = self.inner.lock().unwrap();
        if let Some(pending) = inner.pending.take() {
            pending.handle.abort();
        }

        inner.generation += 1;
        let generation = inner.generation;
        let deadline = Instant::now() + delay;

        let shared = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // Claim the pending slot before firing: once claimed, a late
            // cancel() is a no-op instead of a second trigger.
            {
                let mut inner = shared.lock().unwrap();
                match &inner.pending {
                    Some(pending) if pending.generation == generation => {
                        inner.pending = None;
                    }
                    _ => return, // superseded or cancelled
                }
            }

            fire.await;
        });

        inner.pending = Some(Pending {
            generation,
            deadline,
            handle,
        });
    }

    /// Idempotently stops the countdown and its pending trigger.
    pub fn cancel(&self) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        if let Some(pending) = inner.pending.take() {
            pending.handle.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.inner.lock().unwrap().pending.is_some()
    }

    /// Remaining countdown, if one is armed.
    pub fn remaining(&self) -> Option<Duration> {
        self.inner
            .lock()
            .unwrap()
            .pending
            .as_ref()
            .map(|p| p.deadline.saturating_duration_since(Instant::now()))
    }
}

/// Teardown releases the timer regardless of exit path.
impl Drop for ReplyScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
