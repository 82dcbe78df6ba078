//! Named background workers with cooperative cancellation and bounded joins.

use crate::{CaptureError, CoreResult};

use std::{
    panic::Location,
    sync::{
        Arc, Condvar, Mutex,
        mpsc::{self, Receiver, RecvTimeoutError},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use error_location::ErrorLocation;
use tracing::{debug, warn};

/// Cancellation token shared between a worker and its owner.
///
/// Waits on the token return early as soon as cancellation is requested, so
/// a worker sleeping between polls reacts without finishing its interval.
#[derive(Clone, Default)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    /// Create a token in the running state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and wake every waiter.
    pub fn trigger(&self) {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock.lock().unwrap_or_else(|e| e.into_inner());
        *stopped = true;
        cvar.notify_all();
    }

    /// Whether cancellation has been requested.
    pub fn is_stopped(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sleep for up to `timeout`. Returns `true` if cancellation was requested.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let stopped = lock.lock().unwrap_or_else(|e| e.into_inner());
        let (stopped, _) = cvar
            .wait_timeout_while(stopped, timeout, |stopped| !*stopped)
            .unwrap_or_else(|e| e.into_inner());
        *stopped
    }
}

/// Handle to a named thread that reports a single result.
pub struct Worker<T> {
    name: String,
    stop: StopSignal,
    result_rx: Receiver<T>,
    handle: JoinHandle<()>,
}

impl<T: Send + 'static> Worker<T> {
    /// Spawn `body` on a new named thread.
    #[track_caller]
    pub fn spawn<F>(name: &str, body: F) -> CoreResult<Self>
    where
        F: FnOnce(StopSignal) -> T + Send + 'static,
    {
        let stop = StopSignal::new();
        let (result_tx, result_rx) = mpsc::sync_channel(1);
        let thread_stop = stop.clone();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let result = body(thread_stop);
                // Owner may have given up waiting; nothing to do then.
                let _ = result_tx.send(result);
            })
            .map_err(|e| CaptureError::IoError {
                source: e,
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(worker = name, "Worker spawned");

        Ok(Self {
            name: name.to_string(),
            stop,
            result_rx,
            handle,
        })
    }

    /// Request cancellation, then wait up to `timeout` for the result.
    #[track_caller]
    pub fn stop_and_join(self, timeout: Duration) -> CoreResult<T> {
        self.stop.trigger();
        self.join(timeout)
    }

    /// Wait up to `timeout` for the worker to finish on its own.
    ///
    /// On timeout the thread is detached and keeps running; the caller gets
    /// [`CaptureError::StopTimeout`] instead of hanging.
    #[track_caller]
    pub fn join(self, timeout: Duration) -> CoreResult<T> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => {
                if self.handle.join().is_err() {
                    warn!(worker = %self.name, "Worker panicked after reporting");
                }
                debug!(worker = %self.name, "Worker joined");
                Ok(result)
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    worker = %self.name,
                    timeout_ms = timeout.as_millis(),
                    "Worker join timed out"
                );
                Err(CaptureError::StopTimeout {
                    worker: self.name,
                    timeout,
                    location: ErrorLocation::from(Location::caller()),
                })
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = self.handle.join();
                Err(CaptureError::WorkerPanicked {
                    worker: self.name,
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }
}
