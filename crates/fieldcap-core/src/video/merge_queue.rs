use crate::{
    CoreResult,
    merge::{MergeRequest, Merger},
    session::RecordingSession,
    worker::Worker,
};

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    time::Duration,
};

use tracing::{debug, warn};

/// Counts reported when the queue drains.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MergeSummary {
    pub merged: usize,
    pub failed: usize,
}

/// Serial merge worker for one combined session.
///
/// Segments are merged one at a time in rotation order while capture of the
/// next segment continues. Each request owns files no capture span touches
/// again, so merging never races the audio device.
///
/// Once a drain misses its deadline the queue is abandoned: requests not yet
/// started are skipped and stay raw. A merge already running is marked on
/// its segment so finalizing leaves those files alone.
pub(crate) struct MergeQueue {
    tx: mpsc::Sender<MergeRequest>,
    worker: Worker<MergeSummary>,
    abandoned: Arc<AtomicBool>,
}

impl MergeQueue {
    pub(crate) fn spawn(
        merger: Arc<Merger>,
        session: Arc<Mutex<RecordingSession>>,
    ) -> CoreResult<Self> {
        let (tx, rx) = mpsc::channel::<MergeRequest>();
        let abandoned = Arc::new(AtomicBool::new(false));
        let skip = Arc::clone(&abandoned);

        // Drains until every sender is gone rather than watching the stop
        // signal: queued segments are always merged or left raw.
        let worker = Worker::spawn("segment-merge", move |_stop| {
            let mut summary = MergeSummary::default();
            while let Ok(request) = rx.recv() {
                {
                    // Checked under the session lock so finalizing sees
                    // either a skipped request or a running merge.
                    let mut state = session.lock().unwrap_or_else(|e| e.into_inner());
                    if skip.load(Ordering::SeqCst) {
                        debug!(chunk = request.chunk, "Merge skipped after drain deadline");
                        continue;
                    }
                    state.set_merging(request.chunk, true);
                }

                match merger.merge(&request) {
                    Ok(merged) => {
                        session
                            .lock()
                            .unwrap_or_else(|e| e.into_inner())
                            .set_merged(request.chunk, merged);
                        summary.merged += 1;
                    }
                    Err(e) => {
                        session
                            .lock()
                            .unwrap_or_else(|e| e.into_inner())
                            .set_merging(request.chunk, false);
                        warn!(
                            chunk = request.chunk,
                            video = ?request.video,
                            audio = ?request.audio,
                            error = %e,
                            "Merge failed, keeping raw video"
                        );
                        summary.failed += 1;
                    }
                }
            }
            summary
        })?;

        Ok(Self {
            tx,
            worker,
            abandoned,
        })
    }

    pub(crate) fn submit(&self, request: MergeRequest) {
        debug!(chunk = request.chunk, "Merge queued");
        if self.tx.send(request).is_err() {
            warn!("Merge worker gone, segment stays raw");
        }
    }

    /// Close the queue and wait for queued merges to finish. On timeout the
    /// rest of the queue is abandoned.
    pub(crate) fn drain(self, timeout: Duration) -> CoreResult<MergeSummary> {
        drop(self.tx);
        let summary = self.worker.join(timeout);
        if summary.is_err() {
            self.abandoned.store(true, Ordering::SeqCst);
        }
        summary
    }
}
