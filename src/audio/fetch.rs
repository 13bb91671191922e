//! Off-thread reads of preview audio so a slow disk or URL never stalls a frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread;

use tracing::{debug, warn};

use super::PlaybackError;
use super::source::{AudioLocation, read_audio_bytes};

pub(super) struct FetchJob {
    pub request_id: u64,
    pub location: AudioLocation,
}

pub(super) struct FetchResult {
    pub request_id: u64,
    pub location: AudioLocation,
    pub result: Result<Vec<u8>, PlaybackError>,
}

/// Single fetch worker. Only the latest request is ever handed back; a new
/// request or [`AudioFetcher::cancel`] makes older ones stale.
pub(super) struct AudioFetcher {
    jobs: Sender<FetchJob>,
    results: Receiver<FetchResult>,
    next_request_id: u64,
    pending: Option<u64>,
    inline: Option<FetchResult>,
    alive: Arc<AtomicBool>,
}

impl AudioFetcher {
    pub(super) fn spawn() -> Self {
        let (jobs, job_rx) = std::sync::mpsc::channel::<FetchJob>();
        let (result_tx, results) = std::sync::mpsc::channel::<FetchResult>();
        let alive = Arc::new(AtomicBool::new(true));
        let worker_alive = Arc::clone(&alive);
        thread::spawn(move || {
            while let Ok(job) = job_rx.recv() {
                if !worker_alive.load(Ordering::Acquire) {
                    break;
                }
                let result = read_audio_bytes(&job.location);
                if !worker_alive.load(Ordering::Acquire) {
                    break;
                }
                let _ = result_tx.send(FetchResult {
                    request_id: job.request_id,
                    location: job.location,
                    result,
                });
            }
        });
        Self {
            jobs,
            results,
            next_request_id: 1,
            pending: None,
            inline: None,
            alive,
        }
    }

    /// Queue a read of `location`, superseding any pending one.
    pub(super) fn request(&mut self, location: AudioLocation) -> u64 {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.pending = Some(request_id);
        self.inline = None;
        if let Err(err) = self.jobs.send(FetchJob {
            request_id,
            location,
        }) {
            let job = err.0;
            warn!("Audio fetch worker unavailable; reading {} inline", job.location);
            let result = read_audio_bytes(&job.location);
            self.pending = None;
            self.inline = Some(FetchResult {
                request_id,
                location: job.location,
                result,
            });
        }
        request_id
    }

    /// Forget the pending request; its bytes are dropped when they arrive.
    pub(super) fn cancel(&mut self) {
        self.pending = None;
        self.inline = None;
    }

    pub(super) fn is_pending(&self) -> bool {
        self.pending.is_some() || self.inline.is_some()
    }

    /// Result for the latest request, once it has arrived.
    pub(super) fn poll(&mut self) -> Option<FetchResult> {
        if let Some(result) = self.inline.take() {
            return Some(result);
        }
        loop {
            match self.results.try_recv() {
                Ok(result) if Some(result.request_id) == self.pending => {
                    self.pending = None;
                    return Some(result);
                }
                Ok(stale) => {
                    debug!("Dropping stale audio fetch {}", stale.request_id);
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    let request_id = self.pending.take()?;
                    warn!("Audio fetch worker exited before answering {request_id}");
                    return None;
                }
            }
        }
    }
}

impl Drop for AudioFetcher {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}
