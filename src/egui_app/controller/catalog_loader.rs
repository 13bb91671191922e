//! Background catalog fetches so slow disks or networks never block a frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread;

use tracing::{debug, warn};

use crate::voices::{self, AssetBase, Catalog, CatalogSource, LoadError};

pub(crate) struct CatalogLoadJob {
    pub request_id: u64,
    pub source: CatalogSource,
    pub asset_base: Option<AssetBase>,
}

pub(crate) struct CatalogLoadResult {
    pub request_id: u64,
    pub source: CatalogSource,
    pub result: Result<Catalog, LoadError>,
}

/// One worker thread fed through a channel.
///
/// Only the result matching the latest request id is handed out; older ones
/// are dropped on arrival. Dropping the loader tells the worker to stop
/// delivering.
pub(crate) struct CatalogLoader {
    jobs: Sender<CatalogLoadJob>,
    results: Receiver<CatalogLoadResult>,
    next_request_id: u64,
    pending: Option<u64>,
    /// Result produced on the caller's thread after the worker went away.
    inline: Option<CatalogLoadResult>,
    alive: Arc<AtomicBool>,
}

impl CatalogLoader {
    pub(crate) fn spawn() -> Self {
        let (jobs, job_rx) = std::sync::mpsc::channel::<CatalogLoadJob>();
        let (result_tx, results) = std::sync::mpsc::channel::<CatalogLoadResult>();
        let alive = Arc::new(AtomicBool::new(true));
        let worker_alive = Arc::clone(&alive);
        thread::spawn(move || {
            while let Ok(job) = job_rx.recv() {
                if !worker_alive.load(Ordering::Acquire) {
                    break;
                }
                let result = voices::load(&job.source, job.asset_base.as_ref());
                if !worker_alive.load(Ordering::Acquire) {
                    debug!("Catalog loader shut down; discarding request {}", job.request_id);
                    break;
                }
                let _ = result_tx.send(CatalogLoadResult {
                    request_id: job.request_id,
                    source: job.source,
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

    /// Queue a load; supersedes whatever was pending.
    pub(crate) fn request(&mut self, source: CatalogSource, asset_base: Option<AssetBase>) -> u64 {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.pending = Some(request_id);
        let job = CatalogLoadJob {
            request_id,
            source,
            asset_base,
        };
        if let Err(err) = self.jobs.send(job) {
            let job = err.0;
            warn!("Catalog worker unavailable; loading {} inline", job.source);
            let result = voices::load(&job.source, job.asset_base.as_ref());
            self.pending = None;
            self.inline = Some(CatalogLoadResult {
                request_id,
                source: job.source,
                result,
            });
        }
        request_id
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.pending.is_some() || self.inline.is_some()
    }

    /// Next result for the current request, if one has arrived.
    pub(crate) fn poll(&mut self) -> Option<CatalogLoadResult> {
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
                    debug!("Dropping stale catalog result {}", stale.request_id);
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    if self.pending.take().is_some() {
                        warn!("Catalog worker exited before answering");
                    }
                    return None;
                }
            }
        }
    }
}

impl Drop for CatalogLoader {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::time::{Duration, Instant};

    /// Answer one HTTP request with a small catalog after `delay`.
    fn serve_catalog_after(delay: Duration) -> url::Url {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                thread::sleep(delay);
                let body = r#"[{"id":"late"}]"#;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        url::Url::parse(&format!("http://{addr}/voices.json")).unwrap()
    }

    /// Poll until the loader gives up on its request, failing if a result shows up.
    fn expect_nothing_delivered(loader: &mut CatalogLoader) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while loader.is_loading() {
            assert!(loader.poll().is_none(), "result delivered after shutdown");
            assert!(Instant::now() < deadline, "worker never exited");
            thread::sleep(Duration::from_millis(5));
        }
        assert!(loader.poll().is_none());
        assert_eq!(loader.pending, None);
    }

    fn wait_for(loader: &mut CatalogLoader) -> CatalogLoadResult {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(result) = loader.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "catalog load timed out");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn loads_catalog_off_thread() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voices.json");
        std::fs::write(&path, r#"[{"id":"a"},{"id":"b"}]"#).unwrap();
        let mut loader = CatalogLoader::spawn();
        let id = loader.request(CatalogSource::File(path), None);
        assert!(loader.is_loading());
        let result = wait_for(&mut loader);
        assert_eq!(result.request_id, id);
        assert_eq!(result.result.unwrap().len(), 2);
        assert!(!loader.is_loading());
    }

    #[test]
    fn only_latest_request_is_delivered() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        std::fs::write(&first, r#"[{"id":"a"}]"#).unwrap();
        std::fs::write(&second, r#"[{"id":"a"},{"id":"b"},{"id":"c"}]"#).unwrap();
        let mut loader = CatalogLoader::spawn();
        loader.request(CatalogSource::File(first), None);
        let latest = loader.request(CatalogSource::File(second.clone()), None);
        let result = wait_for(&mut loader);
        assert_eq!(result.request_id, latest);
        assert_eq!(result.source, CatalogSource::File(second));
        assert_eq!(result.result.unwrap().len(), 3);
    }

    #[test]
    fn failures_come_back_as_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = CatalogLoader::spawn();
        loader.request(CatalogSource::File(dir.path().join("missing.json")), None);
        let result = wait_for(&mut loader);
        assert!(matches!(result.result, Err(LoadError::Read { .. })));
    }

    #[test]
    fn shut_down_worker_skips_queued_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voices.json");
        std::fs::write(&path, r#"[{"id":"a"}]"#).unwrap();
        let mut loader = CatalogLoader::spawn();
        loader.alive.store(false, Ordering::Release);
        loader.request(CatalogSource::File(path), None);
        expect_nothing_delivered(&mut loader);
    }

    #[test]
    fn load_finishing_after_shutdown_is_discarded() {
        let url = serve_catalog_after(Duration::from_millis(300));
        let mut loader = CatalogLoader::spawn();
        loader.request(CatalogSource::Remote(url), None);
        thread::sleep(Duration::from_millis(100));
        loader.alive.store(false, Ordering::Release);
        expect_nothing_delivered(&mut loader);
    }

    #[test]
    fn dropping_the_loader_clears_the_liveness_flag() {
        let loader = CatalogLoader::spawn();
        let alive = Arc::clone(&loader.alive);
        assert!(alive.load(Ordering::Acquire));
        drop(loader);
        assert!(!alive.load(Ordering::Acquire));
    }
}
