//! Sequential pacing queue for non-critical requests

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, trace};
use tokio::sync::{mpsc, oneshot};
use tokio::time::sleep;

use crate::error::{Error, Result};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// FIFO queue drained by a single worker task.
///
/// Jobs run one at a time in submission order, with a fixed pause after
/// each one. A failed job only fails its own caller. There is no retry, no
/// priority and no cancellation.
pub struct RequestQueue {
    delay: Duration,
    sender: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    pending: Arc<AtomicUsize>,
}

impl RequestQueue {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            sender: Mutex::new(None),
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Pause inserted after each job
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Number of jobs submitted but not yet finished
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Enqueue `task` and wait for its result
    pub async fn submit<T, F>(&self, task: F) -> Result<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let pending = self.pending.clone();
        let job: Job = Box::pin(async move {
            let result = task.await;
            pending.fetch_sub(1, Ordering::SeqCst);
            // The caller may have stopped waiting
            let _ = tx.send(result);
        });

        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.worker().send(job).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::general("request queue is closed"));
        }
        debug!("Queued request ({} pending)", self.pending());

        rx.await
            .map_err(|_| Error::general("queued request was dropped before completing"))?
    }

    /// Sender of the running worker, starting one if needed
    fn worker(&self) -> mpsc::UnboundedSender<Job> {
        let mut sender = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        match sender.as_ref() {
            Some(tx) if !tx.is_closed() => tx.clone(),
            _ => {
                let (tx, rx) = mpsc::unbounded_channel();
                tokio::spawn(drain(rx, self.delay));
                *sender = Some(tx.clone());
                tx
            }
        }
    }
}

async fn drain(mut rx: mpsc::UnboundedReceiver<Job>, delay: Duration) {
    debug!("Request queue worker started");
    while let Some(job) = rx.recv().await {
        job.await;
        trace!("Queued request finished, pausing {:?}", delay);
        sleep(delay).await;
    }
    debug!("Request queue worker stopped");
}
