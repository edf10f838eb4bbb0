//! Write-behind persistence for the result history.
//!
//! The engine hands each history snapshot to a [`Persister`], which writes it
//! from a worker thread so input handling never waits on storage. Queued
//! snapshots are coalesced: only the most recent one is written. Failures go
//! to the injected [`FailureHandler`] and are never retried.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::error::{AbacusError, AbacusResult};
use crate::store::HistoryStore;

/// Callback for persistence failures (load or save).
pub type FailureHandler = Box<dyn Fn(&AbacusError) + Send>;

#[derive(Debug)]
enum Job {
    Save(Vec<f64>),
    Clear,
}

pub struct Persister {
    sender: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl Persister {
    pub fn spawn(store: Box<dyn HistoryStore>, on_failure: FailureHandler) -> AbacusResult<Self> {
        let (sender, receiver) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("abacus-persist".into())
            .spawn(move || run_worker(store, receiver, on_failure))
            .map_err(|e| AbacusError::Persistence(format!("cannot start persistence worker: {e}")))?;
        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Queue a full snapshot of the history, most recent first.
    pub fn save(&self, values: Vec<f64>) {
        self.send(Job::Save(values));
    }

    /// Queue removal of every persisted entry.
    pub fn clear(&self) {
        self.send(Job::Clear);
    }

    fn send(&self, job: Job) {
        let Some(sender) = &self.sender else {
            return;
        };
        if let Err(e) = sender.send(job) {
            warn!("persistence worker is gone, dropping {:?}", e.0);
        }
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain what is queued and exit.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("persistence worker panicked");
            }
        }
    }
}

fn run_worker(mut store: Box<dyn HistoryStore>, receiver: Receiver<Job>, on_failure: FailureHandler) {
    while let Ok(mut job) = receiver.recv() {
        // Last write wins.
        while let Ok(next) = receiver.try_recv() {
            job = next;
        }

        let result = match &job {
            Job::Save(values) => {
                debug!(count = values.len(), "saving history");
                store.save(values)
            }
            Job::Clear => {
                debug!("clearing history");
                store.clear()
            }
        };

        if let Err(e) = result {
            warn!("history persistence failed: {e}");
            on_failure(&e);
        }
    }
}
