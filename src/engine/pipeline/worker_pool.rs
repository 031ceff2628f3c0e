//! Worker Pool (spec.md §4.8): a fixed-size pool of tasks consuming a
//! bounded job queue. The per-target handler is injected at construction —
//! the pool has no knowledge of the pipeline it's running. Panics inside a
//! handler are caught so one bad target never kills the pool (this is why
//! `panic = "unwind"` is required in the release profile instead of the
//! teacher's original `abort`).

use crate::engine::diagnostics;
use crate::engine::domain::Target;
use crate::engine::logging::EngineLogger;
use futures::FutureExt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub type TargetHandler = Arc<dyn Fn(Target) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct WorkerPool {
    sender: Option<mpsc::Sender<Target>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `worker_count` tasks reading from a `buffer_size`-deep channel.
    pub fn start(worker_count: usize, buffer_size: usize, handler: TargetHandler, logger: Arc<EngineLogger>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let mut workers = Vec::with_capacity(worker_count.max(1));
        for _ in 0..worker_count.max(1) {
            let receiver = receiver.clone();
            let handler = handler.clone();
            let logger = logger.clone();

            workers.push(tokio::spawn(async move {
                loop {
                    let target = {
                        let mut guard = receiver.lock().await;
                        guard.recv().await
                    };
                    let Some(target) = target else { break };
                    let target_id = target.id;

                    let outcome = std::panic::AssertUnwindSafe(handler(target)).catch_unwind().await;
                    if let Err(payload) = outcome {
                        let message = panic_message(&payload);
                        logger.worker_panic(target_id, &message);
                        diagnostics::record_panic(target_id, message);
                    }
                }
            }));
        }

        Self {
            sender: Some(sender),
            workers,
        }
    }

    /// Enqueue a single target. Awaits (blocks) if the queue is full.
    pub async fn submit(&self, target: Target) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(target).await;
        }
    }

    /// Enqueue a batch without blocking the caller: spawns a detached
    /// producer task so a buffer smaller than the batch doesn't stall the
    /// scheduler tick that called this.
    pub fn submit_batch(&self, targets: Vec<Target>) {
        if let Some(sender) = self.sender.clone() {
            tokio::spawn(async move {
                for target in targets {
                    let _ = sender.send(target).await;
                }
            });
        }
    }

    /// Close the input channel and wait for every worker to drain and exit.
    pub async fn stop(mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.await;
        }
    }
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked with a non-string payload".to_string()
    }
}
