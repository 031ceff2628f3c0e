//! Alert Dispatcher (spec.md §4.7): a bounded queue with exactly one
//! consumer. `tokio::sync::mpsc` gives us the bounded-channel-with-blocking-
//! send semantics directly — `send` on a full channel awaits, which is the
//! explicit back-pressure the spec calls for (preferred over a silent drop).

use crate::engine::domain::AlertEvent;
use crate::engine::repository::NotificationConsumer;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct AlertDispatcher {
    sender: Option<mpsc::Sender<AlertEvent>>,
    consumer_task: Option<JoinHandle<()>>,
}

impl AlertDispatcher {
    /// Spawn the single consumer task and return a handle. `buffer_size`
    /// matches spec.md §4.7's `BUFFER_SIZE` (default 100).
    pub fn start(buffer_size: usize, consumer: Arc<dyn NotificationConsumer>) -> Self {
        let (sender, mut receiver) = mpsc::channel(buffer_size.max(1));

        let consumer_task = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                consumer.deliver(event).await;
            }
        });

        Self {
            sender: Some(sender),
            consumer_task: Some(consumer_task),
        }
    }

    /// Enqueue an alert. Blocks (awaits) if the queue is full — the
    /// back-pressure contract from spec.md §4.7 and §5.
    pub async fn dispatch(&self, event: AlertEvent) {
        // The only failure mode is the receiver being dropped, which only
        // happens after `close()`; dispatching past shutdown is a caller bug
        // we silently absorb rather than panic on.
        if let Some(sender) = &self.sender {
            let _ = sender.send(event).await;
        }
    }

    /// Drop the sender so the consumer drains the remaining queue and
    /// returns, then wait for it to finish.
    pub async fn close(mut self) {
        self.sender.take();
        if let Some(task) = self.consumer_task.take() {
            let _ = task.await;
        }
    }
}
