// Ingest service - owns the shared raw event buffer and its feed task
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Append-only buffer of raw events shared between the subscription feed
/// (producer) and the render path (consumer). Events are appended in
/// arrival order and never pruned or deduplicated here; snapshots are
/// copies, so a render tick never observes a half-appended event.
///
/// One instance per session, injected into its consumers. Growth is
/// unbounded, matching the deployed behavior.
pub struct IngestService {
    buffer: Arc<Mutex<Vec<String>>>,
    forwarder: Mutex<Option<JoinHandle<()>>>,
}

impl IngestService {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(Vec::new())),
            forwarder: Mutex::new(None),
        }
    }

    pub fn push(&self, raw: String) {
        self.buffer.lock().unwrap().push(raw);
    }

    /// Copy of the buffer contents; the buffer itself is left untouched.
    pub fn snapshot(&self) -> Vec<String> {
        self.buffer.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forward events from a subscription channel into the buffer on a
    /// background task. A new feed replaces (and cancels) any previous one.
    pub fn attach(&self, mut events: mpsc::Receiver<String>) {
        let buffer = self.buffer.clone();
        let handle = tokio::spawn(async move {
            while let Some(raw) = events.recv().await {
                tracing::debug!("got event with data {}", raw);
                buffer.lock().unwrap().push(raw);
            }
            tracing::debug!("event channel closed, feed task exiting");
        });
        if let Some(previous) = self.forwarder.lock().unwrap().replace(handle) {
            previous.abort();
        }
    }

    /// Stop the feed task. The buffered events stay readable.
    pub fn shutdown(&self) {
        if let Some(handle) = self.forwarder.lock().unwrap().take() {
            handle.abort();
        }
    }
}

impl Drop for IngestService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_does_not_drain() {
        let ingest = IngestService::new();
        ingest.push("a".to_string());
        ingest.push("b".to_string());
        assert_eq!(ingest.snapshot(), vec!["a", "b"]);
        assert_eq!(ingest.snapshot(), vec!["a", "b"]);
        assert_eq!(ingest.len(), 2);
    }

    #[test]
    fn test_preserves_arrival_order() {
        let ingest = IngestService::new();
        for i in 0..10 {
            ingest.push(i.to_string());
        }
        let expected: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        assert_eq!(ingest.snapshot(), expected);
    }

    #[tokio::test]
    async fn test_attach_feeds_buffer_from_channel() {
        let ingest = IngestService::new();
        let (tx, rx) = mpsc::channel(8);
        ingest.attach(rx);
        tx.send("1.0\tx".to_string()).await.unwrap();
        tx.send("2.0\ty".to_string()).await.unwrap();
        drop(tx);
        // Give the feed task a chance to drain the channel
        for _ in 0..50 {
            if ingest.len() == 2 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        assert_eq!(ingest.snapshot(), vec!["1.0\tx", "2.0\ty"]);
    }

    #[tokio::test]
    async fn test_shutdown_stops_feed() {
        let ingest = IngestService::new();
        let (tx, rx) = mpsc::channel(8);
        ingest.attach(rx);
        ingest.shutdown();
        // The receiver side is gone, so sends eventually fail
        for _ in 0..50 {
            if tx.send("late".to_string()).await.is_err() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        panic!("feed task still alive after shutdown");
    }
}
