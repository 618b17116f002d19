use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast topic with bounded capacity.
/// Slow subscribers miss old messages rather than blocking the publisher.
#[derive(Debug, Clone)]
pub struct Topic<T> {
    tx: broadcast::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Topic<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Returns the number of subscribers that received the message.
    pub fn publish(&self, msg: T) -> usize {
        self.tx.send(Arc::new(msg)).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<T>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let topic: Topic<u64> = Topic::new(4);
        assert_eq!(topic.publish(1), 0);

        let mut a = topic.subscribe();
        let mut b = topic.subscribe();
        assert_eq!(topic.publish(2), 2);
        assert_eq!(*a.recv().await.unwrap(), 2);
        assert_eq!(*b.recv().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_dropping_topic_closes_subscribers() {
        let topic: Topic<u64> = Topic::new(4);
        let mut rx = topic.subscribe();
        topic.publish(5);
        drop(topic);
        assert_eq!(*rx.recv().await.unwrap(), 5);
        assert!(matches!(rx.recv().await, Err(broadcast::error::RecvError::Closed)));
    }
}
