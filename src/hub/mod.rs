//! Notification hub: observer set, bounded outbound queue, fan-out worker.
//!
//! [`NotificationHub`] decouples event producers from delivery. Producers
//! enqueue serialized envelopes on a bounded queue and return immediately;
//! a single long-lived fan-out task drains the queue in FIFO order and
//! writes each frame to every enrolled observer. A write failure evicts
//! only the failing observer, so one broken connection never stalls
//! delivery to the rest.
//!
//! Backpressure: when the queue is full, [`NotificationHub::publish`]
//! blocks the calling task until space frees. Nothing is ever dropped.
//! The worker does not dequeue while the observer set is empty, so events
//! published before the first observer connects stay queued and are
//! delivered right after that observer's initial snapshot.

pub mod connection;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, mpsc, watch};

use crate::domain::{Envelope, SnapshotSource};
use crate::error::GatewayError;

pub use connection::{ConnectionId, ObserverConnection};

/// Greeting text frame sent to every observer before its snapshot.
pub const GREETING: &str = "Connected to listener-gateway event stream";

/// Fan-out hub for the observer push channel.
///
/// Cheap to clone; all clones share the same observer set and queue.
/// Holds a capability-scoped [`SnapshotSource`] so it can bring newly
/// joined observers up to date without a reference to the full registry.
pub struct NotificationHub {
    inner: Arc<HubInner>,
    queue_tx: mpsc::Sender<String>,
}

struct HubInner {
    connections: Mutex<HashMap<ConnectionId, Box<dyn ObserverConnection>>>,
    // Mirrors connections.len(); the fan-out worker waits on it so the
    // queue is only drained while someone is listening.
    observer_count: watch::Sender<usize>,
    next_id: AtomicU64,
    snapshots: Arc<dyn SnapshotSource>,
}

impl Clone for NotificationHub {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            queue_tx: self.queue_tx.clone(),
        }
    }
}

impl fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationHub").finish_non_exhaustive()
    }
}

impl NotificationHub {
    /// Creates the hub and spawns its fan-out worker.
    ///
    /// `queue_capacity` bounds the outbound queue; a full queue blocks
    /// publishers. The worker runs until `shutdown` flips to `true` or
    /// its sender is dropped.
    #[must_use]
    pub fn start(
        queue_capacity: usize,
        snapshots: Arc<dyn SnapshotSource>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel(queue_capacity.max(1));
        let (observer_count, _) = watch::channel(0usize);
        let inner = Arc::new(HubInner {
            connections: Mutex::new(HashMap::new()),
            observer_count,
            next_id: AtomicU64::new(1),
            snapshots,
        });

        tokio::spawn(fanout_loop(Arc::clone(&inner), queue_rx, shutdown));

        Self { inner, queue_tx }
    }

    /// Enrolls a new observer connection.
    ///
    /// Sends the greeting frame and a `listener_status` envelope built
    /// from the current snapshot directly on the connection, then adds
    /// it to the broadcast set. The snapshot therefore always precedes
    /// any broadcast frame the observer sees.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot envelope cannot be encoded or if
    /// either handshake write fails; the connection is closed and never
    /// enrolled.
    pub async fn accept(
        &self,
        mut conn: Box<dyn ObserverConnection>,
    ) -> Result<ConnectionId, GatewayError> {
        if let Err(err) = self.handshake(conn.as_mut()).await {
            conn.close().await;
            return Err(err);
        }

        let id = ConnectionId::new(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let mut conns = self.inner.connections.lock().await;
        conns.insert(id, conn);
        let _ = self.inner.observer_count.send_replace(conns.len());
        drop(conns);

        tracing::info!(connection = %id, "observer enrolled");
        Ok(id)
    }

    async fn handshake(&self, conn: &mut dyn ObserverConnection) -> Result<(), GatewayError> {
        conn.send_text(GREETING).await?;
        let infos = self.inner.snapshots.snapshot().await;
        let frame = Envelope::listener_status(infos).encode()?;
        conn.send_text(&frame).await
    }

    /// Appends a serialized envelope to the outbound queue.
    ///
    /// Blocks the calling task while the queue is at capacity; this is
    /// the system's sole backpressure mechanism. Returns once enqueued,
    /// not once delivered. If the hub has shut down the frame is logged
    /// and discarded.
    pub async fn publish(&self, frame: String) {
        if self.queue_tx.send(frame).await.is_err() {
            tracing::warn!("notification hub is shut down; discarding event");
        }
    }

    /// Writes one frame directly to a single enrolled observer.
    ///
    /// Used for the echo path. A write failure evicts the connection,
    /// same as a broadcast failure.
    pub async fn send_to(&self, id: ConnectionId, frame: &str) {
        let mut conns = self.inner.connections.lock().await;
        let Some(conn) = conns.get_mut(&id) else {
            return;
        };
        if let Err(err) = conn.send_text(frame).await {
            tracing::warn!(connection = %id, %err, "dropping observer after write failure");
            if let Some(mut conn) = conns.remove(&id) {
                conn.close().await;
            }
            let _ = self.inner.observer_count.send_replace(conns.len());
        }
    }

    /// Removes and closes an observer connection.
    ///
    /// No-op if the connection is not enrolled (it may already have been
    /// evicted by a failed write).
    pub async fn disconnect(&self, id: ConnectionId) {
        let mut conns = self.inner.connections.lock().await;
        if let Some(mut conn) = conns.remove(&id) {
            conn.close().await;
            let _ = self.inner.observer_count.send_replace(conns.len());
            tracing::info!(connection = %id, "observer disconnected");
        }
    }

    /// Returns the number of currently enrolled observers.
    pub async fn connection_count(&self) -> usize {
        self.inner.connections.lock().await.len()
    }
}

/// Single fan-out worker: drains the queue in FIFO order and broadcasts
/// each frame to every enrolled observer.
async fn fanout_loop(
    inner: Arc<HubInner>,
    mut queue_rx: mpsc::Receiver<String>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut observers = inner.observer_count.subscribe();
    loop {
        // Hold off dequeuing until someone is listening, so a queued
        // backlog survives an empty observer set.
        tokio::select! {
            res = observers.wait_for(|count| *count > 0) => {
                if res.is_err() {
                    break;
                }
            }
            _ = shutdown.changed() => break,
        }

        let frame = tokio::select! {
            msg = queue_rx.recv() => match msg {
                Some(frame) => frame,
                None => break,
            },
            _ = shutdown.changed() => break,
        };

        inner.broadcast(&frame).await;
    }
    tracing::debug!("fan-out worker stopped");
}

impl HubInner {
    /// Writes one frame to every enrolled connection, evicting any
    /// connection whose write fails. Other connections in the same pass
    /// are unaffected.
    async fn broadcast(&self, frame: &str) {
        let mut conns = self.connections.lock().await;
        let mut failed = Vec::new();
        for (id, conn) in conns.iter_mut() {
            if let Err(err) = conn.send_text(frame).await {
                tracing::warn!(connection = %id, %err, "dropping observer after write failure");
                failed.push(*id);
            }
        }
        for id in failed {
            if let Some(mut conn) = conns.remove(&id) {
                conn.close().await;
            }
        }
        let _ = self.observer_count.send_replace(conns.len());
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::time::timeout;

    use super::*;
    use crate::domain::ListenerInfo;

    const RECV_TIMEOUT: Duration = Duration::from_secs(5);

    /// Snapshot source returning a fixed set of infos.
    struct FixedSnapshots(Vec<ListenerInfo>);

    #[async_trait]
    impl SnapshotSource for FixedSnapshots {
        async fn snapshot(&self) -> Vec<ListenerInfo> {
            self.0.clone()
        }
    }

    /// In-memory observer connection capturing every frame.
    struct MockConn {
        tx: mpsc::UnboundedSender<String>,
        broken: Arc<AtomicBool>,
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl ObserverConnection for MockConn {
        async fn send_text(&mut self, frame: &str) -> Result<(), GatewayError> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(GatewayError::Delivery("transport broken".to_string()));
            }
            self.tx
                .send(frame.to_string())
                .map_err(|_| GatewayError::Delivery("receiver gone".to_string()))
        }

        async fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    struct MockHandle {
        rx: UnboundedReceiver<String>,
        broken: Arc<AtomicBool>,
        closed: Arc<AtomicBool>,
    }

    impl MockHandle {
        async fn recv(&mut self) -> String {
            match timeout(RECV_TIMEOUT, self.rx.recv()).await {
                Ok(Some(frame)) => frame,
                Ok(None) => panic!("mock connection sender dropped"),
                Err(_) => panic!("timed out waiting for frame"),
            }
        }
    }

    fn mock_conn() -> (Box<dyn ObserverConnection>, MockHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let broken = Arc::new(AtomicBool::new(false));
        let closed = Arc::new(AtomicBool::new(false));
        let conn = MockConn {
            tx,
            broken: Arc::clone(&broken),
            closed: Arc::clone(&closed),
        };
        (Box::new(conn), MockHandle { rx, broken, closed })
    }

    fn make_hub(capacity: usize) -> (NotificationHub, watch::Sender<bool>) {
        make_hub_with_snapshots(capacity, Vec::new())
    }

    fn make_hub_with_snapshots(
        capacity: usize,
        infos: Vec<ListenerInfo>,
    ) -> (NotificationHub, watch::Sender<bool>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let hub = NotificationHub::start(capacity, Arc::new(FixedSnapshots(infos)), shutdown_rx);
        (hub, shutdown_tx)
    }

    fn make_info(serial: u64) -> ListenerInfo {
        ListenerInfo {
            id: crate::domain::ListenerId::from_serial(serial),
            port: "7777".to_string(),
            created_at: chrono::Utc::now(),
            status: Some(crate::domain::ListenerStatus::Starting),
        }
    }

    #[tokio::test]
    async fn accept_sends_greeting_then_snapshot() {
        let (hub, _shutdown) = make_hub_with_snapshots(10, vec![make_info(1), make_info(2)]);
        let (conn, mut handle) = mock_conn();

        assert!(hub.accept(conn).await.is_ok());

        assert_eq!(handle.recv().await, GREETING);
        let frame = handle.recv().await;
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&frame) else {
            panic!("snapshot frame is not valid JSON");
        };
        assert_eq!(
            value.get("type").and_then(|t| t.as_str()),
            Some("listener_status")
        );
        let payload = value.get("payload").and_then(|p| p.as_array());
        assert_eq!(payload.map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn publish_reaches_all_enrolled_observers() {
        let (hub, _shutdown) = make_hub(10);
        let (conn_a, mut handle_a) = mock_conn();
        let (conn_b, mut handle_b) = mock_conn();
        assert!(hub.accept(conn_a).await.is_ok());
        assert!(hub.accept(conn_b).await.is_ok());

        // Drain greeting + snapshot on both.
        for handle in [&mut handle_a, &mut handle_b] {
            handle.recv().await;
            handle.recv().await;
        }

        hub.publish("event-x".to_string()).await;

        assert_eq!(handle_a.recv().await, "event-x");
        assert_eq!(handle_b.recv().await, "event-x");
    }

    #[tokio::test]
    async fn broadcast_preserves_publish_order() {
        let (hub, _shutdown) = make_hub(10);
        let (conn, mut handle) = mock_conn();
        assert!(hub.accept(conn).await.is_ok());
        handle.recv().await;
        handle.recv().await;

        hub.publish("first".to_string()).await;
        hub.publish("second".to_string()).await;
        hub.publish("third".to_string()).await;

        assert_eq!(handle.recv().await, "first");
        assert_eq!(handle.recv().await, "second");
        assert_eq!(handle.recv().await, "third");
    }

    #[tokio::test]
    async fn broken_observer_is_evicted_without_affecting_others() {
        let (hub, _shutdown) = make_hub(10);
        let (conn_ok, mut handle_ok) = mock_conn();
        let (conn_bad, mut handle_bad) = mock_conn();
        assert!(hub.accept(conn_ok).await.is_ok());
        assert!(hub.accept(conn_bad).await.is_ok());
        for handle in [&mut handle_ok, &mut handle_bad] {
            handle.recv().await;
            handle.recv().await;
        }

        handle_bad.broken.store(true, Ordering::SeqCst);
        hub.publish("event-x".to_string()).await;

        assert_eq!(handle_ok.recv().await, "event-x");

        // Evicted and closed; the healthy observer still counts.
        let mut remaining = hub.connection_count().await;
        for _ in 0..50 {
            if remaining == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            remaining = hub.connection_count().await;
        }
        assert_eq!(remaining, 1);
        assert!(handle_bad.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn events_published_without_observers_stay_queued() {
        let (hub, _shutdown) = make_hub(10);
        hub.publish("queued-1".to_string()).await;
        hub.publish("queued-2".to_string()).await;

        let (conn, mut handle) = mock_conn();
        assert!(hub.accept(conn).await.is_ok());

        assert_eq!(handle.recv().await, GREETING);
        // Snapshot precedes the backlog.
        let frame = handle.recv().await;
        assert!(frame.contains("listener_status"));
        assert_eq!(handle.recv().await, "queued-1");
        assert_eq!(handle.recv().await, "queued-2");
    }

    #[tokio::test]
    async fn publish_blocks_at_capacity_until_drained() {
        let (hub, _shutdown) = make_hub(2);
        hub.publish("a".to_string()).await;
        hub.publish("b".to_string()).await;

        // Queue full, no observers: the next publish must block.
        let blocked = {
            let hub = hub.clone();
            timeout(Duration::from_millis(200), async move {
                hub.publish("c".to_string()).await;
            })
            .await
        };
        assert!(blocked.is_err(), "publish should block on a full queue");

        // Enrolling an observer lets the worker drain and unblocks
        // subsequent publishers.
        let (conn, mut handle) = mock_conn();
        assert!(hub.accept(conn).await.is_ok());
        handle.recv().await;
        handle.recv().await;
        assert_eq!(handle.recv().await, "a");
        assert_eq!(handle.recv().await, "b");

        let unblocked = timeout(Duration::from_secs(1), hub.publish("d".to_string())).await;
        assert!(unblocked.is_ok());
        assert_eq!(handle.recv().await, "d");
    }

    #[tokio::test]
    async fn disconnect_removes_and_closes() {
        let (hub, _shutdown) = make_hub(10);
        let (conn, mut handle) = mock_conn();
        let Ok(id) = hub.accept(conn).await else {
            panic!("accept failed");
        };
        handle.recv().await;
        handle.recv().await;

        hub.disconnect(id).await;
        assert_eq!(hub.connection_count().await, 0);
        assert!(handle.closed.load(Ordering::SeqCst));

        // Disconnecting again is a no-op.
        hub.disconnect(id).await;
    }

    #[tokio::test]
    async fn failed_handshake_never_enrolls() {
        let (hub, _shutdown) = make_hub(10);
        let (conn, handle) = mock_conn();
        handle.broken.store(true, Ordering::SeqCst);

        assert!(hub.accept(conn).await.is_err());
        assert_eq!(hub.connection_count().await, 0);
        assert!(handle.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn send_to_evicts_on_write_failure() {
        let (hub, _shutdown) = make_hub(10);
        let (conn, mut handle) = mock_conn();
        let Ok(id) = hub.accept(conn).await else {
            panic!("accept failed");
        };
        handle.recv().await;
        handle.recv().await;

        hub.send_to(id, "echo").await;
        assert_eq!(handle.recv().await, "echo");

        handle.broken.store(true, Ordering::SeqCst);
        hub.send_to(id, "echo-2").await;
        assert_eq!(hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn shutdown_stops_the_worker() {
        let (hub, shutdown) = make_hub(10);
        let (conn, mut handle) = mock_conn();
        assert!(hub.accept(conn).await.is_ok());
        handle.recv().await;
        handle.recv().await;

        let _ = shutdown.send(true);
        tokio::time::sleep(Duration::from_millis(50)).await;

        hub.publish("after-shutdown".to_string()).await;
        let silent = timeout(Duration::from_millis(200), handle.rx.recv()).await;
        assert!(silent.is_err(), "no delivery after shutdown");
    }
}
