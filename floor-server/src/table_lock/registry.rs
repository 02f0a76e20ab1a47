use std::collections::HashMap;
use std::time::Duration;

use shared::models::{LockEvent, LockHolder, TableLock, UnlockReason};
use shared::util::now_millis;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use super::{LockError, LockResult};

const EVENT_CAPACITY: usize = 256;

enum Command {
    Acquire {
        table_id: String,
        holder: LockHolder,
        reply: oneshot::Sender<LockResult<TableLock>>,
    },
    Release {
        table_id: String,
        holder_id: String,
        reply: oneshot::Sender<LockResult<()>>,
    },
    ReleaseAll {
        holder_id: String,
        reason: UnlockReason,
        reply: oneshot::Sender<Vec<String>>,
    },
    List {
        reply: oneshot::Sender<Vec<TableLock>>,
    },
    EvictExpired {
        now: i64,
        ttl_millis: i64,
        reply: oneshot::Sender<Vec<TableLock>>,
    },
}

/// Owner of the lock map
pub struct TableLockActor {
    locks: HashMap<String, TableLock>,
    rx: mpsc::Receiver<Command>,
    events: broadcast::Sender<LockEvent>,
}

impl TableLockActor {
    /// Create the actor and a handle to it
    ///
    /// The actor does nothing until [`run`](Self::run) is polled.
    pub fn new(capacity: usize) -> (Self, TableLockRegistry) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let actor = Self {
            locks: HashMap::new(),
            rx,
            events: events.clone(),
        };
        (actor, TableLockRegistry { tx, events })
    }

    /// Process commands until cancelled or every handle is dropped
    pub async fn run(mut self, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                cmd = self.rx.recv() => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
            }
        }
        tracing::debug!(held = self.locks.len(), "Table lock actor stopped");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Acquire {
                table_id,
                holder,
                reply,
            } => {
                let _ = reply.send(self.acquire(table_id, holder, now_millis()));
            }
            Command::Release {
                table_id,
                holder_id,
                reply,
            } => {
                let _ = reply.send(self.release(&table_id, &holder_id));
            }
            Command::ReleaseAll {
                holder_id,
                reason,
                reply,
            } => {
                let _ = reply.send(self.release_all(&holder_id, reason));
            }
            Command::List { reply } => {
                let mut locks: Vec<_> = self.locks.values().cloned().collect();
                locks.sort_by(|a, b| a.table_id.cmp(&b.table_id));
                let _ = reply.send(locks);
            }
            Command::EvictExpired {
                now,
                ttl_millis,
                reply,
            } => {
                let _ = reply.send(self.evict_expired(now, ttl_millis));
            }
        }
    }

    fn acquire(&mut self, table_id: String, holder: LockHolder, now: i64) -> LockResult<TableLock> {
        if let Some(current) = self.locks.get_mut(&table_id) {
            if current.holder_id != holder.holder_id {
                return Err(LockError::Conflict {
                    current: current.clone(),
                });
            }
            current.acquired_at = now;
            if !holder.holder_name.is_empty() {
                current.holder_name = holder.holder_name;
            }
            tracing::debug!(table_id = %table_id, holder_id = %current.holder_id, "Table lock refreshed");
            return Ok(current.clone());
        }

        let lock = TableLock {
            table_id: table_id.clone(),
            holder_id: holder.holder_id,
            holder_name: holder.holder_name,
            acquired_at: now,
        };
        self.locks.insert(table_id, lock.clone());
        tracing::info!(table_id = %lock.table_id, holder_id = %lock.holder_id, "Table locked");
        self.publish(LockEvent::TableLocked { lock: lock.clone() });
        Ok(lock)
    }

    fn release(&mut self, table_id: &str, holder_id: &str) -> LockResult<()> {
        let held = self
            .locks
            .get(table_id)
            .is_some_and(|l| l.holder_id == holder_id);
        if !held {
            return Err(LockError::Denied {
                table_id: table_id.to_string(),
                holder_id: holder_id.to_string(),
                current: self.locks.get(table_id).cloned(),
            });
        }

        self.locks.remove(table_id);
        self.unlocked(table_id, holder_id, UnlockReason::Released);
        Ok(())
    }

    fn release_all(&mut self, holder_id: &str, reason: UnlockReason) -> Vec<String> {
        let mut released: Vec<String> = self
            .locks
            .values()
            .filter(|l| l.holder_id == holder_id)
            .map(|l| l.table_id.clone())
            .collect();
        released.sort();
        for table_id in &released {
            self.locks.remove(table_id);
            self.unlocked(table_id, holder_id, reason);
        }
        released
    }

    fn evict_expired(&mut self, now: i64, ttl_millis: i64) -> Vec<TableLock> {
        let expired: Vec<TableLock> = self
            .locks
            .values()
            .filter(|l| now - l.acquired_at > ttl_millis)
            .cloned()
            .collect();
        for lock in &expired {
            self.locks.remove(&lock.table_id);
            self.unlocked(&lock.table_id, &lock.holder_id, UnlockReason::TimeoutCleanup);
        }
        expired
    }

    fn unlocked(&self, table_id: &str, holder_id: &str, reason: UnlockReason) {
        tracing::info!(table_id = %table_id, holder_id = %holder_id, reason = ?reason, "Table unlocked");
        self.publish(LockEvent::TableUnlocked {
            table_id: table_id.to_string(),
            holder_id: holder_id.to_string(),
            reason,
        });
    }

    fn publish(&self, event: LockEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Cloneable handle to the lock actor
#[derive(Clone, Debug)]
pub struct TableLockRegistry {
    tx: mpsc::Sender<Command>,
    events: broadcast::Sender<LockEvent>,
}

impl TableLockRegistry {
    /// Spawn a standalone actor on the current runtime
    ///
    /// It stops when the last handle is dropped.
    pub fn spawn() -> Self {
        let (actor, registry) = TableLockActor::new(64);
        tokio::spawn(actor.run(CancellationToken::new()));
        registry
    }

    async fn call<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> LockResult<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| LockError::Closed)?;
        rx.await.map_err(|_| LockError::Closed)
    }

    /// Take or refresh the lock on a table
    ///
    /// Idempotent for the current holder; anyone else gets
    /// [`LockError::Conflict`] naming the holder.
    pub async fn acquire(&self, table_id: &str, holder: LockHolder) -> LockResult<TableLock> {
        let table_id = table_id.to_string();
        self.call(|reply| Command::Acquire {
            table_id,
            holder,
            reply,
        })
        .await?
    }

    /// Release a lock the caller holds
    pub async fn release(&self, table_id: &str, holder_id: &str) -> LockResult<()> {
        let table_id = table_id.to_string();
        let holder_id = holder_id.to_string();
        self.call(|reply| Command::Release {
            table_id,
            holder_id,
            reply,
        })
        .await?
    }

    /// Release every lock owned by a holder; returns the freed table ids
    pub async fn release_all(
        &self,
        holder_id: &str,
        reason: UnlockReason,
    ) -> LockResult<Vec<String>> {
        let holder_id = holder_id.to_string();
        self.call(|reply| Command::ReleaseAll {
            holder_id,
            reason,
            reply,
        })
        .await
    }

    pub async fn list_locked(&self) -> LockResult<Vec<TableLock>> {
        self.call(|reply| Command::List { reply }).await
    }

    /// Evict locks idle for longer than `ttl`
    pub async fn evict_expired(&self, ttl: Duration) -> LockResult<Vec<TableLock>> {
        self.evict_expired_at(now_millis(), ttl).await
    }

    /// [`evict_expired`](Self::evict_expired) against an explicit clock
    pub async fn evict_expired_at(&self, now: i64, ttl: Duration) -> LockResult<Vec<TableLock>> {
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self.call(|reply| Command::EvictExpired {
            now,
            ttl_millis,
            reply,
        })
        .await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LockEvent> {
        self.events.subscribe()
    }
}

/// Periodically evict idle locks until cancelled
pub async fn run_sweeper(
    registry: TableLockRegistry,
    ttl: Duration,
    period: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => match registry.evict_expired(ttl).await {
                Ok(evicted) if !evicted.is_empty() => {
                    tracing::info!(count = evicted.len(), "Evicted idle table locks");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Table lock sweep failed");
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder(id: &str, name: &str) -> LockHolder {
        LockHolder {
            holder_id: id.into(),
            holder_name: name.into(),
        }
    }

    #[tokio::test]
    async fn test_acquire_is_idempotent_for_holder() {
        let registry = TableLockRegistry::spawn();

        let first = registry.acquire("t-1", holder("w-1", "Aziza")).await.unwrap();
        let again = registry.acquire("t-1", holder("w-1", "Aziza")).await.unwrap();

        assert_eq!(first.holder_id, again.holder_id);
        assert!(again.acquired_at >= first.acquired_at);
        assert_eq!(registry.list_locked().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_conflict_names_current_holder() {
        let registry = TableLockRegistry::spawn();
        registry.acquire("t-1", holder("w-1", "Aziza")).await.unwrap();

        let err = registry
            .acquire("t-1", holder("w-2", "Bekzod"))
            .await
            .unwrap_err();
        match err {
            LockError::Conflict { current } => {
                assert_eq!(current.holder_id, "w-1");
                assert_eq!(current.holder_name, "Aziza");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_release_by_non_holder_is_denied() {
        let registry = TableLockRegistry::spawn();
        registry.acquire("t-1", holder("w-1", "Aziza")).await.unwrap();

        let err = registry.release("t-1", "w-2").await.unwrap_err();
        assert!(matches!(err, LockError::Denied { current: Some(_), .. }));

        let locks = registry.list_locked().await.unwrap();
        assert_eq!(locks[0].holder_id, "w-1");

        assert!(matches!(
            registry.release("t-9", "w-1").await,
            Err(LockError::Denied { current: None, .. })
        ));
        registry.release("t-1", "w-1").await.unwrap();
        assert!(registry.list_locked().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_release_all_broadcasts_disconnect() {
        let registry = TableLockRegistry::spawn();
        registry.acquire("t-1", holder("w-1", "Aziza")).await.unwrap();
        registry.acquire("t-2", holder("w-1", "Aziza")).await.unwrap();
        registry.acquire("t-3", holder("w-2", "Bekzod")).await.unwrap();

        let mut events = registry.subscribe();
        let freed = registry
            .release_all("w-1", UnlockReason::Disconnect)
            .await
            .unwrap();
        assert_eq!(freed, vec!["t-1".to_string(), "t-2".to_string()]);

        for _ in 0..2 {
            match events.recv().await.unwrap() {
                LockEvent::TableUnlocked {
                    holder_id, reason, ..
                } => {
                    assert_eq!(holder_id, "w-1");
                    assert_eq!(reason, UnlockReason::Disconnect);
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!(registry.list_locked().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_evict_expired_tags_timeout_cleanup() {
        let registry = TableLockRegistry::spawn();
        let lock = registry.acquire("t-1", holder("w-1", "Aziza")).await.unwrap();
        let mut events = registry.subscribe();

        let ttl = Duration::from_secs(1800);
        let kept = registry
            .evict_expired_at(lock.acquired_at + 1_000, ttl)
            .await
            .unwrap();
        assert!(kept.is_empty());

        let evicted = registry
            .evict_expired_at(lock.acquired_at + 1_800_001, ttl)
            .await
            .unwrap();
        assert_eq!(evicted.len(), 1);
        assert_eq!(
            events.recv().await.unwrap(),
            LockEvent::TableUnlocked {
                table_id: "t-1".into(),
                holder_id: "w-1".into(),
                reason: UnlockReason::TimeoutCleanup,
            }
        );
    }

    #[tokio::test]
    async fn test_closed_registry_reports_closed() {
        let (actor, registry) = TableLockActor::new(4);
        drop(actor);
        assert_eq!(
            registry.list_locked().await.unwrap_err(),
            LockError::Closed
        );
    }
}
