//! Sharded per-pid lock table.
//!
//! Mutations to one record must serialize; mutations to distinct records
//! should not contend. A fixed array of async mutexes indexed by the pid's
//! hash gives that with bounded memory: collisions across distinct pids
//! only cost extra serialization, never correctness.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tokio::sync::{Mutex, MutexGuard};

pub struct LockTable {
    shards: Box<[Mutex<()>]>,
}

impl LockTable {
    pub fn new(shards: usize) -> Self {
        let shards = shards.max(1);
        LockTable {
            shards: (0..shards).map(|_| Mutex::new(())).collect(),
        }
    }

    fn shard_index(&self, pid: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        pid.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

    /// Acquire the exclusive section for one pid.
    pub async fn acquire(&self, pid: &str) -> MutexGuard<'_, ()> {
        self.shards[self.shard_index(pid)].lock().await
    }

    /// Acquire the exclusive sections for two pids (rename old/new).
    /// Shards are locked in index order so two crossing renames cannot
    /// deadlock; when both pids land on the same shard only one guard is
    /// taken.
    pub async fn acquire_pair(
        &self,
        a: &str,
        b: &str,
    ) -> (MutexGuard<'_, ()>, Option<MutexGuard<'_, ()>>) {
        let (i, j) = (self.shard_index(a), self.shard_index(b));
        if i == j {
            (self.shards[i].lock().await, None)
        } else {
            let (lo, hi) = (i.min(j), i.max(j));
            let first = self.shards[lo].lock().await;
            let second = self.shards[hi].lock().await;
            (first, Some(second))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_same_pid_serializes() {
        let table = Arc::new(LockTable::new(8));
        let counter = Arc::new(tokio::sync::Mutex::new(0u32));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let table = table.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let _guard = table.acquire("p1").await;
                let mut c = counter.lock().await;
                *c += 1;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(*counter.lock().await, 16);
    }

    #[tokio::test]
    async fn test_crossing_pairs_do_not_deadlock() {
        let table = Arc::new(LockTable::new(2));

        let mut handles = Vec::new();
        for i in 0..32 {
            let table = table.clone();
            handles.push(tokio::spawn(async move {
                let (a, b) = if i % 2 == 0 { ("p1", "p2") } else { ("p2", "p1") };
                let _guards = table.acquire_pair(a, b).await;
            }));
        }
        for handle in handles {
            tokio::time::timeout(std::time::Duration::from_secs(5), handle)
                .await
                .expect("pair locking deadlocked")
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_same_shard_pair_takes_single_guard() {
        let table = LockTable::new(1);
        let (_first, second) = table.acquire_pair("a", "b").await;
        assert!(second.is_none());
    }
}
