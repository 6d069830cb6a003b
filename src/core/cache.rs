use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Shared async map. Clones share the same entries.
#[derive(Clone)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    entries: Arc<Mutex<HashMap<K, V>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the value for `key`, inserting `init()` first if absent.
    /// Lookup and insert happen under one lock.
    pub async fn get_or_insert_with(&self, key: K, init: impl FnOnce() -> V) -> V {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        let value = entries.entry(key).or_insert_with(init).clone();
        if entries.len() > before {
            debug!("Cache INSERT ({} entries)", entries.len());
        }
        value
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
