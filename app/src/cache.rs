use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

/// Shared string-keyed map behind a single mutex. Lookups, inserts and
/// deletes are atomic with respect to each other; `get_or_insert` is the
/// primitive that lets concurrent creates for one key converge on a single
/// value.
pub struct Cache<T> {
    data: Arc<Mutex<HashMap<String, T>>>,
}

impl<T> Clone for Cache<T> {
    fn clone(&self) -> Self {
        Cache {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T> Cache<T> {
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn guard(&self) -> MutexGuard<'_, HashMap<String, T>> {
        self.data.lock().unwrap()
    }

    pub fn contains_key(&self, id: &str) -> bool {
        self.guard().contains_key(id)
    }

    pub fn delete_data(&self, id: &str) -> Option<T> {
        self.guard().remove(id)
    }

    pub fn count(&self) -> usize {
        self.guard().len()
    }
}

impl<T: Clone> Cache<T> {
    pub fn get_data(&self, id: &str) -> Option<T> {
        self.guard().get(id).cloned()
    }

    pub fn get_or_insert<F>(&self, id: &str, with: F) -> T
    where
        F: FnOnce() -> T,
    {
        self.guard().entry(id.to_owned()).or_insert_with(with).clone()
    }
}

impl<T> Default for Cache<T> {
    fn default() -> Self {
        Self::new()
    }
}
