//! In-memory entity registry
//!
//! Process-lifetime storage for clips and reels. A single reader/writer
//! lock guards the map so concurrent requests never observe a torn entry.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::domain::errors::*;
use crate::domain::model::Identified;
use crate::ports::Repository;

/// HashMap-backed registry keyed by entity id
pub struct InMemoryRegistry<T> {
    entries: RwLock<HashMap<String, T>>,
}

impl<T> InMemoryRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<T> Default for InMemoryRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Repository<T> for InMemoryRegistry<T>
where
    T: Identified + Clone + Send + Sync,
{
    fn insert(&self, entity: T) {
        self.entries.write().insert(entity.id().to_string(), entity);
    }

    fn get(&self, id: &str) -> Result<T, DomainError> {
        self.entries
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found::<T>(id))
    }

    fn remove(&self, id: &str) -> Result<T, DomainError> {
        self.entries
            .write()
            .remove(id)
            .ok_or_else(|| not_found::<T>(id))
    }

    fn list(&self) -> Vec<T> {
        self.entries.read().values().cloned().collect()
    }

    fn contains(&self, id: &str) -> bool {
        self.entries.read().contains_key(id)
    }
}

fn not_found<T: Identified>(id: &str) -> DomainError {
    DomainError::NotFound {
        kind: T::KIND,
        id: id.to_string(),
    }
}
