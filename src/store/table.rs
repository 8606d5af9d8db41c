//! Table<T> — one normalized entity table.
//!
//! A table is an id-keyed map of records plus an explicit ordered id list.
//! Iteration order is insertion order, independent of map key order.
//!
//! # Copy-on-write contract
//!
//! Both halves live behind `Arc`s. Any operation that changes content builds
//! a fresh map/list and returns a table holding new `Arc`s and a fresh
//! generation number; an operation with no effective change returns a table
//! sharing the exact prior `Arc`s and generation. The derived-view engine
//! memoizes on generations, so this contract is load-bearing: a table that
//! rebuilt its map without changing content would cause spurious
//! recomputation, and a table that mutated in place would serve stale views.
//!
//! Records themselves are `Arc<T>`, so an upsert of one record leaves every
//! other record's reference untouched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::model::{Entity, EntityId};

/// Opaque identity of a table's current contents, used by the view engine as
/// a memo key.
///
/// Two equal keys guarantee the table contents are identical; unequal keys
/// mean the table may have changed. Keys are drawn from a process-wide
/// monotonic counter, never from memory addresses, so a key is never reused
/// by a later rebuild — a dropped table cannot alias a live one.
pub type TableKey = u64;

// Generation 0 is reserved for empty default tables.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> TableKey {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// An id-keyed collection of same-type entities plus an ordered id list.
#[derive(Debug)]
pub struct Table<T> {
    entities: Arc<HashMap<EntityId, Arc<T>>>,
    ids: Arc<Vec<EntityId>>,
    generation: TableKey,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            entities: Arc::clone(&self.entities),
            ids: Arc::clone(&self.ids),
            generation: self.generation,
        }
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            entities: Arc::new(HashMap::new()),
            ids: Arc::new(Vec::new()),
            generation: 0,
        }
    }
}

impl<T: Entity> Table<T> {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// Look up one record by id.
    pub fn get(&self, id: &str) -> Option<&Arc<T>> {
        self.entities.get(id)
    }

    /// The ordered id list (insertion order).
    pub fn ids(&self) -> &Arc<Vec<EntityId>> {
        &self.ids
    }

    /// All records in insertion order.
    pub fn all(&self) -> Vec<Arc<T>> {
        self.ids
            .iter()
            .filter_map(|id| self.entities.get(id))
            .cloned()
            .collect()
    }

    /// The generation of the current contents.
    pub fn key(&self) -> TableKey {
        self.generation
    }

    /// True if `other` shares both underlying references with `self`.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entities, &other.entities) && Arc::ptr_eq(&self.ids, &other.ids)
    }

    // -----------------------------------------------------------------------
    // Writes (copy-on-write)
    // -----------------------------------------------------------------------

    /// Insert or replace one record.
    ///
    /// A known id is overwritten in place and keeps its list position; a new
    /// id is appended to the list.
    pub fn upsert_one(&self, entity: T) -> Self {
        self.upsert_many(vec![entity])
    }

    /// Insert or replace a batch of records in one step.
    ///
    /// Entities are partitioned into "new" (id absent) and "already present":
    /// new ids are appended to the ordered list in batch order, and all
    /// entities are written to the map. An empty batch is a no-op and returns
    /// the shared prior references.
    pub fn upsert_many(&self, entities: Vec<T>) -> Self {
        if entities.is_empty() {
            return self.clone();
        }

        let mut map = (*self.entities).clone();
        let mut ids = (*self.ids).clone();
        for entity in entities {
            let id = entity.id().clone();
            if map.insert(id.clone(), Arc::new(entity)).is_none() {
                ids.push(id);
            }
        }

        Self {
            entities: Arc::new(map),
            ids: Arc::new(ids),
            generation: next_generation(),
        }
    }

    /// Remove one record. Removing an absent id is a no-op.
    pub fn remove_one(&self, id: &str) -> Self {
        if !self.contains(id) {
            return self.clone();
        }

        let mut map = (*self.entities).clone();
        map.remove(id);
        let ids = self.ids.iter().filter(|i| *i != id).cloned().collect();

        Self {
            entities: Arc::new(map),
            ids: Arc::new(ids),
            generation: next_generation(),
        }
    }

    /// Remove a batch of records. Absent ids are ignored; if none of the ids
    /// are present the shared prior references are returned.
    pub fn remove_many(&self, ids: &[EntityId]) -> Self {
        if !ids.iter().any(|id| self.contains(id)) {
            return self.clone();
        }

        let mut map = (*self.entities).clone();
        for id in ids {
            map.remove(id);
        }
        let kept = self
            .ids
            .iter()
            .filter(|id| map.contains_key(*id))
            .cloned()
            .collect();

        Self {
            entities: Arc::new(map),
            ids: Arc::new(kept),
            generation: next_generation(),
        }
    }

    /// Selectively replace records.
    ///
    /// `patch` is called once per record in insertion order; returning
    /// `Some(replacement)` swaps that record, `None` keeps it. The id list is
    /// always shared, untouched records keep their `Arc`s, and if nothing is
    /// replaced the map reference is shared too.
    pub fn patch(&self, mut patch: impl FnMut(&Arc<T>) -> Option<T>) -> Self {
        let mut map: Option<HashMap<EntityId, Arc<T>>> = None;
        for id in self.ids.iter() {
            let Some(current) = self.entities.get(id) else {
                continue;
            };
            if let Some(replacement) = patch(current) {
                map.get_or_insert_with(|| (*self.entities).clone())
                    .insert(id.clone(), Arc::new(replacement));
            }
        }

        match map {
            Some(map) => Self {
                entities: Arc::new(map),
                ids: Arc::clone(&self.ids),
                generation: next_generation(),
            },
            None => self.clone(),
        }
    }
}
