//! Storage abstraction used by the engine.
//!
//! Every aggregate the engine manages (groups, group expenses, personal
//! expenses, rules, budgets) is kept behind a [`Repository`]. The engine only
//! talks to the trait, so callers can inject their own backend; the default is
//! [`MemoryRepository`], which keeps records in insertion order.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// A record stored in a repository, identified by a UUID.
pub trait Record: Clone + Send + Sync + 'static {
    /// Human readable label used in error messages (e.g. `"group"`).
    const KIND: &'static str;

    fn id(&self) -> Uuid;
}

/// CRUD access to a collection of records.
pub trait Repository<T: Record>: Send + Sync {
    /// All records in insertion order.
    fn list(&self) -> Vec<T>;

    fn get(&self, id: Uuid) -> ResultEngine<T>;

    /// Fails with [`EngineError::ExistingKey`] when the id is already present.
    fn insert(&self, record: T) -> ResultEngine<()>;

    /// Inserts `record` unless an existing record `conflicts` with it.
    ///
    /// The check and the insert happen under one write, so two concurrent
    /// callers cannot both pass the check.
    fn insert_unless(&self, record: T, conflicts: &dyn Fn(&T) -> bool) -> ResultEngine<()>;

    /// Replaces the record with the same id.
    fn update(&self, record: T) -> ResultEngine<()>;

    /// Read-modify-write of one record under a single write.
    ///
    /// `change` edits a copy; the copy is stored only when it returns `Ok`.
    /// Returns the stored record.
    fn modify(
        &self,
        id: Uuid,
        change: &mut dyn FnMut(&mut T) -> ResultEngine<()>,
    ) -> ResultEngine<T>;

    /// Removes and returns the record.
    fn delete(&self, id: Uuid) -> ResultEngine<T>;
}

/// In-memory repository backed by a `RwLock<Vec<T>>`.
#[derive(Debug)]
pub struct MemoryRepository<T> {
    records: RwLock<Vec<T>>,
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Record> MemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the repository with existing records (e.g. fixtures).
    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    // Records are plain values, so a poisoned lock still holds consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn not_found<T: Record>(id: Uuid) -> EngineError {
    EngineError::KeyNotFound(format!("{} {id}", T::KIND))
}

impl<T: Record> Repository<T> for MemoryRepository<T> {
    fn list(&self) -> Vec<T> {
        self.read().clone()
    }

    fn get(&self, id: Uuid) -> ResultEngine<T> {
        self.read()
            .iter()
            .find(|record| record.id() == id)
            .cloned()
            .ok_or_else(|| not_found::<T>(id))
    }

    fn insert(&self, record: T) -> ResultEngine<()> {
        let mut records = self.write();
        if records.iter().any(|existing| existing.id() == record.id()) {
            return Err(EngineError::ExistingKey(format!(
                "{} {}",
                T::KIND,
                record.id()
            )));
        }
        records.push(record);
        Ok(())
    }

    fn insert_unless(&self, record: T, conflicts: &dyn Fn(&T) -> bool) -> ResultEngine<()> {
        let mut records = self.write();
        if let Some(existing) = records
            .iter()
            .find(|existing| existing.id() == record.id() || conflicts(existing))
        {
            return Err(EngineError::ExistingKey(format!(
                "{} {}",
                T::KIND,
                existing.id()
            )));
        }
        records.push(record);
        Ok(())
    }

    fn modify(
        &self,
        id: Uuid,
        change: &mut dyn FnMut(&mut T) -> ResultEngine<()>,
    ) -> ResultEngine<T> {
        let mut records = self.write();
        let slot = records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| not_found::<T>(id))?;
        let mut draft = slot.clone();
        change(&mut draft)?;
        *slot = draft.clone();
        Ok(draft)
    }

    fn update(&self, record: T) -> ResultEngine<()> {
        let mut records = self.write();
        let slot = records
            .iter_mut()
            .find(|existing| existing.id() == record.id())
            .ok_or_else(|| not_found::<T>(record.id()))?;
        *slot = record;
        Ok(())
    }

    fn delete(&self, id: Uuid) -> ResultEngine<T> {
        let mut records = self.write();
        let index = records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| not_found::<T>(id))?;
        Ok(records.remove(index))
    }
}
