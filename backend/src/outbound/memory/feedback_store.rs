//! In-memory `FeedbackRepository` with one exclusive section per item.
//!
//! The outer map lock is held only long enough to look up, insert, or remove
//! a slot. Each slot carries its own mutex, so mutations of different items
//! run concurrently while mutations of one item serialize. Deleting an item
//! empties its slot before unlinking it; a toggle that fetched the slot
//! before the unlink finds it empty and reports `NotFound`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::ports::{FeedbackRepository, FeedbackRepositoryError};
use crate::domain::{Feedback, FeedbackDraft, FeedbackId, FeedbackStatus, LikeToggle, UserId};

type Slot = Arc<Mutex<Option<Feedback>>>;

fn lock_slot(slot: &Slot) -> MutexGuard<'_, Option<Feedback>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-local feedback store.
#[derive(Debug, Default)]
pub struct InMemoryFeedbackRepository {
    slots: RwLock<BTreeMap<FeedbackId, Slot>>,
    last_id: AtomicU64,
}

impl InMemoryFeedbackRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: FeedbackId) -> Option<Slot> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    fn snapshot(&self) -> Vec<Slot> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Run `apply` on the live item under its slot lock.
    fn with_item<T>(
        &self,
        id: FeedbackId,
        apply: impl FnOnce(&mut Feedback) -> T,
    ) -> Result<T, FeedbackRepositoryError> {
        let slot = self
            .slot(id)
            .ok_or_else(|| FeedbackRepositoryError::not_found(id))?;
        let mut guard = lock_slot(&slot);
        let item = guard
            .as_mut()
            .ok_or_else(|| FeedbackRepositoryError::not_found(id))?;
        Ok(apply(item))
    }

    fn collect(&self, keep: impl Fn(&Feedback) -> bool) -> Vec<Feedback> {
        self.snapshot()
            .iter()
            .filter_map(|slot| lock_slot(slot).as_ref().filter(|item| keep(item)).cloned())
            .collect()
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn create(&self, draft: FeedbackDraft) -> Result<Feedback, FeedbackRepositoryError> {
        let raw = self
            .last_id
            .fetch_add(1, Ordering::SeqCst)
            .checked_add(1)
            .ok_or_else(|| FeedbackRepositoryError::query("feedback id space exhausted"))?;
        let id = FeedbackId::new(raw).map_err(|err| FeedbackRepositoryError::query(err.to_string()))?;

        let feedback = Feedback::from_draft(id, draft);
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(Mutex::new(Some(feedback.clone()))));
        Ok(feedback)
    }

    async fn delete(&self, id: FeedbackId) -> Result<(), FeedbackRepositoryError> {
        let slot = self
            .slot(id)
            .ok_or_else(|| FeedbackRepositoryError::not_found(id))?;
        {
            let mut guard = lock_slot(&slot);
            if guard.take().is_none() {
                return Err(FeedbackRepositoryError::not_found(id));
            }
        }

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        if slots.get(&id).is_some_and(|current| Arc::ptr_eq(current, &slot)) {
            slots.remove(&id);
        }
        Ok(())
    }

    async fn set_status(
        &self,
        id: FeedbackId,
        status: FeedbackStatus,
    ) -> Result<Feedback, FeedbackRepositoryError> {
        self.with_item(id, |item| {
            item.set_status(status);
            item.clone()
        })
    }

    async fn toggle_like(
        &self,
        id: FeedbackId,
        user_id: &UserId,
    ) -> Result<LikeToggle, FeedbackRepositoryError> {
        self.with_item(id, |item| item.toggle_like(user_id))
    }

    async fn get(&self, id: FeedbackId) -> Result<Option<Feedback>, FeedbackRepositoryError> {
        Ok(self.slot(id).and_then(|slot| lock_slot(&slot).clone()))
    }

    async fn list_all(&self) -> Result<Vec<Feedback>, FeedbackRepositoryError> {
        Ok(self.collect(|_| true))
    }

    async fn list_by_status(
        &self,
        status: FeedbackStatus,
    ) -> Result<Vec<Feedback>, FeedbackRepositoryError> {
        Ok(self.collect(|item| item.status() == status))
    }
}
