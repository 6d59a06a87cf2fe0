//! List controller: owns the visible collection and reconciles it with the
//! item store after every user action.
//!
//! Every action follows the same shape: compute the intended item under the
//! state lock, mark its id in flight, release the lock for the store call,
//! then re-lock and either commit the mutation to the current collection or
//! record the failure. A failed action never touches the collection.
//!
//! In-flight marks live behind a plain mutex and are released by a guard,
//! so an action future that is dropped mid-call frees its item.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard, PoisonError},
};

use shared::domain::{Item, ItemId};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{error::StoreError, store::ItemStore, view::ListView};

/// Last completed user action, for notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    Add,
    Remove,
    Edit,
    Complete,
    Incomplete,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Add,
    Remove,
    Edit,
    Toggle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feedback {
    pub last_action: Option<ListAction>,
    pub last_target: Option<Item>,
    pub error_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub id: ItemId,
    pub draft: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Saved,
    Unchanged,
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("no item with id {0}")]
    UnknownItem(ItemId),
    #[error("item {0} already has an action in flight")]
    Busy(ItemId),
    #[error("no edit in progress")]
    NotEditing,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Default)]
struct ListState {
    items: Vec<Item>,
    feedback: Feedback,
    edit: Option<EditSession>,
}

#[derive(Default)]
struct InFlight {
    items: HashMap<ItemId, PendingAction>,
    list: bool,
}

impl InFlight {
    fn any(&self) -> bool {
        self.list || !self.items.is_empty()
    }
}

fn lock_in_flight(in_flight: &StdMutex<InFlight>) -> StdMutexGuard<'_, InFlight> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears one in-flight mark when dropped. `None` is the list load.
struct InFlightGuard<'a> {
    in_flight: &'a StdMutex<InFlight>,
    id: Option<ItemId>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = lock_in_flight(self.in_flight);
        match &self.id {
            Some(id) => {
                in_flight.items.remove(id);
            }
            None => in_flight.list = false,
        }
    }
}

impl ListState {
    fn find(&self, id: &ItemId) -> Result<Item, ControllerError> {
        self.items
            .iter()
            .find(|item| item.uid == *id)
            .cloned()
            .ok_or_else(|| ControllerError::UnknownItem(id.clone()))
    }

    /// Replaces the item with the same id in the current collection.
    fn replace(&mut self, updated: &Item) {
        if let Some(slot) = self.items.iter_mut().find(|item| item.uid == updated.uid) {
            *slot = updated.clone();
        }
    }

    fn settle(&mut self, action: ListAction, target: Item) {
        self.feedback = Feedback {
            last_action: Some(action),
            last_target: Some(target),
            error_reason: None,
        };
    }

    fn fail(&mut self, err: &StoreError) {
        self.feedback = Feedback {
            last_action: Some(ListAction::Error),
            last_target: None,
            error_reason: Some(err.reason()),
        };
    }

    fn leave_edit(&mut self, id: &ItemId) {
        if self.edit.as_ref().is_some_and(|session| session.id == *id) {
            self.edit = None;
        }
    }
}

fn normalize_description(description: &str) -> Result<&str, ControllerError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(ControllerError::EmptyDescription);
    }
    Ok(trimmed)
}

pub struct ListController<S: ItemStore + ?Sized> {
    store: Arc<S>,
    state: Mutex<ListState>,
    in_flight: StdMutex<InFlight>,
}

impl<S: ItemStore + ?Sized> ListController<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_items(store, Vec::new())
    }

    /// Starts from an already fetched collection.
    pub fn with_items(store: Arc<S>, items: Vec<Item>) -> Self {
        Self {
            store,
            state: Mutex::new(ListState {
                items,
                ..ListState::default()
            }),
            in_flight: StdMutex::default(),
        }
    }

    /// Marks `target` in flight for `action` and records it as the last
    /// target. Refused while another action on the same id is outstanding.
    fn claim(
        &self,
        state: &mut ListState,
        target: &Item,
        action: PendingAction,
    ) -> Result<InFlightGuard<'_>, ControllerError> {
        let mut in_flight = lock_in_flight(&self.in_flight);
        if in_flight.items.contains_key(&target.uid) {
            return Err(ControllerError::Busy(target.uid.clone()));
        }
        in_flight.items.insert(target.uid.clone(), action);
        state.feedback.last_target = Some(target.clone());
        Ok(InFlightGuard {
            in_flight: &self.in_flight,
            id: Some(target.uid.clone()),
        })
    }

    /// Fetches the full list once, at session start.
    pub async fn load(&self) -> Result<Vec<Item>, ControllerError> {
        lock_in_flight(&self.in_flight).list = true;
        let guard = InFlightGuard {
            in_flight: &self.in_flight,
            id: None,
        };

        let outcome = self.store.list().await;
        drop(guard);

        let mut state = self.state.lock().await;
        match outcome {
            Ok(items) => {
                info!(count = items.len(), "todo: list loaded");
                state.items = items.clone();
                Ok(items)
            }
            Err(err) => {
                warn!(error = %err, "todo: list load failed");
                state.fail(&err);
                Err(err.into())
            }
        }
    }

    pub async fn add(&self, description: &str) -> Result<Item, ControllerError> {
        let candidate = Item::draft(normalize_description(description)?);
        let _guard = {
            let mut state = self.state.lock().await;
            self.claim(&mut state, &candidate, PendingAction::Add)?
        };
        debug!(uid = %candidate.uid, "todo: adding item");

        let outcome = self.store.add(&candidate).await;

        let mut state = self.state.lock().await;
        match outcome {
            Ok(stored) => {
                if stored != candidate {
                    debug!(
                        uid = %candidate.uid,
                        stored_uid = %stored.uid,
                        "todo: store echoed a different item"
                    );
                }
                state.items.insert(0, candidate.clone());
                state.settle(ListAction::Add, candidate.clone());
                info!(uid = %candidate.uid, "todo: item added");
                Ok(candidate)
            }
            Err(err) => {
                warn!(uid = %candidate.uid, error = %err, "todo: add failed");
                state.fail(&err);
                Err(err.into())
            }
        }
    }

    pub async fn remove(&self, id: &ItemId) -> Result<(), ControllerError> {
        let (target, _guard) = {
            let mut state = self.state.lock().await;
            let target = state.find(id)?;
            let guard = self.claim(&mut state, &target, PendingAction::Remove)?;
            (target, guard)
        };

        let outcome = self.store.remove(id).await;

        let mut state = self.state.lock().await;
        match outcome {
            Ok(()) => {
                state.items.retain(|item| item.uid != *id);
                state.leave_edit(id);
                state.settle(ListAction::Remove, target);
                info!(uid = %id, "todo: item removed");
                Ok(())
            }
            Err(err) => {
                warn!(uid = %id, error = %err, "todo: remove failed");
                state.fail(&err);
                Err(err.into())
            }
        }
    }

    pub async fn start_edit(&self, id: &ItemId) -> Result<EditSession, ControllerError> {
        let mut state = self.state.lock().await;
        let item = state.find(id)?;
        let session = EditSession {
            id: item.uid,
            draft: item.desc,
        };
        state.edit = Some(session.clone());
        Ok(session)
    }

    pub async fn set_edit_draft(&self, draft: impl Into<String>) -> Result<(), ControllerError> {
        let mut state = self.state.lock().await;
        let session = state.edit.as_mut().ok_or(ControllerError::NotEditing)?;
        session.draft = draft.into();
        Ok(())
    }

    pub async fn cancel_edit(&self) {
        self.state.lock().await.edit = None;
    }

    /// Commits the open edit session's draft.
    pub async fn save_edit(&self) -> Result<EditOutcome, ControllerError> {
        let session = self
            .state
            .lock()
            .await
            .edit
            .clone()
            .ok_or(ControllerError::NotEditing)?;
        self.commit_edit(&session.id, &session.draft).await
    }

    /// Sends the new description unless it equals the current one. Leaves
    /// edit mode for this item once the outcome is known.
    pub async fn commit_edit(
        &self,
        id: &ItemId,
        new_description: &str,
    ) -> Result<EditOutcome, ControllerError> {
        let (candidate, _guard) = {
            let mut state = self.state.lock().await;
            let current = state.find(id)?;
            let desc = normalize_description(new_description)?;
            if current.desc.trim() == desc {
                state.leave_edit(id);
                return Ok(EditOutcome::Unchanged);
            }
            let candidate = current.with_desc(desc);
            let guard = self.claim(&mut state, &candidate, PendingAction::Edit)?;
            (candidate, guard)
        };

        let outcome = self.store.update(&candidate).await;

        let mut state = self.state.lock().await;
        state.leave_edit(id);
        match outcome {
            Ok(()) => {
                if let Some(slot) = state.items.iter_mut().find(|item| item.uid == *id) {
                    slot.desc = candidate.desc.clone();
                }
                state.settle(ListAction::Edit, candidate);
                info!(uid = %id, "todo: item edited");
                Ok(EditOutcome::Saved)
            }
            Err(err) => {
                warn!(uid = %id, error = %err, "todo: edit failed");
                state.fail(&err);
                Err(err.into())
            }
        }
    }

    /// Flips `done` on an in-flight copy; the visible item changes only
    /// after the store confirms.
    pub async fn toggle_done(&self, id: &ItemId) -> Result<Item, ControllerError> {
        let (candidate, _guard) = {
            let mut state = self.state.lock().await;
            let candidate = state.find(id)?.toggled();
            let guard = self.claim(&mut state, &candidate, PendingAction::Toggle)?;
            (candidate, guard)
        };

        let outcome = self.store.update(&candidate).await;

        let mut state = self.state.lock().await;
        state.leave_edit(id);
        match outcome {
            Ok(()) => {
                state.replace(&candidate);
                let action = if candidate.done {
                    ListAction::Complete
                } else {
                    ListAction::Incomplete
                };
                state.settle(action, candidate.clone());
                info!(uid = %id, done = candidate.done, "todo: item toggled");
                Ok(candidate)
            }
            Err(err) => {
                warn!(uid = %id, error = %err, "todo: toggle failed");
                state.fail(&err);
                Err(err.into())
            }
        }
    }

    pub async fn items(&self) -> Vec<Item> {
        self.state.lock().await.items.clone()
    }

    pub async fn feedback(&self) -> Feedback {
        self.state.lock().await.feedback.clone()
    }

    pub async fn edit_session(&self) -> Option<EditSession> {
        self.state.lock().await.edit.clone()
    }

    /// Loading indicator: on while any store call is outstanding.
    pub async fn is_loading(&self) -> bool {
        lock_in_flight(&self.in_flight).any()
    }

    pub async fn is_in_flight(&self, id: &ItemId) -> bool {
        lock_in_flight(&self.in_flight).items.contains_key(id)
    }

    pub async fn pending(&self, id: &ItemId) -> Option<PendingAction> {
        lock_in_flight(&self.in_flight).items.get(id).copied()
    }

    pub async fn view(&self) -> ListView {
        let state = self.state.lock().await;
        ListView::build(
            &state.items,
            &state.feedback,
            lock_in_flight(&self.in_flight).any(),
            state.edit.clone(),
        )
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
