// src/deletion.rs
//! Two-step confirm/cancel gate in front of destructive removal.
//!
//! `None -> PendingConfirm(t) -> ConfirmedDeleting(t) -> None`, or
//! `PendingConfirm(t) -> (cancel) -> None`. The delete itself may only run while the
//! state is `ConfirmedDeleting`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionState<T> {
    None,
    PendingConfirm(T),
    ConfirmedDeleting(T),
}

#[derive(Debug, Clone)]
pub struct DeletionConfirmation<T> {
    state: DeletionState<T>,
}

impl<T: Clone + PartialEq> Default for DeletionConfirmation<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq> DeletionConfirmation<T> {
    pub fn new() -> Self {
        Self {
            state: DeletionState::None,
        }
    }

    pub fn state(&self) -> &DeletionState<T> {
        &self.state
    }

    /// Ask for confirmation. Replaces any pending target (no queueing) and returns it.
    pub fn request(&mut self, target: T) -> Option<T> {
        match std::mem::replace(&mut self.state, DeletionState::PendingConfirm(target)) {
            DeletionState::PendingConfirm(prev) => Some(prev),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&T> {
        match &self.state {
            DeletionState::PendingConfirm(t) => Some(t),
            _ => None,
        }
    }

    /// Move the pending target to `ConfirmedDeleting` and hand it to the caller.
    pub fn confirm(&mut self) -> Option<T> {
        match std::mem::replace(&mut self.state, DeletionState::None) {
            DeletionState::PendingConfirm(t) => {
                self.state = DeletionState::ConfirmedDeleting(t.clone());
                Some(t)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// The confirmed delete for `target` settled (success or failure).
    /// A newer request made meanwhile is left alone.
    pub fn finish(&mut self, target: &T) {
        if matches!(&self.state, DeletionState::ConfirmedDeleting(t) if t == target) {
            self.state = DeletionState::None;
        }
    }

    /// Drop the pending request. An in-flight delete cannot be cancelled.
    pub fn cancel(&mut self) -> Option<T> {
        match std::mem::replace(&mut self.state, DeletionState::None) {
            DeletionState::PendingConfirm(t) => Some(t),
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn deleting(&self) -> Option<&T> {
        match &self.state {
            DeletionState::ConfirmedDeleting(t) => Some(t),
            _ => None,
        }
    }
}
