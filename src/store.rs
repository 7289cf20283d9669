// src/store.rs
//! Session-wide store for the factors shared by every commodity type.
//!
//! Constructed once per application session (`FactorStore::shared()`) and handed to each
//! `IntakeController` by `Arc`. Every mutation goes through `upload`/`delete` and holds
//! the lock only for the read-modify-write itself.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::commodity::SharedFactor;
use crate::error::IntakeError;
use crate::factor::{Factor, FactorFile, FactorSet};

#[derive(Debug)]
pub struct FactorStore {
    factors: Mutex<FactorSet>,
}

impl Default for FactorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FactorStore {
    /// Empty three-factor set in canonical display order.
    pub fn new() -> Self {
        Self {
            factors: Mutex::new(FactorSet::from_names(
                SharedFactor::ALL.into_iter().map(SharedFactor::label),
            )),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Attach `file` to a shared factor by display name.
    pub fn upload(&self, name: &str, file: FactorFile) -> Result<(), IntakeError> {
        let factor = SharedFactor::from_label(name).ok_or_else(|| IntakeError::unknown_factor(name))?;
        self.upload_factor(factor, file);
        Ok(())
    }

    /// Clear a shared factor by display name.
    pub fn delete(&self, name: &str) -> Result<(), IntakeError> {
        let factor = SharedFactor::from_label(name).ok_or_else(|| IntakeError::unknown_factor(name))?;
        self.delete_factor(factor);
        Ok(())
    }

    pub fn upload_factor(&self, factor: SharedFactor, file: FactorFile) {
        debug!(target: "intake", factor = factor.label(), file = file.file_name(), "shared factor uploaded");
        self.set(factor, Some(file));
    }

    pub fn delete_factor(&self, factor: SharedFactor) {
        debug!(target: "intake", factor = factor.label(), "shared factor cleared");
        self.set(factor, None);
    }

    fn set(&self, factor: SharedFactor, file: Option<FactorFile>) {
        let mut guard = self.factors.lock();
        // Every SharedFactor label is seeded in `new`, so the slot always exists.
        if let Some(slot) = guard.get_mut(factor.label()) {
            slot.set_file(file);
        }
    }

    pub fn get(&self, name: &str) -> Option<Factor> {
        self.factors.lock().get(name).cloned()
    }

    pub fn snapshot(&self) -> Vec<Factor> {
        self.factors.lock().iter().cloned().collect()
    }

    pub fn uploaded_names(&self) -> Vec<String> {
        self.factors
            .lock()
            .uploaded_names()
            .map(str::to_string)
            .collect()
    }

    /// Clear every shared factor (e.g. "start over" in the UI).
    pub fn reset(&self) {
        self.factors.lock().reset();
    }
}
