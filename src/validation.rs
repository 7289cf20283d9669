// src/validation.rs
//! Pre-submission completeness check.

use std::collections::HashSet;

use crate::commodity::RequiredSet;
use crate::error::ValidationError;

/// Computes which required factors are still missing before a forecast may run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationGate {
    required: Vec<String>,
}

impl ValidationGate {
    pub fn new(required: RequiredSet) -> Self {
        Self {
            required: required.labels(),
        }
    }

    /// Gate over an explicit canonical list (order is preserved in the output).
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Required names absent from `uploaded`, in required order. Exact matches only.
    pub fn missing<'a, I>(&self, uploaded: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let have: HashSet<&str> = uploaded.into_iter().collect();
        self.required
            .iter()
            .filter(|name| !have.contains(name.as_str()))
            .cloned()
            .collect()
    }

    pub fn check<'a, I>(&self, uploaded: I) -> Result<(), ValidationError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let missing = self.missing(uploaded);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }
}
