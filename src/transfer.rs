// src/transfer.rs
//! The asynchronous step between "user picked a file" and "factor is uploaded".
//!
//! The controller marks the factor as loading, awaits a [`Transfer`], and only settles
//! factor state once the transfer has finished. Failures leave the factor untouched.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::factor::FactorFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    Upload,
    Delete,
}

impl TransferKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransferKind::Upload => "upload",
            TransferKind::Delete => "delete",
        }
    }
}

#[async_trait]
pub trait Transfer: Send + Sync {
    /// Move `file` (uploads) or release the slot (deletes) for the factor `label`.
    async fn run(
        &self,
        kind: TransferKind,
        label: &str,
        file: Option<&FactorFile>,
    ) -> Result<(), TransportError>;

    fn name(&self) -> &'static str;
}

pub type DynTransfer = Arc<dyn Transfer>;

/// Completes immediately. Bytes already live in memory, so nothing has to move.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantTransfer;

#[async_trait]
impl Transfer for InstantTransfer {
    async fn run(
        &self,
        _kind: TransferKind,
        _label: &str,
        _file: Option<&FactorFile>,
    ) -> Result<(), TransportError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "instant"
    }
}

/// Settles after a fixed latency, so the UI has a visible loading phase.
#[derive(Debug, Clone, Copy)]
pub struct DelayedTransfer {
    delay: Duration,
}

impl DelayedTransfer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl Transfer for DelayedTransfer {
    async fn run(
        &self,
        _kind: TransferKind,
        _label: &str,
        _file: Option<&FactorFile>,
    ) -> Result<(), TransportError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "delayed"
    }
}

/// Pick the transfer for a configured delay (0 = instant).
pub fn for_delay_ms(ms: u64) -> DynTransfer {
    if ms == 0 {
        Arc::new(InstantTransfer)
    } else {
        Arc::new(DelayedTransfer::from_millis(ms))
    }
}
