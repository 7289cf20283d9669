// src/intake.rs
//! Per-commodity intake session.
//!
//! One uniform upload/delete surface keyed by display name. Names are resolved once
//! into a [`FactorId`]: main factors live in this controller, shared factors are
//! delegated to the session-wide [`FactorStore`]. All methods take `&self`, so
//! transfers for different factors may be in flight at the same time; every state
//! change happens under a short lock that is never held across an `.await`.

use std::sync::Arc;

use metrics::counter;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::commodity::{CommodityType, FactorId, MainFactorKind, RequiredSet};
use crate::config::ServiceConfig;
use crate::deletion::DeletionConfirmation;
use crate::error::IntakeError;
use crate::factor::{Factor, FactorFile, FactorSet};
use crate::metrics::{self as m, BLOCKED_TOTAL, DELETES_TOTAL, TRANSFER_FAILURES_TOTAL, UPLOADS_TOTAL};
use crate::report::ForecastResponse;
use crate::store::FactorStore;
use crate::submission::{ForecastRequest, SubmissionClient};
use crate::transfer::{DynTransfer, TransferKind};
use crate::validation::ValidationGate;

/// A successful forecast, handed on to presentation together with its commodity.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOutcome {
    pub commodity: CommodityType,
    pub response: ForecastResponse,
}

pub struct IntakeController {
    commodity: CommodityType,
    store: Arc<FactorStore>,
    main: Mutex<FactorSet>,
    loading: Mutex<Option<FactorId>>,
    upload_intent: Mutex<Option<FactorId>>,
    deletion: Mutex<DeletionConfirmation<FactorId>>,
    transfer: DynTransfer,
    submission: SubmissionClient,
}

impl IntakeController {
    /// Start a session with fresh (empty) main factors for `commodity`.
    pub fn new(
        commodity: CommodityType,
        store: Arc<FactorStore>,
        submission: SubmissionClient,
        transfer: DynTransfer,
    ) -> Self {
        m::ensure_described();
        debug!(target: "intake", commodity = %commodity, "intake session started");
        Self {
            commodity,
            store,
            main: Mutex::new(main_factor_set(commodity)),
            loading: Mutex::new(None),
            upload_intent: Mutex::new(None),
            deletion: Mutex::new(DeletionConfirmation::new()),
            transfer,
            submission,
        }
    }

    /// Start a session carrying over main factors the caller kept from an earlier one
    /// (see [`IntakeController::end`]). Factors that belong to another commodity are dropped.
    pub fn resume(
        commodity: CommodityType,
        store: Arc<FactorStore>,
        submission: SubmissionClient,
        transfer: DynTransfer,
        previous: FactorSet,
    ) -> Self {
        let controller = Self::new(commodity, store, submission, transfer);
        {
            let mut main = controller.main.lock();
            for factor in previous {
                if let (Some(slot), Some(file)) = (main.get_mut(factor.name()), factor.file()) {
                    slot.set_file(Some(file.clone()));
                }
            }
        }
        controller
    }

    /// Wire a session from configuration: HTTP client, endpoint and transfer latency.
    pub fn from_config(
        commodity: CommodityType,
        store: Arc<FactorStore>,
        cfg: &ServiceConfig,
    ) -> anyhow::Result<Self> {
        let submission = SubmissionClient::new(cfg.http_client()?, cfg.forecast_url());
        Ok(Self::new(commodity, store, submission, cfg.transfer()))
    }

    /// End the session, handing back its main factors for explicit persistence.
    pub fn end(self) -> FactorSet {
        debug!(target: "intake", commodity = %self.commodity, "intake session ended");
        self.main.into_inner()
    }

    pub fn commodity(&self) -> CommodityType {
        self.commodity
    }

    pub fn required_set(&self) -> RequiredSet {
        self.commodity.required_set()
    }

    /// Resolve a display name for this session (exact match only).
    pub fn resolve(&self, name: &str) -> Result<FactorId, IntakeError> {
        FactorId::resolve(self.commodity, name)
    }

    fn label(&self, id: FactorId) -> String {
        id.label(self.commodity)
    }

    // ---------------------------------------------------------------------
    // Upload
    // ---------------------------------------------------------------------

    /// Open an upload intent for `name` (e.g. the file picker is shown). No factor changes.
    pub fn request_upload(&self, name: &str) -> Result<FactorId, IntakeError> {
        let id = self.resolve(name)?;
        *self.upload_intent.lock() = Some(id);
        debug!(target: "intake", factor = name, "upload requested");
        Ok(id)
    }

    pub fn upload_intent(&self) -> Option<String> {
        let intent = *self.upload_intent.lock();
        intent.map(|id| self.label(id))
    }

    /// `Idle -> Loading -> Uploaded`. Re-uploading replaces the file.
    pub async fn commit_upload(&self, name: &str, file: FactorFile) -> Result<(), IntakeError> {
        let id = self.resolve(name)?;
        if !file.is_accepted() {
            return Err(IntakeError::UnsupportedFile {
                name: name.to_string(),
                file_name: file.file_name().to_string(),
            });
        }

        self.begin_loading(id);
        let outcome = self.transfer.run(TransferKind::Upload, name, Some(&file)).await;
        self.end_loading(id);

        if let Err(e) = outcome {
            counter!(TRANSFER_FAILURES_TOTAL).increment(1);
            warn!(target: "intake", factor = name, error = %e, "upload transfer failed");
            return Err(e.into());
        }

        info!(
            target: "intake",
            commodity = %self.commodity,
            factor = name,
            file = file.file_name(),
            bytes = file.len(),
            "factor uploaded"
        );
        self.apply(id, Some(file));
        {
            let mut intent = self.upload_intent.lock();
            if *intent == Some(id) {
                *intent = None;
            }
        }
        counter!(UPLOADS_TOTAL).increment(1);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Delete
    // ---------------------------------------------------------------------

    /// Ask for confirmation before deleting `name`. Replaces any pending request.
    pub fn request_delete(&self, name: &str) -> Result<(), IntakeError> {
        let id = self.resolve(name)?;
        let replaced = self.deletion.lock().request(id);
        debug!(
            target: "intake",
            factor = name,
            replaced = ?replaced.map(|r| self.label(r)),
            "delete awaiting confirmation"
        );
        Ok(())
    }

    pub fn pending_deletion(&self) -> Option<String> {
        let pending = self.deletion.lock().pending().copied();
        pending.map(|id| self.label(id))
    }

    /// `Uploaded -> Loading(delete) -> Idle` for the pending factor. Returns its name.
    pub async fn confirm_delete(&self) -> Result<String, IntakeError> {
        let id = self
            .deletion
            .lock()
            .confirm()
            .ok_or(IntakeError::NoPendingDeletion)?;
        let name = self.label(id);

        self.begin_loading(id);
        let outcome = self.transfer.run(TransferKind::Delete, &name, None).await;
        self.end_loading(id);

        if let Err(e) = outcome {
            self.deletion.lock().finish(&id);
            counter!(TRANSFER_FAILURES_TOTAL).increment(1);
            warn!(target: "intake", factor = %name, error = %e, "delete transfer failed");
            return Err(e.into());
        }

        // Mutation first, then release the confirmation: the delete runs only while
        // the state is ConfirmedDeleting.
        self.apply(id, None);
        self.deletion.lock().finish(&id);
        counter!(DELETES_TOTAL).increment(1);
        info!(target: "intake", commodity = %self.commodity, factor = %name, "factor deleted");
        Ok(name)
    }

    /// Drop the pending delete without touching any factor.
    pub fn cancel_delete(&self) -> Option<String> {
        let cancelled = self.deletion.lock().cancel();
        cancelled.map(|id| {
            let name = self.label(id);
            debug!(target: "intake", factor = %name, "delete cancelled");
            name
        })
    }

    // ---------------------------------------------------------------------
    // State
    // ---------------------------------------------------------------------

    /// Display hint: the factor whose transfer started most recently and is still running.
    pub fn loading(&self) -> Option<String> {
        let loading = *self.loading.lock();
        loading.map(|id| self.label(id))
    }

    fn begin_loading(&self, id: FactorId) {
        *self.loading.lock() = Some(id);
    }

    // Only the operation that owns the marker clears it.
    fn end_loading(&self, id: FactorId) {
        let mut loading = self.loading.lock();
        if *loading == Some(id) {
            *loading = None;
        }
    }

    fn apply(&self, id: FactorId, file: Option<FactorFile>) {
        match id {
            FactorId::Main(kind) => {
                let label = kind.label(self.commodity);
                if let Some(slot) = self.main.lock().get_mut(&label) {
                    slot.set_file(file);
                }
            }
            FactorId::Shared(shared) => match file {
                Some(file) => self.store.upload_factor(shared, file),
                None => self.store.delete_factor(shared),
            },
        }
    }

    pub fn main_factors(&self) -> Vec<Factor> {
        self.main.lock().iter().cloned().collect()
    }

    /// Main factors, then shared factors, in display order.
    pub fn factors(&self) -> Vec<Factor> {
        let mut all = self.main_factors();
        all.extend(self.store.snapshot());
        all
    }

    pub fn uploaded_names(&self) -> Vec<String> {
        self.factors()
            .into_iter()
            .filter(Factor::uploaded)
            .map(|f| f.name().to_string())
            .collect()
    }

    pub fn missing_factors(&self) -> Vec<String> {
        let uploaded = self.uploaded_names();
        ValidationGate::new(self.required_set()).missing(uploaded.iter().map(String::as_str))
    }

    // ---------------------------------------------------------------------
    // Forecast
    // ---------------------------------------------------------------------

    /// Every uploaded factor keyed by display name, plus the commodity discriminator.
    pub fn build_request(&self) -> ForecastRequest {
        let mut request = ForecastRequest::new(self.commodity);
        for factor in self.factors() {
            if let Some(file) = factor.file() {
                request.insert(factor.name(), file.clone());
            }
        }
        request
    }

    /// Validate, then submit. Incomplete sets never reach the network.
    /// The gate checks the same snapshot that is sent.
    pub async fn run_forecast(&self) -> Result<ForecastOutcome, IntakeError> {
        let request = self.build_request();
        let gate = ValidationGate::new(self.required_set());
        if let Err(err) = gate.check(request.part_names()) {
            counter!(BLOCKED_TOTAL).increment(1);
            info!(
                target: "intake",
                commodity = %self.commodity,
                missing = ?err.missing,
                "forecast blocked: required factors missing"
            );
            return Err(err.into());
        }

        let response = self.submission.send(&request).await?;
        Ok(ForecastOutcome {
            commodity: self.commodity,
            response,
        })
    }
}

fn main_factor_set(commodity: CommodityType) -> FactorSet {
    FactorSet::from_names(MainFactorKind::ALL.into_iter().map(|k| k.label(commodity)))
}
