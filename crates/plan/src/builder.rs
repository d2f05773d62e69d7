//! Install-plan construction
//!
//! One `ResponseHandler` invocation walks a single response through
//! `Idle -> Evaluating -> {NoUpdate, Rejected, Built} -> Completed`:
//! rollback guard first, then source selection, plan fields, resume
//! bookkeeping, the hash-check mandate, device lookup, and finally the
//! deadline side channel. Exactly one completion event is emitted per
//! invocation and the handler keeps no state across invocations.

use std::path::PathBuf;
use std::sync::Arc;

use otad_config::Config;
use otad_errors::Error;
use otad_events::{AppEvent, EventEmitter, EventSender, UpdateEvent};
use otad_platform::{
    install_device_of_boot_device, kernel_device_of_boot_device, Hardware,
};
use otad_prefs::{PayloadState, Prefs};
use otad_types::{CompletionCode, InstallPlan, UpdateResponse};

use crate::context::{PolicyContext, RequestParams};
use crate::policy::{self, RollbackDecision};
use crate::{deadline, resume};

/// Terminal outcome of one planning invocation.
#[derive(Debug, Clone)]
pub enum PlanOutcome {
    /// No update to act on; the pipeline goes back to idle.
    NoUpdate,
    /// A plan was built and is ready for the payload stage.
    Built(InstallPlan),
}

impl PlanOutcome {
    /// The built plan, if any.
    #[must_use]
    pub fn plan(&self) -> Option<&InstallPlan> {
        match self {
            Self::Built(plan) => Some(plan),
            Self::NoUpdate => None,
        }
    }

    /// Consume the outcome, yielding the built plan if any.
    #[must_use]
    pub fn into_plan(self) -> Option<InstallPlan> {
        match self {
            Self::Built(plan) => Some(plan),
            Self::NoUpdate => None,
        }
    }
}

/// Map a planning result onto the stage's completion code.
///
/// The evaluation path only produces response errors (unusable response)
/// and platform errors (device lookup); anything else would be a bug in a
/// collaborator and is reported as an invalid response rather than
/// swallowed.
#[must_use]
pub fn completion_code(result: &Result<PlanOutcome, Error>) -> CompletionCode {
    match result {
        Ok(PlanOutcome::Built(_)) => CompletionCode::Success,
        Ok(PlanOutcome::NoUpdate) => CompletionCode::NoUpdate,
        Err(Error::Platform(_)) => CompletionCode::DeviceLookupFailed,
        Err(_) => CompletionCode::InvalidResponse,
    }
}

/// Turns one update-check response into an install plan.
#[derive(Clone)]
pub struct ResponseHandler {
    prefs: Arc<dyn Prefs>,
    payload_state: Arc<dyn PayloadState>,
    hardware: Arc<dyn Hardware>,
    deadline_file: PathBuf,
    boot_device_override: Option<String>,
    event_sender: Option<EventSender>,
}

impl std::fmt::Debug for ResponseHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseHandler")
            .field("deadline_file", &self.deadline_file)
            .field("boot_device_override", &self.boot_device_override)
            .finish_non_exhaustive()
    }
}

impl EventEmitter for ResponseHandler {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl ResponseHandler {
    /// Create a handler over the injected capabilities.
    #[must_use]
    pub fn new(
        prefs: Arc<dyn Prefs>,
        payload_state: Arc<dyn PayloadState>,
        hardware: Arc<dyn Hardware>,
        config: &Config,
    ) -> Self {
        Self {
            prefs,
            payload_state,
            hardware,
            deadline_file: config.paths.deadline_file.clone(),
            boot_device_override: config.update.boot_device_override.clone(),
            event_sender: None,
        }
    }

    /// Attach an event sender for observability.
    #[must_use]
    pub fn with_event_sender(mut self, event_sender: EventSender) -> Self {
        self.event_sender = Some(event_sender);
        self
    }

    /// Handle one response: run every policy check and either hand back a
    /// plan or a benign no-update outcome.
    ///
    /// Emits exactly one `Completed` event carrying the stage's completion
    /// code, on every path.
    ///
    /// # Errors
    ///
    /// Returns `ResponseError::NoUsableUrl` for a response without a
    /// usable download URL and `PlatformError` when the install or kernel
    /// device cannot be resolved. Preference and deadline write failures
    /// are reported as warning events, never as errors.
    pub async fn handle(
        &self,
        response: &UpdateResponse,
        params: RequestParams,
    ) -> Result<PlanOutcome, Error> {
        self.emit(AppEvent::Update(UpdateEvent::ResponseReceived {
            update_exists: response.update_exists,
            version: response.version.clone(),
        }));

        let result = self.evaluate(response, params).await;
        self.emit(AppEvent::Update(UpdateEvent::Completed {
            code: completion_code(&result),
        }));
        result
    }

    async fn evaluate(
        &self,
        response: &UpdateResponse,
        params: RequestParams,
    ) -> Result<PlanOutcome, Error> {
        if !response.update_exists {
            self.emit(AppEvent::Update(UpdateEvent::NoUpdateAvailable));
            return Ok(PlanOutcome::NoUpdate);
        }

        let ctx = PolicyContext::gather(
            self.hardware.as_ref(),
            self.payload_state.as_ref(),
            params,
            self.boot_device_override.clone(),
        )
        .await;

        // Cheapest, highest-priority reject: never re-offer the version the
        // device was deliberately rolled back from.
        if policy::evaluate_rollback(&ctx.rollback_version, &response.version)
            == RollbackDecision::Reject
        {
            self.emit(AppEvent::Update(UpdateEvent::RollbackVersionRejected {
                version: response.version.clone(),
            }));
            return Ok(PlanOutcome::NoUpdate);
        }

        let primary_url = self.payload_state.current_url(response);
        let source = policy::resolve_source(
            &primary_url,
            ctx.params.use_p2p_for_downloading,
            &ctx.params.p2p_url,
        )?;
        if let Err(e) = self.payload_state.set_using_p2p(source.used_p2p).await {
            self.emit_warning_with_context("failed to record p2p usage", e.to_string());
        }
        self.emit(AppEvent::Update(UpdateEvent::SourceSelected {
            url: source.url.clone(),
            used_p2p: source.used_p2p,
        }));

        let mut plan = InstallPlan {
            download_url: source.url,
            version: response.version.clone(),
            payload_size: response.payload_size,
            payload_hash: response.payload_hash.clone(),
            metadata_size: response.metadata_size,
            metadata_signature: response.metadata_signature.clone(),
            public_key_rsa: response.public_key_rsa.clone(),
            ..InstallPlan::default()
        };

        // The mandate looks at the effective URL, which may be a plain-http
        // peer even when every server URL is https.
        let (mandatory, reason) = policy::mandate_with_reason(
            ctx.is_official_build,
            response.has_signature(),
            &plan.download_url,
            &response.payload_urls,
        );
        plan.hash_checks_mandatory = mandatory;
        self.emit(AppEvent::Update(UpdateEvent::HashCheckPolicyDecided {
            mandatory,
            reason: reason.to_string(),
        }));

        let response_hash = response.payload_hash_hex();
        let decision = resume::decide(self.prefs.as_ref(), &response_hash).await;
        resume::apply(
            decision,
            self.prefs.as_ref(),
            self.payload_state.as_ref(),
            &response_hash,
            self,
        )
        .await;
        plan.is_resume = decision == resume::ResumeDecision::Resume;

        plan.is_full_update = !response.is_delta_payload;

        let boot_device = match &ctx.boot_device_override {
            Some(device) => device.clone(),
            None => self.hardware.boot_device()?,
        };
        plan.install_path = install_device_of_boot_device(&boot_device)?;
        plan.kernel_install_path = kernel_device_of_boot_device(&plan.install_path)?;

        plan.powerwash_required = ctx.params.channel_downgrade && ctx.params.powerwash_allowed;

        self.emit(AppEvent::Update(UpdateEvent::PlanReady {
            summary: plan.summary(),
        }));

        // Best-effort side channel; an empty deadline still overwrites a
        // stale one.
        match deadline::write_deadline(&self.deadline_file, &response.deadline).await {
            Ok(()) => self.emit(AppEvent::Update(UpdateEvent::DeadlineWritten {
                path: self.deadline_file.display().to_string(),
                bytes: response.deadline.len(),
            })),
            Err(e) => self.emit(AppEvent::Update(UpdateEvent::DeadlineWriteFailed {
                path: self.deadline_file.display().to_string(),
                error: e.to_string(),
            })),
        }

        Ok(PlanOutcome::Built(plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otad_errors::{PlatformError, ResponseError};

    #[test]
    fn completion_code_covers_every_terminal_state() {
        assert_eq!(
            completion_code(&Ok(PlanOutcome::NoUpdate)),
            CompletionCode::NoUpdate
        );
        assert_eq!(
            completion_code(&Ok(PlanOutcome::Built(InstallPlan::default()))),
            CompletionCode::Success
        );
        assert_eq!(
            completion_code(&Err(ResponseError::NoUsableUrl.into())),
            CompletionCode::InvalidResponse
        );
        assert_eq!(
            completion_code(&Err(PlatformError::DeviceLookupFailed {
                device: "/dev/sda".to_string(),
                message: "no partition".to_string(),
            }
            .into())),
            CompletionCode::DeviceLookupFailed
        );
    }

    #[test]
    fn outcome_exposes_plan_only_when_built() {
        assert!(PlanOutcome::NoUpdate.plan().is_none());
        let outcome = PlanOutcome::Built(InstallPlan::default());
        assert!(outcome.plan().is_some());
        assert!(outcome.into_plan().is_some());
    }
}
