//! Resume-vs-restart tracking
//!
//! Decides whether an interrupted download of the same payload continues
//! and keeps the persistent bookkeeping in step with that decision. The
//! resumability test itself belongs to the preference store; this module
//! only acts on its verdict.

use otad_events::{AppEvent, EventEmitter, UpdateEvent};
use otad_prefs::{resume as stored, PayloadState, Prefs};

/// Whether the pending download continues or starts over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeDecision {
    /// The persisted state belongs to this same payload; keep it.
    Resume,
    /// Different or no persisted payload; reset and start a fresh cycle.
    Restart,
}

/// Decide between resuming and restarting for the given response hash.
pub async fn decide(prefs: &dyn Prefs, response_hash_hex: &str) -> ResumeDecision {
    if stored::can_resume_update(prefs, response_hash_hex).await {
        ResumeDecision::Resume
    } else {
        ResumeDecision::Restart
    }
}

/// Apply the bookkeeping a decision requires.
///
/// On `Restart` the progress counter is reset, the new response hash is
/// persisted, and the payload-state collaborator is told a fresh cycle
/// started. On `Resume` the collaborator is told the cycle continues and
/// no persisted state is touched. Write failures never abort planning -
/// downstream hash verification catches an inconsistent resume - but each
/// one is surfaced as a warning event.
pub async fn apply<E: EventEmitter>(
    decision: ResumeDecision,
    prefs: &dyn Prefs,
    payload_state: &dyn PayloadState,
    response_hash_hex: &str,
    emitter: &E,
) {
    match decision {
        ResumeDecision::Resume => {
            if let Err(e) = payload_state.update_resumed().await {
                emitter.emit_warning_with_context(
                    "failed to record resumed download",
                    e.to_string(),
                );
            }
            emitter.emit(AppEvent::Update(UpdateEvent::DownloadResumed {
                payload_hash: response_hash_hex.to_string(),
            }));
        }
        ResumeDecision::Restart => {
            if let Err(e) = payload_state.update_restarted().await {
                emitter.emit_warning_with_context(
                    "failed to record restarted download",
                    e.to_string(),
                );
            }
            if let Err(e) = stored::reset_update_progress(prefs).await {
                emitter.emit_warning_with_context(
                    "unable to reset the update progress",
                    e.to_string(),
                );
            }
            if let Err(e) = stored::record_response_hash(prefs, response_hash_hex).await {
                emitter.emit_warning_with_context(
                    "unable to save the update check response hash",
                    e.to_string(),
                );
            }
            emitter.emit(AppEvent::Update(UpdateEvent::DownloadRestarted {
                payload_hash: response_hash_hex.to_string(),
            }));
        }
    }
}
