#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Update-response planning for otad
//!
//! This crate is the decision point of the update pipeline: it turns one
//! decoded server response into an [`otad_types::InstallPlan`] while
//! enforcing the policies that protect the device - anti-rollback,
//! mandatory hash/signature verification over insecure transports, and
//! resume-vs-restart bookkeeping for interrupted downloads.
//!
//! The policy functions in [`policy`] are pure; all I/O happens in the
//! [`builder::ResponseHandler`] orchestrator through injected
//! capabilities.

pub mod builder;
pub mod context;
pub mod deadline;
pub mod policy;
pub mod resume;

pub use builder::{completion_code, PlanOutcome, ResponseHandler};
pub use context::{PolicyContext, RequestParams};
pub use policy::{
    evaluate_rollback, hash_checks_mandatory, resolve_source, RollbackDecision, SourceSelection,
};
pub use resume::ResumeDecision;
