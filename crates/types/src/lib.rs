#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the otad update client
//!
//! This crate provides the fundamental types exchanged between pipeline
//! stages: the decoded update-check response, the install plan handed to
//! the payload-application stage, and the per-invocation completion code.

pub mod code;
pub mod plan;
pub mod response;

// Re-export commonly used types
pub use code::CompletionCode;
pub use plan::InstallPlan;
pub use response::UpdateResponse;
