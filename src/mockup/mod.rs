//! Print-on-demand mockup workflow
//!
//! `MockupOrchestrator` uploads a design, resolves catalog metadata, creates a
//! draft product and polls until the provider has rendered a mockup.

pub mod catalog;
pub mod error;
pub mod orchestrator;
pub mod poll;

#[cfg(test)]
pub(crate) mod fakes;

pub use error::MockupError;
pub use orchestrator::{MockupOrchestrator, MockupOutcome};
