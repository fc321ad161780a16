//! Quote-request form engine.
//!
//! Pure logic for multi-step insurance quote forms: declarative field
//! schemas, the step validator, attachment slot checks, the form session
//! state machine, and construction of the outbound submission request.
//! The network side lives behind the [`submission::Submitter`] trait.

pub mod attachment;
pub mod error;
pub mod forms;
pub mod schema;
pub mod session;
pub mod submission;
pub mod types;
pub mod validation;
