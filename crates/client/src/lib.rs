//! HTTP submission client for quote forms.
//!
//! [`api::QuoteApi`] implements the core [`Submitter`](quoteflow_core::submission::Submitter)
//! trait with [`reqwest`]: one POST per submit, JSON or multipart
//! depending on whether the session holds attachments.

pub mod api;
pub mod config;

pub use api::QuoteApi;
pub use config::ClientConfig;
