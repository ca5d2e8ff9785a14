//! # lfp-autofill: Completion Service Contract
//!
//! Carries an [`AutofillRequest`](lfp_core::AutofillRequest) to an external
//! completion service and brings back a candidate JSON object.
//!
//! ## Wire contract
//!
//! `POST {base_url}/v1/autofill` with a bearer token and a JSON body
//! `{simplifiedSchema, priorStateJson?, domainHint?}`. The response is a
//! JSON object whose keys should be a subset of the form's field names
//! (see [`candidate`] for the framings accepted).
//!
//! ## Failure mapping
//!
//! | Condition | Error |
//! |---|---|
//! | connect/timeout (after retries) | `TransportError::Unreachable` |
//! | non-2xx status | `TransportError::Api` |
//! | body is not JSON | `TransportError::Deserialization` |
//! | JSON but no object candidate | `TransportError::MalformedResponse` |
//!
//! All of these are recoverable: the form engine turns them into a notice
//! and leaves the document unchanged.

pub mod candidate;
pub mod client;
pub mod config;
pub(crate) mod retry;

pub use candidate::extract_candidate;
pub use client::{CompletionClient, CompletionService};
pub use config::{AutofillConfig, ConfigError};
