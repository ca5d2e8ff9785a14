//! # lfp-forms: Dynamic Structured Form Engine
//!
//! Holds one schema-validated document per mounted form: scalar fields
//! plus order-preserving repeating groups of line items, each addressed by
//! a stable [`LineItemId`](lfp_core::LineItemId) rather than its position.
//!
//! ## Operations
//!
//! - `set_field` / `set_item_field`: store a value, refresh live markers.
//! - `append_line_item` / `remove_line_item`: identity-based row edits.
//! - `validate`: pure full-rule run returning a [`ValidationReport`].
//! - `replace_all` / `reset`: atomic whole-document substitution.
//! - `begin_autofill` / `finish_autofill`: generation-guarded merge of an
//!   external completion result.
//! - `finalize`: refuse or produce the submission payload.
//!
//! ## Crate Policy
//!
//! - Depends on `lfp-core` and `lfp-schema` only. No transport, no async.
//! - Invalid field input is data (a marker), never an `Err`.
//! - Every rejected bulk change leaves the document exactly as it was.

pub mod autofill;
pub mod document;
pub mod engine;
pub mod error;

pub use autofill::{AutofillOutcome, AutofillTicket};
pub use document::{FormDocument, LineItem, LineItems};
pub use engine::{FinalizedForm, FormEngine, ValidationReport};
pub use error::{AutofillError, ReplaceError, AUTOFILL_FAILED_NOTICE};
