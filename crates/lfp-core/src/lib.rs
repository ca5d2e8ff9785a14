//! # lfp-core: Foundational Types for the Forms Portal
//!
//! This crate is the leaf of the forms portal workspace. It defines the
//! value and identifier types shared by the form engine, the signature
//! surface, the autofill transport, and the host composition layer.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `LineItemId`, `FormInstanceId`,
//!    `FormType`, `TenantId`, `UserId`. No bare strings or UUIDs cross a
//!    crate boundary.
//!
//! 2. **Positional indices never address data.** A `FieldPath` names a
//!    scalar field or a `(group, LineItemId, field)` triple, so error
//!    messages and bound UI state survive insertion and removal.
//!
//! 3. **Declared hint kinds.** Every field kind maps to a `HintKind` by an
//!    exhaustive `match`; the autofill description is never derived by
//!    inspecting runtime values.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `lfp-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod autofill;
pub mod error;
pub mod identity;
pub mod kind;
pub mod path;
pub mod value;

pub use autofill::{AutofillRequest, TransportError};
pub use error::LfpError;
pub use identity::{FormInstanceId, FormType, LineItemId, TenantId, UserId};
pub use kind::{FieldKind, HintKind};
pub use path::FieldPath;
pub use value::FieldValue;
