//! # lfp-portal: Host Composition
//!
//! Wires the form engine, signature pads, autofill transport, and
//! submission sink into something a host application can drive.
//!
//! ## Start-up
//!
//! ```text
//! PortalConfig::from_env()       typed, validated, secrets redacted
//!   └─ init_tracing(format, filter)
//!   └─ Portal::from_config(&config)
//!        ├─ FormCatalog::builtin()
//!        ├─ CompletionClient      (absent config → autofill disabled)
//!        └─ HttpSubmissionSink
//! ```
//!
//! ## Per form
//!
//! [`Portal::open`] mounts a [`FormSession`]: one engine plus the
//! signature pads bound to its signature fields. The host forwards field
//! edits via [`FormSession::with_engine`], pointer input via
//! [`FormSession::signature_event`], and calls
//! [`FormSession::autofill`] / [`Portal::submit`].
//!
//! Tenant and user are carried in an explicit [`HostContext`]; nothing
//! is read from globals after start-up.

pub mod config;
pub mod context;
pub mod error;
pub mod portal;
pub mod session;
pub mod sink;
pub mod telemetry;

pub use config::{ConfigError, LogFormat, PortalConfig};
pub use context::HostContext;
pub use error::{PortalError, SessionError};
pub use portal::Portal;
pub use session::FormSession;
pub use sink::{HttpSubmissionSink, SinkError, SubmissionAck, SubmissionSink, USER_HEADER};
pub use telemetry::{init_tracing, TelemetryError};
