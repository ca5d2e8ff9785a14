//! # lfp-signature: Signature Capture Surface
//!
//! A fixed-size drawing surface that turns pointer input into ink strokes
//! and exports the whole rendered surface as one self-describing image
//! string (`data:image/png;base64,...`). The empty string means "no
//! signature", so a host can tell blank from signed without decoding
//! anything.
//!
//! ## State machine
//!
//! ```text
//!          begin_stroke            end_stroke
//!   Idle ───────────────▶ Drawing ───────────▶ Idle (export refreshed)
//!    ▲                      │  ▲
//!    │                      └──┘ extend_stroke
//!    └──────── clear (from either state, export reset to "")
//! ```
//!
//! A pointer-down while already drawing is ignored, as is a move or
//! pointer-up with no stroke open.
//!
//! ## Platform seam
//!
//! Drawing goes through the [`DrawSurface`] trait. [`RasterSurface`] is the
//! bundled implementation: an opaque RGB raster (no alpha channel) scaled
//! by the device pixel ratio. A pad constructed without a surface
//! (unsupported environment) accepts every call as a no-op and exports
//! `""` forever.

pub mod color;
pub mod config;
pub mod error;
pub mod event;
pub mod pad;
pub mod surface;

pub use color::Rgb;
pub use config::PadConfig;
pub use error::{ColorError, ExportError};
pub use event::{Point, PointerEvent, PointerKind, PointerSource};
pub use pad::{PadState, SignaturePad};
pub use surface::{DrawSurface, RasterSurface, PNG_DATA_URI_PREFIX};
