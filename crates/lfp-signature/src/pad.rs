//! # Signature Pad
//!
//! The stroke state machine on top of a [`DrawSurface`].
//!
//! ## Export invariant
//!
//! `export()` always reflects the surface as of the last completed stroke
//! or clear. It is recomputed synchronously in `end_stroke` (the whole
//! surface, not just the last stroke), reset to `""` in `clear`, and never
//! updated mid-stroke.
//!
//! ## Re-mount
//!
//! The device pixel ratio is applied when the pad is created and whenever
//! the background colour changes. A background change requested while a
//! stroke is open waits until that stroke ends. Completed strokes are kept
//! so the re-mounted surface repaints the new fill beneath them.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::config::PadConfig;
use crate::event::{Point, PointerEvent, PointerKind};
use crate::surface::{DrawSurface, RasterSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PadState {
    Idle,
    Drawing,
}

impl std::fmt::Display for PadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("IDLE"),
            Self::Drawing => f.write_str("DRAWING"),
        }
    }
}

#[derive(Debug, Clone)]
struct Stroke {
    color: Rgb,
    points: Vec<Point>,
}

/// A freehand signature capture surface.
pub struct SignaturePad {
    config: PadConfig,
    surface: Option<Box<dyn DrawSurface>>,
    state: PadState,
    origin: Point,
    strokes: Vec<Stroke>,
    export: String,
    pending_background: Option<Rgb>,
}

impl std::fmt::Debug for SignaturePad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignaturePad")
            .field("config", &self.config)
            .field("supported", &self.surface.is_some())
            .field("state", &self.state)
            .field("strokes", &self.strokes.len())
            .field("blank", &self.export.is_empty())
            .finish()
    }
}

impl SignaturePad {
    /// Create a pad over `surface`, or an inert pad when `surface` is
    /// `None`.
    pub fn new(config: PadConfig, surface: Option<Box<dyn DrawSurface>>) -> Self {
        let mut pad = Self {
            config,
            surface,
            state: PadState::Idle,
            origin: Point::default(),
            strokes: Vec::new(),
            export: String::new(),
            pending_background: None,
        };
        pad.mount();
        pad
    }

    /// A pad backed by an in-memory raster.
    pub fn with_raster(config: PadConfig) -> Self {
        Self::new(config, Some(Box::new(RasterSurface::new())))
    }

    /// A pad for an environment with no drawable surface.
    pub fn unsupported(config: PadConfig) -> Self {
        tracing::debug!("signature pad created without a drawing surface");
        Self::new(config, None)
    }

    pub fn config(&self) -> &PadConfig {
        &self.config
    }

    pub fn state(&self) -> PadState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        self.state == PadState::Drawing
    }

    pub fn is_supported(&self) -> bool {
        self.surface.is_some()
    }

    /// The exported image string; `""` when blank.
    pub fn export(&self) -> &str {
        &self.export
    }

    pub fn is_blank(&self) -> bool {
        self.export.is_empty()
    }

    /// Completed and open strokes since the last clear.
    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    /// Set the on-screen origin of the surface in viewport coordinates.
    pub fn set_origin(&mut self, x: f64, y: f64) {
        self.origin = Point::new(x, y);
    }

    /// Pen colour for strokes started after this call.
    pub fn set_pen_color(&mut self, color: Rgb) {
        self.config.pen_color = color;
    }

    /// Change the background fill and re-mount the surface.
    ///
    /// Deferred to the end of the current stroke while drawing.
    pub fn set_background_color(&mut self, color: Rgb) {
        if self.is_drawing() {
            self.pending_background = Some(color);
            return;
        }
        self.config.background_color = color;
        self.mount();
        self.replay();
        if !self.strokes.is_empty() {
            self.refresh_export();
        }
    }

    /// Start a stroke at a viewport point. Ignored while a stroke is open.
    ///
    /// Returns whether the call took effect.
    pub fn begin_stroke(&mut self, viewport: Point) -> bool {
        if self.is_drawing() {
            return false;
        }
        let at = viewport.relative_to(self.origin);
        let color = self.config.pen_color;
        let width = self.config.stroke_width;
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        surface.segment(at, at, color, width);
        self.strokes.push(Stroke {
            color,
            points: vec![at],
        });
        self.state = PadState::Drawing;
        true
    }

    /// Extend the open stroke to a viewport point. Ignored when idle.
    pub fn extend_stroke(&mut self, viewport: Point) -> bool {
        if !self.is_drawing() {
            return false;
        }
        let at = viewport.relative_to(self.origin);
        let width = self.config.stroke_width;
        let (Some(surface), Some(stroke)) = (self.surface.as_mut(), self.strokes.last_mut()) else {
            return false;
        };
        let from = stroke.points.last().copied().unwrap_or(at);
        surface.segment(from, at, stroke.color, width);
        stroke.points.push(at);
        true
    }

    /// Close the open stroke and refresh the export. Ignored when idle.
    pub fn end_stroke(&mut self) -> bool {
        if !self.is_drawing() {
            return false;
        }
        self.state = PadState::Idle;
        if let Some(color) = self.pending_background.take() {
            self.config.background_color = color;
            self.mount();
            self.replay();
        }
        self.refresh_export();
        true
    }

    /// Erase everything and reset the export to `""`. Valid in any state.
    pub fn clear(&mut self) {
        if let Some(color) = self.pending_background.take() {
            self.config.background_color = color;
        }
        self.state = PadState::Idle;
        self.strokes.clear();
        let background = self.config.background_color;
        if let Some(surface) = self.surface.as_mut() {
            surface.fill(background);
        }
        self.export.clear();
    }

    /// Dispatch a pointer event. Returns whether the export changed.
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        match event.kind {
            PointerKind::Down => {
                self.begin_stroke(event.point());
                false
            }
            PointerKind::Move => {
                self.extend_stroke(event.point());
                false
            }
            PointerKind::Up | PointerKind::Leave => self.end_stroke(),
        }
    }

    fn mount(&mut self) {
        let (w, h, dpr) = (self.config.width, self.config.height, self.config.effective_dpr());
        let background = self.config.background_color;
        if let Some(surface) = self.surface.as_mut() {
            surface.mount(w, h, dpr);
            surface.fill(background);
        }
    }

    fn replay(&mut self) {
        let width = self.config.stroke_width;
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        for stroke in &self.strokes {
            let mut prev = match stroke.points.first() {
                Some(p) => *p,
                None => continue,
            };
            surface.segment(prev, prev, stroke.color, width);
            for p in &stroke.points[1..] {
                surface.segment(prev, *p, stroke.color, width);
                prev = *p;
            }
        }
    }

    fn refresh_export(&mut self) {
        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        match surface.encode() {
            Ok(encoded) => self.export = encoded,
            Err(e) => tracing::warn!(error = %e, "signature export failed; keeping previous export"),
        }
    }
}
