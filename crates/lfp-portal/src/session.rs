//! One user's live form: engine, bound signature pads, and the services
//! it talks to.
//!
//! The engine and the pads sit behind separate `parking_lot` mutexes.
//! Where both are needed they are locked pads first, then engine. No lock
//! is held across an `.await`: autofill takes a ticket under the lock,
//! releases it for the network call, and re-locks to apply the result,
//! which the engine's generation check accepts only if nothing else
//! happened in between.

use std::collections::BTreeMap;
use std::sync::Arc;

use lfp_autofill::CompletionService;
use lfp_core::{FieldKind, FieldValue};
use lfp_forms::{AutofillOutcome, FormEngine, ValidationReport};
use lfp_schema::FormSchema;
use lfp_signature::{PadConfig, PointerEvent, SignaturePad};
use parking_lot::Mutex;

use crate::context::HostContext;
use crate::error::SessionError;
use crate::sink::{SubmissionAck, SubmissionSink};

pub struct FormSession<S: CompletionService + ?Sized = dyn CompletionService> {
    context: HostContext,
    engine: Mutex<FormEngine>,
    pads: Mutex<BTreeMap<String, SignaturePad>>,
    completion: Option<Arc<S>>,
}

impl<S: CompletionService + ?Sized> std::fmt::Debug for FormSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pads: Vec<String> = self.pads.lock().keys().cloned().collect();
        let engine = self.engine.lock();
        f.debug_struct("FormSession")
            .field("context", &self.context)
            .field("form", &engine.id())
            .field("form_type", engine.form_type())
            .field("generation", &engine.generation())
            .field("pads", &pads)
            .field("autofill", &self.completion.is_some())
            .finish()
    }
}

impl<S: CompletionService + ?Sized> FormSession<S> {
    /// Mount a fresh form. `completion: None` disables autofill.
    pub fn new(context: HostContext, schema: Arc<FormSchema>, completion: Option<Arc<S>>) -> Self {
        let engine = FormEngine::new(schema);
        tracing::debug!(form = %engine.id(), host = %context, "form session opened");
        Self {
            context,
            engine: Mutex::new(engine),
            pads: Mutex::new(BTreeMap::new()),
            completion,
        }
    }

    pub fn context(&self) -> &HostContext {
        &self.context
    }

    pub fn autofill_enabled(&self) -> bool {
        self.completion.is_some()
    }

    /// Run `f` with exclusive access to the engine.
    ///
    /// Do not call back into the session from `f`. Whole-document changes
    /// made here (`replace_all`, `reset`) do not reach the bound pads; use
    /// [`FormSession::replace_all`] and [`FormSession::reset`] instead.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut FormEngine) -> R) -> R {
        f(&mut self.engine.lock())
    }

    pub fn validate(&self) -> ValidationReport {
        self.engine.lock().validate()
    }

    /// Bind a raster-backed pad to a signature field.
    ///
    /// # Errors
    ///
    /// `SessionError::NotASignatureField` unless `field` is a top-level
    /// field of kind `signature`.
    pub fn bind_signature(&self, field: &str, config: PadConfig) -> Result<(), SessionError> {
        self.bind_pad(field, SignaturePad::with_raster(config))
    }

    /// Bind an already constructed pad to a signature field, replacing any
    /// pad bound before.
    pub fn bind_pad(&self, field: &str, pad: SignaturePad) -> Result<(), SessionError> {
        let is_signature = self
            .engine
            .lock()
            .schema()
            .field(field)
            .is_some_and(|spec| spec.kind == FieldKind::Signature);
        if !is_signature {
            return Err(SessionError::NotASignatureField(field.to_string()));
        }
        self.pads.lock().insert(field.to_string(), pad);
        Ok(())
    }

    /// Move the origin of the pad bound to `field` (the surface's
    /// viewport offset).
    pub fn set_pad_origin(&self, field: &str, x: f64, y: f64) -> Result<(), SessionError> {
        let mut pads = self.pads.lock();
        let pad = pads
            .get_mut(field)
            .ok_or_else(|| SessionError::NoPadBound(field.to_string()))?;
        pad.set_origin(x, y);
        Ok(())
    }

    /// Forward a pointer event to the pad bound to `field`. When a stroke
    /// completes, the new export is written into the field.
    ///
    /// Returns whether the field value changed.
    pub fn signature_event(&self, field: &str, event: PointerEvent) -> Result<bool, SessionError> {
        let mut pads = self.pads.lock();
        let pad = pads
            .get_mut(field)
            .ok_or_else(|| SessionError::NoPadBound(field.to_string()))?;
        if !pad.handle(event) {
            return Ok(false);
        }
        let value = signature_value(pad);
        self.engine.lock().set_field(field, value)?;
        Ok(true)
    }

    /// Wipe the pad bound to `field` and empty the field.
    pub fn clear_signature(&self, field: &str) -> Result<(), SessionError> {
        let mut pads = self.pads.lock();
        let pad = pads
            .get_mut(field)
            .ok_or_else(|| SessionError::NoPadBound(field.to_string()))?;
        pad.clear();
        self.engine.lock().set_field(field, FieldValue::Empty)?;
        Ok(())
    }

    /// Return the form to its schema defaults and wipe every bound pad.
    pub fn reset(&self) {
        let mut pads = self.pads.lock();
        for pad in pads.values_mut() {
            pad.clear();
        }
        self.engine.lock().reset();
    }

    /// Replace the whole document with `candidate` laid over the schema
    /// defaults. Every bound pad whose drawing no longer matches its field
    /// is wiped.
    ///
    /// # Errors
    ///
    /// `SessionError::Replace` if the candidate is rejected; the document
    /// and the pads are unchanged.
    pub fn replace_all(&self, candidate: &serde_json::Value) -> Result<(), SessionError> {
        let mut pads = self.pads.lock();
        let mut engine = self.engine.lock();
        engine.replace_all(candidate)?;
        for (field, pad) in pads.iter_mut() {
            let stored = engine.document().field(field).and_then(FieldValue::as_text).unwrap_or_default();
            if stored != pad.export() {
                pad.clear();
            }
        }
        Ok(())
    }

    /// Ask the completion service to fill the form.
    ///
    /// # Errors
    ///
    /// - `SessionError::AutofillDisabled` when no service is configured.
    /// - `SessionError::Autofill` when the result is stale, the service
    ///   failed, or the candidate did not fit. The document is unchanged
    ///   in each case.
    pub async fn autofill(&self, domain_hint: Option<String>) -> Result<AutofillOutcome, SessionError> {
        let service = self.completion.as_ref().ok_or(SessionError::AutofillDisabled)?;
        let ticket = self.engine.lock().begin_autofill(domain_hint);
        let result = service.complete(ticket.request()).await;
        let outcome = self.engine.lock().finish_autofill(ticket, result)?;
        Ok(outcome)
    }

    /// Finalize the form and hand it to `sink`.
    ///
    /// # Errors
    ///
    /// `SessionError::Invalid` with the full report if the form does not
    /// validate; `SessionError::Sink` if the sink refused it.
    pub async fn submit<K: SubmissionSink + ?Sized>(&self, sink: &K) -> Result<SubmissionAck, SessionError> {
        let form = self.engine.lock().finalize().map_err(SessionError::Invalid)?;
        let ack = sink.submit(&self.context, &form).await?;
        Ok(ack)
    }
}

fn signature_value(pad: &SignaturePad) -> FieldValue {
    if pad.is_blank() {
        FieldValue::Empty
    } else {
        FieldValue::text(pad.export())
    }
}
