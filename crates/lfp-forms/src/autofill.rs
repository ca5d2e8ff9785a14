//! # Autofill Guard
//!
//! An autofill round trip is split in two so the engine never waits on the
//! network:
//!
//! 1. [`FormEngine::begin_autofill`] bumps the generation and returns an
//!    [`AutofillTicket`] carrying that generation and the request to send.
//! 2. The host sends the request however it likes.
//! 3. [`FormEngine::finish_autofill`] takes the ticket back with the
//!    transport result.
//!
//! A result is applied only if the ticket's generation is still the
//! engine's generation. Any edit, or any newer `begin_autofill`, moves the
//! generation on, so at most one in-flight result per document is ever
//! accepted and it is always the newest one. Applying a result moves the
//! generation too, so a ticket cannot be applied twice.
//!
//! ## Candidate merge
//!
//! The candidate is laid over the current document: keys it carries
//! replace current values, keys it omits are kept, and a group it carries
//! replaces that group's items wholesale. One bad key rejects the whole
//! candidate.

use lfp_core::{AutofillRequest, TransportError};
use serde_json::Value;

use crate::document::FormDocument;
use crate::engine::FormEngine;
use crate::error::{AutofillError, ReplaceError};

/// A pending autofill request bound to the generation it was issued at.
#[derive(Debug)]
pub struct AutofillTicket {
    generation: u64,
    request: AutofillRequest,
}

impl AutofillTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The request body to send to the completion service.
    pub fn request(&self) -> &AutofillRequest {
        &self.request
    }
}

/// An applied autofill result.
#[derive(Debug, Clone, PartialEq)]
pub struct AutofillOutcome {
    /// Generation after the candidate was installed.
    pub generation: u64,
    /// Top-level keys the candidate supplied, sorted.
    pub applied: Vec<String>,
}

impl FormEngine {
    /// Issue an autofill request. Invalidates every earlier ticket.
    pub fn begin_autofill(&mut self, domain_hint: Option<String>) -> AutofillTicket {
        self.bump();
        let snapshot = self.document().to_json();
        let pristine = FormDocument::defaults(self.schema()).to_json();
        let prior_state_json = (snapshot != pristine).then(|| snapshot.to_string());

        let request = AutofillRequest {
            simplified_schema: self.schema().description().to_string(),
            prior_state_json,
            domain_hint: domain_hint.filter(|h| !h.trim().is_empty()),
        };
        tracing::debug!(form = %self.id(), generation = self.generation(), "autofill requested");
        AutofillTicket {
            generation: self.generation(),
            request,
        }
    }

    /// Apply (or discard) the result of an autofill request.
    ///
    /// # Errors
    ///
    /// - `AutofillError::Stale` if the document moved on since the ticket
    ///   was issued.
    /// - `AutofillError::Transport` if the service produced no candidate.
    /// - `AutofillError::ContractViolation` if the candidate failed the
    ///   shape check, named an unknown or non-autofillable field, or held
    ///   an unconvertible value.
    ///
    /// The document is unchanged in every error case.
    pub fn finish_autofill(
        &mut self,
        ticket: AutofillTicket,
        result: Result<Value, TransportError>,
    ) -> Result<AutofillOutcome, AutofillError> {
        if ticket.generation != self.generation() {
            tracing::info!(
                form = %self.id(),
                ticket = ticket.generation,
                current = self.generation(),
                "discarding stale autofill result"
            );
            return Err(AutofillError::Stale {
                ticket: ticket.generation,
                current: self.generation(),
            });
        }

        let candidate = match result {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::warn!(form = %self.id(), error = %e, "autofill transport failed");
                return Err(e.into());
            }
        };

        let next = self
            .check_autofillable(&candidate)
            .and_then(|()| self.admit(self.document(), &candidate));
        let next = match next {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!(form = %self.id(), error = %e, "autofill candidate rejected");
                return Err(e.into());
            }
        };

        let mut applied: Vec<String> = candidate
            .as_object()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default();
        applied.sort();
        self.install(next);
        tracing::info!(
            form = %self.id(),
            generation = self.generation(),
            fields = applied.len(),
            "autofill applied"
        );
        Ok(AutofillOutcome {
            generation: self.generation(),
            applied,
        })
    }

    fn check_autofillable(&self, candidate: &Value) -> Result<(), ReplaceError> {
        let Some(map) = candidate.as_object() else {
            return Ok(());
        };
        for (key, value) in map {
            if let Some(spec) = self.schema().field(key) {
                if !spec.kind.autofillable() {
                    return Err(ReplaceError::NotAutofillable { field: key.clone() });
                }
            } else if let (Some(group), Some(rows)) = (self.schema().group(key), value.as_array()) {
                let blocked = rows
                    .iter()
                    .filter_map(Value::as_object)
                    .flat_map(|row| row.keys())
                    .find(|k| group.field_spec(k).is_some_and(|s| !s.kind.autofillable()));
                if let Some(field) = blocked {
                    return Err(ReplaceError::NotAutofillable {
                        field: format!("{key}.{field}"),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lfp_core::FieldValue;
    use lfp_schema::{FieldSpec, FormSchema, GroupSpec};
    use serde_json::json;

    fn engine() -> FormEngine {
        let schema = FormSchema::builder("pickup_sheet", "Pickup Sheet")
            .field(FieldSpec::text("driver"))
            .field(FieldSpec::number("totalMiles"))
            .field(FieldSpec::signature("driverSignature"))
            .group(
                GroupSpec::new("stops")
                    .field(FieldSpec::text("city"))
                    .field(FieldSpec::signature("receivedBy")),
            )
            .build()
            .unwrap();
        FormEngine::new(Arc::new(schema))
    }

    #[test]
    fn request_carries_description_and_only_nondefault_state() {
        let mut e = engine();
        let t = e.begin_autofill(Some("  ".into()));
        assert!(t.request().simplified_schema.contains("driver: string"));
        assert_eq!(t.request().prior_state_json, None);
        assert_eq!(t.request().domain_hint, None);

        e.set_field("driver", "Ana").unwrap();
        let t = e.begin_autofill(Some("two stops in Texas".into()));
        let prior: Value = serde_json::from_str(t.request().prior_state_json.as_deref().unwrap()).unwrap();
        assert_eq!(prior["driver"], "Ana");
        assert_eq!(t.request().domain_hint.as_deref(), Some("two stops in Texas"));
    }

    #[test]
    fn partial_candidate_merges_over_current_values() {
        let mut e = engine();
        e.set_field("driver", "Ana").unwrap();
        let t = e.begin_autofill(None);
        let outcome = e
            .finish_autofill(t, Ok(json!({ "totalMiles": 412 })))
            .unwrap();
        assert_eq!(outcome.applied, vec!["totalMiles".to_string()]);
        assert_eq!(outcome.generation, e.generation());
        assert_eq!(e.document().field("driver"), Some(&FieldValue::text("Ana")));
        assert_eq!(e.document().field("totalMiles"), Some(&FieldValue::Number(412.0)));
    }

    #[test]
    fn edit_after_request_makes_result_stale() {
        let mut e = engine();
        let t = e.begin_autofill(None);
        e.set_field("driver", "Ana").unwrap();
        let err = e
            .finish_autofill(t, Ok(json!({ "driver": "Bo" })))
            .unwrap_err();
        assert!(err.is_stale());
        assert_eq!(e.document().field("driver"), Some(&FieldValue::text("Ana")));
    }

    #[test]
    fn signature_fields_cannot_be_autofilled() {
        let mut e = engine();
        let before = e.document().clone();
        let t = e.begin_autofill(None);
        let err = e
            .finish_autofill(t, Ok(json!({ "driver": "Bo", "driverSignature": "data:," })))
            .unwrap_err();
        assert!(matches!(
            err,
            AutofillError::ContractViolation(ReplaceError::NotAutofillable { ref field }) if field == "driverSignature"
        ));

        let t = e.begin_autofill(None);
        let err = e
            .finish_autofill(t, Ok(json!({ "stops": [{ "city": "Waco", "receivedBy": "x" }] })))
            .unwrap_err();
        assert!(matches!(
            err,
            AutofillError::ContractViolation(ReplaceError::NotAutofillable { ref field }) if field == "stops.receivedBy"
        ));
        assert_eq!(e.document(), &before);
    }

    #[test]
    fn transport_failure_leaves_document_alone() {
        let mut e = engine();
        let before = e.document().to_json();
        let t = e.begin_autofill(None);
        let err = e
            .finish_autofill(
                t,
                Err(TransportError::Unreachable {
                    endpoint: "http://127.0.0.1:9/v1/autofill".into(),
                    reason: "connection refused".into(),
                }),
            )
            .unwrap_err();
        assert!(matches!(err, AutofillError::Transport(_)));
        assert_eq!(e.document().to_json(), before);
    }

    #[test]
    fn ticket_cannot_be_applied_after_a_newer_one() {
        let mut e = engine();
        let a = e.begin_autofill(None);
        let b = e.begin_autofill(None);
        assert!(b.generation() > a.generation());
        e.finish_autofill(b, Ok(json!({ "driver": "B" }))).unwrap();
        assert!(e.finish_autofill(a, Ok(json!({ "driver": "A" }))).unwrap_err().is_stale());
        assert_eq!(e.document().field("driver"), Some(&FieldValue::text("B")));
    }
}
