//! The assembled portal: catalog, services, and host context.

use std::sync::Arc;

use lfp_autofill::{CompletionClient, CompletionService};
use lfp_core::FormType;
use lfp_schema::FormCatalog;

use crate::config::PortalConfig;
use crate::context::HostContext;
use crate::error::{PortalError, SessionError};
use crate::session::FormSession;
use crate::sink::{HttpSubmissionSink, SubmissionAck, SubmissionSink};

pub struct Portal {
    context: HostContext,
    catalog: FormCatalog,
    completion: Option<Arc<dyn CompletionService>>,
    sink: Arc<dyn SubmissionSink>,
}

impl std::fmt::Debug for Portal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Portal")
            .field("context", &self.context)
            .field("forms", &self.catalog.form_types())
            .field("autofill", &self.completion.is_some())
            .finish()
    }
}

impl Portal {
    pub fn new(
        context: HostContext,
        catalog: FormCatalog,
        completion: Option<Arc<dyn CompletionService>>,
        sink: Arc<dyn SubmissionSink>,
    ) -> Self {
        Self {
            context,
            catalog,
            completion,
            sink,
        }
    }

    /// Assemble the portal from configuration with the built-in catalog and
    /// the HTTP clients.
    ///
    /// # Errors
    ///
    /// Fails if the built-in catalog does not load or a client cannot be
    /// built.
    pub fn from_config(config: &PortalConfig) -> Result<Self, PortalError> {
        let catalog = FormCatalog::builtin()?;
        let completion: Option<Arc<dyn CompletionService>> = match &config.autofill {
            Some(autofill) => {
                let client = CompletionClient::new(autofill)?;
                tracing::info!(endpoint = %client.endpoint(), "autofill enabled");
                Some(Arc::new(client) as Arc<dyn CompletionService>)
            }
            None => {
                tracing::warn!("LFP_AUTOFILL_URL not set, autofill disabled");
                None
            }
        };
        let sink = HttpSubmissionSink::from_config(config)?;
        tracing::info!(
            host = %HostContext::from_config(config),
            forms = catalog.len(),
            submission_url = %config.submission_url,
            "portal ready"
        );
        Ok(Self::new(
            HostContext::from_config(config),
            catalog,
            completion,
            Arc::new(sink),
        ))
    }

    pub fn context(&self) -> &HostContext {
        &self.context
    }

    pub fn forms(&self) -> &FormCatalog {
        &self.catalog
    }

    pub fn autofill_enabled(&self) -> bool {
        self.completion.is_some()
    }

    /// Open a fresh session on a catalog form.
    pub fn open(&self, form_type: &str) -> Result<FormSession, PortalError> {
        let schema = FormType::new(form_type)
            .ok()
            .and_then(|ft| self.catalog.get(&ft))
            .ok_or_else(|| PortalError::UnknownFormType(form_type.to_string()))?;
        Ok(FormSession::new(self.context.clone(), schema, self.completion.clone()))
    }

    /// Submit through the portal's configured sink.
    pub async fn submit(&self, session: &FormSession) -> Result<SubmissionAck, SessionError> {
        session.submit(self.sink.as_ref()).await
    }
}
