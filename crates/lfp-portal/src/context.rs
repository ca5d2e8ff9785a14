//! Host context: who is filling forms, and for which tenant.
//!
//! Passed explicitly to every session and sink call. There is no ambient
//! "current tenant" anywhere in the portal.

use lfp_core::{TenantId, UserId};
use serde::{Deserialize, Serialize};

use crate::config::PortalConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostContext {
    pub tenant: TenantId,
    pub user: UserId,
}

impl HostContext {
    pub fn new(tenant: TenantId, user: UserId) -> Self {
        Self { tenant, user }
    }

    pub fn from_config(config: &PortalConfig) -> Self {
        Self::new(config.tenant.clone(), config.user.clone())
    }
}

impl std::fmt::Display for HostContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.tenant, self.user)
    }
}
