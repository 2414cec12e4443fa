//! Policy vault: read access for students, CRUD for admins.

use crate::error::{ApiError, ApiResult};
use crate::chat::RiskLevel;
use core_auth::AuthGateway;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

const POLICIES_PATH: &str = "/api/policies";
const ADMIN_POLICIES_PATH: &str = "/api/admin/policies";

fn admin_policy_path(vault_id: &str) -> String {
    format!("{}/{}", ADMIN_POLICIES_PATH, vault_id)
}

/// One vault entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub vault_id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub risk_category: RiskLevel,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub source_link: Option<String>,
}

impl Policy {
    fn validate(&self) -> ApiResult<()> {
        if self.vault_id.trim().is_empty() || self.title.trim().is_empty() {
            return Err(ApiError::Validation(
                "Vault ID and title are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Split a comma-separated tag field into trimmed, non-empty tags.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
pub struct PolicyApi {
    gateway: Arc<AuthGateway>,
}

impl PolicyApi {
    pub fn new(gateway: Arc<AuthGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> ApiResult<Vec<Policy>> {
        Ok(self.gateway.get_json(POLICIES_PATH).await?)
    }

    /// Admin listing; non-admins get a 403 as [`ApiError::Request`].
    pub async fn admin_list(&self) -> ApiResult<Vec<Policy>> {
        Ok(self.gateway.get_json(ADMIN_POLICIES_PATH).await?)
    }

    #[instrument(skip_all, fields(vault_id = %policy.vault_id))]
    pub async fn create(&self, policy: &Policy) -> ApiResult<()> {
        policy.validate()?;
        let _: serde_json::Value = self.gateway.post_json(ADMIN_POLICIES_PATH, policy).await?;
        info!("Policy created");
        Ok(())
    }

    #[instrument(skip_all, fields(vault_id = %policy.vault_id))]
    pub async fn update(&self, policy: &Policy) -> ApiResult<()> {
        policy.validate()?;
        let _: serde_json::Value = self
            .gateway
            .put_json(&admin_policy_path(&policy.vault_id), policy)
            .await?;
        info!("Policy updated");
        Ok(())
    }

    pub async fn delete(&self, vault_id: &str) -> ApiResult<()> {
        self.gateway.delete(&admin_policy_path(vault_id)).await?;
        info!(vault_id, "Policy deleted");
        Ok(())
    }
}
