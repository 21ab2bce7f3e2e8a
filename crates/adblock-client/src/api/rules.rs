//! Gateway rule (policy) endpoints.

use crate::GatewayClient;
use adblock_core::{CreateRuleRequest, GatewayRule, Result, UpdateRuleRequest};

/// Gateway rule endpoints
pub struct RulesApi<'a> {
    client: &'a GatewayClient,
}

impl<'a> RulesApi<'a> {
    pub(crate) const fn new(client: &'a GatewayClient) -> Self {
        Self { client }
    }

    /// All rules in the account
    pub async fn list(&self) -> Result<Vec<GatewayRule>> {
        self.client.get("/rules").await
    }

    /// Rules whose name starts with `name_prefix`
    pub async fn list_prefixed(&self, name_prefix: &str) -> Result<Vec<GatewayRule>> {
        let rules = self.list().await?;
        Ok(rules
            .into_iter()
            .filter(|r| r.name.starts_with(name_prefix))
            .collect())
    }

    /// Create a rule
    pub async fn create(&self, request: &CreateRuleRequest) -> Result<GatewayRule> {
        self.client.post("/rules", request).await
    }

    /// Replace the mutable fields of a rule
    pub async fn update(&self, rule_id: &str, request: &UpdateRuleRequest) -> Result<GatewayRule> {
        self.client.put(&format!("/rules/{rule_id}"), request).await
    }

    /// Delete a rule
    pub async fn delete(&self, rule_id: &str) -> Result<()> {
        self.client.delete(&format!("/rules/{rule_id}")).await
    }
}
