//! [`GatewayApi`] over HTTP.

use async_trait::async_trait;
use adblock_core::{
    CanonicalDomain, CreateRuleRequest, GatewayApi, GatewayList, GatewayRule, Result,
    UpdateRuleRequest,
};

use crate::GatewayClient;

#[async_trait]
impl GatewayApi for GatewayClient {
    async fn list_lists(&self, name_prefix: &str) -> Result<Vec<GatewayList>> {
        self.lists().list_prefixed(name_prefix).await
    }

    async fn create_list(&self, name: &str, domains: &[CanonicalDomain]) -> Result<GatewayList> {
        self.lists().create(name, domains).await
    }

    async fn delete_list(&self, id: &str) -> Result<()> {
        self.lists().delete(id).await
    }

    async fn list_policies(&self, name_prefix: &str) -> Result<Vec<GatewayRule>> {
        self.rules().list_prefixed(name_prefix).await
    }

    async fn create_policy(&self, name: &str, list_ids: &[String]) -> Result<GatewayRule> {
        self.rules()
            .create(&CreateRuleRequest::block(name, list_ids))
            .await
    }

    async fn update_policy(
        &self,
        id: &str,
        name: &str,
        list_ids: &[String],
    ) -> Result<GatewayRule> {
        self.rules()
            .update(id, &UpdateRuleRequest::block(name, list_ids))
            .await
    }

    async fn delete_policy(&self, id: &str) -> Result<()> {
        self.rules().delete(id).await
    }
}
