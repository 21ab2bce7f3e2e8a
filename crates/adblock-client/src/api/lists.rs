//! Gateway list endpoints.

use crate::GatewayClient;
use adblock_core::{CanonicalDomain, CreateListRequest, GatewayList, Result};
use tracing::instrument;

/// Gateway list endpoints
pub struct ListsApi<'a> {
    client: &'a GatewayClient,
}

impl<'a> ListsApi<'a> {
    pub(crate) const fn new(client: &'a GatewayClient) -> Self {
        Self { client }
    }

    /// All lists in the account
    pub async fn list(&self) -> Result<Vec<GatewayList>> {
        self.client.get("/lists").await
    }

    /// Lists whose name starts with `name_prefix`
    pub async fn list_prefixed(&self, name_prefix: &str) -> Result<Vec<GatewayList>> {
        let lists = self.list().await?;
        Ok(lists
            .into_iter()
            .filter(|l| l.name.starts_with(name_prefix))
            .collect())
    }

    /// Create a DOMAIN list
    #[instrument(skip(self, domains), fields(count = domains.len()))]
    pub async fn create(&self, name: &str, domains: &[CanonicalDomain]) -> Result<GatewayList> {
        let body = CreateListRequest::domains(name, domains);
        self.client.post("/lists", &body).await
    }

    /// Delete a list
    pub async fn delete(&self, list_id: &str) -> Result<()> {
        self.client.delete(&format!("/lists/{list_id}")).await
    }
}
