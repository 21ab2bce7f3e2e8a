//! The remote policy service as seen by the reconciler.

use async_trait::async_trait;
use std::sync::Arc;

use crate::{CanonicalDomain, GatewayList, GatewayRule, Result};

/// Operations the reconciler needs from the remote gateway.
///
/// Implemented over HTTP by `adblock_client::GatewayClient`; tests provide
/// in-memory implementations.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// Lists whose name starts with `name_prefix`
    async fn list_lists(&self, name_prefix: &str) -> Result<Vec<GatewayList>>;

    /// Create a DOMAIN list holding `domains`
    async fn create_list(&self, name: &str, domains: &[CanonicalDomain]) -> Result<GatewayList>;

    /// Delete a list by id
    async fn delete_list(&self, id: &str) -> Result<()>;

    /// Rules whose name starts with `name_prefix`
    async fn list_policies(&self, name_prefix: &str) -> Result<Vec<GatewayRule>>;

    /// Create a block rule over `list_ids`
    async fn create_policy(&self, name: &str, list_ids: &[String]) -> Result<GatewayRule>;

    /// Point an existing rule at `list_ids`
    async fn update_policy(&self, id: &str, name: &str, list_ids: &[String])
        -> Result<GatewayRule>;

    /// Delete a rule by id
    async fn delete_policy(&self, id: &str) -> Result<()>;
}

#[async_trait]
impl<T: GatewayApi + ?Sized> GatewayApi for Arc<T> {
    async fn list_lists(&self, name_prefix: &str) -> Result<Vec<GatewayList>> {
        (**self).list_lists(name_prefix).await
    }

    async fn create_list(&self, name: &str, domains: &[CanonicalDomain]) -> Result<GatewayList> {
        (**self).create_list(name, domains).await
    }

    async fn delete_list(&self, id: &str) -> Result<()> {
        (**self).delete_list(id).await
    }

    async fn list_policies(&self, name_prefix: &str) -> Result<Vec<GatewayRule>> {
        (**self).list_policies(name_prefix).await
    }

    async fn create_policy(&self, name: &str, list_ids: &[String]) -> Result<GatewayRule> {
        (**self).create_policy(name, list_ids).await
    }

    async fn update_policy(
        &self,
        id: &str,
        name: &str,
        list_ids: &[String],
    ) -> Result<GatewayRule> {
        (**self).update_policy(id, name, list_ids).await
    }

    async fn delete_policy(&self, id: &str) -> Result<()> {
        (**self).delete_policy(id).await
    }
}
