//! Driving the remote gateway to the desired blocklist.
//!
//! One attempt runs `Compare → Delete → Create → Finalize`. Deletions of
//! stale state complete before any creation starts, and every chunk creation
//! completes before the policy is written. A failed chunk rolls back every
//! chunk that was created in the same attempt; retrying is left to the
//! [`Controller`](crate::Controller).

use adblock_core::{AdblockError, CanonicalDomain, GatewayApi, GatewayList, GatewayRule, Result};
use futures_util::future::join_all;
use tracing::{error, info, instrument, warn};

/// Domains per remote list
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Largest desired set that will be pushed to the gateway
pub const DEFAULT_MAX_DOMAINS: usize = 300_000;

/// Names of the remote objects owned by this tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncNames {
    /// Prefix shared by every managed list, e.g. `[AdBlock-DNS Block List]`
    pub list_prefix: String,
    /// Name of the managed policy
    pub policy_name: String,
}

impl SyncNames {
    /// Derive the managed names from a list name
    #[must_use]
    pub fn new(list_name: &str) -> Self {
        let list_prefix = format!("[{list_name}]");
        let policy_name = format!("{list_prefix} Block Ads");
        Self {
            list_prefix,
            policy_name,
        }
    }

    /// Name of the 1-based `index`th chunk list
    #[must_use]
    pub fn chunk_name(&self, index: usize) -> String {
        format!("{} {index}", self.list_prefix)
    }
}

/// Limits applied to one reconciliation
#[derive(Debug, Clone, Copy)]
pub struct ReconcileConfig {
    /// Domains per remote list
    pub chunk_size: usize,
    /// Desired sets larger than this abort before any remote mutation
    pub max_domains: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_domains: DEFAULT_MAX_DOMAINS,
        }
    }
}

/// What to do with the managed policy after the lists are replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyAction {
    /// Create a new policy over the new lists
    Create,
    /// Rewrite the traffic expression of an existing policy
    Update {
        /// Id of the policy to update
        id: String,
    },
    /// Leave the policy untouched
    Skip,
}

/// The mutations one attempt will perform
#[derive(Debug, Clone)]
pub struct SyncPlan<'a> {
    /// Sum of the item counts of the managed lists found remotely
    pub remote_count: u64,
    /// Managed lists to delete
    pub lists_to_delete: Vec<GatewayList>,
    /// Managed policy to delete before the lists
    pub policy_to_delete: Option<GatewayRule>,
    /// Domain slices, one remote list each, in chunk order
    pub chunks: Vec<&'a [CanonicalDomain]>,
    /// Policy handling after creation
    pub policy_action: PolicyAction,
}

impl SyncPlan<'_> {
    /// Returns true if the remote state already matches
    #[must_use]
    pub fn is_skip(&self) -> bool {
        self.lists_to_delete.is_empty()
            && self.policy_to_delete.is_none()
            && self.chunks.is_empty()
            && self.policy_action == PolicyAction::Skip
    }
}

/// Result of a successful attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Remote item count already matched; nothing was changed
    Skipped {
        /// Remote item count
        remote_count: u64,
    },
    /// The remote state was replaced
    Synced {
        /// Stale lists removed
        lists_deleted: usize,
        /// Ids of the lists created, in chunk order
        lists_created: Vec<String>,
        /// Id of the policy now pointing at the new lists
        policy_id: Option<String>,
    },
}

/// Managed objects currently present on the gateway
#[derive(Debug, Clone, Default)]
pub struct RemoteState {
    /// Lists carrying the managed prefix
    pub lists: Vec<GatewayList>,
    /// Policies carrying the managed policy name
    pub policies: Vec<GatewayRule>,
}

impl RemoteState {
    /// Sum of the list item counts
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lists.iter().map(|l| l.count).sum()
    }
}

/// What a teardown removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Teardown {
    /// Policies deleted
    pub policies: usize,
    /// Lists deleted
    pub lists: usize,
}

/// Reconciles the remote gateway with a desired domain sequence
#[derive(Debug, Clone)]
pub struct Reconciler<G> {
    gateway: G,
    names: SyncNames,
    config: ReconcileConfig,
}

impl<G: GatewayApi> Reconciler<G> {
    /// Create a reconciler over `gateway`
    pub const fn new(gateway: G, names: SyncNames, config: ReconcileConfig) -> Self {
        Self {
            gateway,
            names,
            config,
        }
    }

    /// Managed object names
    pub const fn names(&self) -> &SyncNames {
        &self.names
    }

    /// Read the managed lists and policies
    pub async fn remote_state(&self) -> Result<RemoteState> {
        let lists = self.gateway.list_lists(&self.names.list_prefix).await?;
        let policies = self.gateway.list_policies(&self.names.policy_name).await?;
        Ok(RemoteState { lists, policies })
    }

    /// Compare `desired` with the remote state and decide what to change.
    ///
    /// Performs no remote mutation.
    #[instrument(skip_all, fields(desired = desired.len()))]
    pub async fn plan<'a>(&self, desired: &'a [CanonicalDomain]) -> Result<SyncPlan<'a>> {
        if desired.len() > self.config.max_domains {
            return Err(AdblockError::CeilingExceeded {
                size: desired.len(),
                limit: self.config.max_domains,
            });
        }

        let lists = self.gateway.list_lists(&self.names.list_prefix).await?;
        let remote_count: u64 = lists.iter().map(|l| l.count).sum();
        info!(lists = lists.len(), remote_count, "Read managed lists");

        if remote_count == desired.len() as u64 {
            info!("Lists are the same size, skipping");
            return Ok(SyncPlan {
                remote_count,
                lists_to_delete: Vec::new(),
                policy_to_delete: None,
                chunks: Vec::new(),
                policy_action: PolicyAction::Skip,
            });
        }

        let mut policies = self.gateway.list_policies(&self.names.policy_name).await?;
        if policies.len() > 1 {
            error!(found = policies.len(), "More than one managed policy found");
            return Err(AdblockError::ConsistencyViolation {
                prefix: self.names.policy_name.clone(),
                found: policies.len(),
            });
        }
        let existing = policies.pop();

        let chunks: Vec<_> = desired.chunks(self.config.chunk_size.max(1)).collect();
        // An orphaned policy (no managed lists left) is rewritten in place.
        let (policy_to_delete, policy_action) = if chunks.is_empty() {
            (existing, PolicyAction::Skip)
        } else {
            match existing {
                Some(policy) if lists.is_empty() => (None, PolicyAction::Update { id: policy.id }),
                other => (other, PolicyAction::Create),
            }
        };

        Ok(SyncPlan {
            remote_count,
            lists_to_delete: lists,
            policy_to_delete,
            chunks,
            policy_action,
        })
    }

    /// Run one full attempt: plan, then execute
    pub async fn reconcile(&self, desired: &[CanonicalDomain]) -> Result<Outcome> {
        let plan = self.plan(desired).await?;
        self.execute(plan).await
    }

    /// Apply a plan produced by [`Self::plan`]
    pub async fn execute(&self, plan: SyncPlan<'_>) -> Result<Outcome> {
        if plan.is_skip() {
            return Ok(Outcome::Skipped {
                remote_count: plan.remote_count,
            });
        }

        let lists_deleted = self
            .delete_stale(plan.policy_to_delete.as_ref(), &plan.lists_to_delete)
            .await?;
        let created = self.create_chunks(&plan.chunks).await?;
        let ids: Vec<String> = created.iter().map(|l| l.id.clone()).collect();

        let finalized = match &plan.policy_action {
            PolicyAction::Create => {
                info!("Creating firewall policy");
                self.gateway
                    .create_policy(&self.names.policy_name, &ids)
                    .await
                    .map(|p| Some(p.id))
            }
            PolicyAction::Update { id } => {
                info!(id = %id, "Updating firewall policy");
                self.gateway
                    .update_policy(id, &self.names.policy_name, &ids)
                    .await
                    .map(|p| Some(p.id))
            }
            PolicyAction::Skip => Ok(None),
        };

        match finalized {
            Ok(policy_id) => {
                info!(lists = ids.len(), "Done");
                Ok(Outcome::Synced {
                    lists_deleted,
                    lists_created: ids,
                    policy_id,
                })
            }
            Err(e) => {
                error!(error = %e, "Policy write failed, removing the new lists");
                self.rollback(&created).await;
                Err(e)
            }
        }
    }

    /// Delete the managed policy and lists regardless of the desired state
    pub async fn teardown(&self) -> Result<Teardown> {
        let state = self.remote_state().await?;
        for policy in &state.policies {
            info!(name = %policy.name, id = %policy.id, "Deleting policy");
            self.gateway.delete_policy(&policy.id).await?;
        }
        let results = join_all(state.lists.iter().map(|l| self.delete_list(l))).await;
        results.into_iter().collect::<Result<Vec<_>>>()?;
        Ok(Teardown {
            policies: state.policies.len(),
            lists: state.lists.len(),
        })
    }

    /// Delete the stale policy, then the stale lists it referenced, returning the number of lists deleted
    async fn delete_stale(
        &self,
        policy: Option<&GatewayRule>,
        lists: &[GatewayList],
    ) -> Result<usize> {
        // Lists referenced by a rule cannot be deleted
        if let Some(p) = policy {
            info!(name = %p.name, id = %p.id, "Deleting gateway policy");
            self.gateway.delete_policy(&p.id).await?;
        }

        let results = join_all(lists.iter().map(|l| self.delete_list(l))).await;
        results.into_iter().collect::<Result<Vec<_>>>()?;
        Ok(lists.len())
    }

    async fn delete_list(&self, list: &GatewayList) -> Result<()> {
        info!(name = %list.name, id = %list.id, "Deleting list");
        self.gateway.delete_list(&list.id).await.map_err(|e| {
            warn!(name = %list.name, id = %list.id, error = %e, "Failed to delete list");
            e
        })
    }

    /// Create one list per chunk; on any failure remove the ones that succeeded
    async fn create_chunks(&self, chunks: &[&[CanonicalDomain]]) -> Result<Vec<GatewayList>> {
        let creations = chunks.iter().enumerate().map(|(i, chunk)| {
            let name = self.names.chunk_name(i + 1);
            async move {
                info!(name = %name, count = chunk.len(), "Creating list");
                match self.gateway.create_list(&name, chunk).await {
                    Ok(list) if list.has_id() => Some(list),
                    Ok(_) => {
                        warn!(name = %name, "List created without an id");
                        None
                    }
                    Err(e) => {
                        warn!(name = %name, error = %e, "Failed to create list");
                        None
                    }
                }
            }
        });
        let results = join_all(creations).await;

        let failed = results.iter().filter(|r| r.is_none()).count();
        let created: Vec<GatewayList> = results.into_iter().flatten().collect();
        if failed == 0 {
            return Ok(created);
        }

        error!(failed, created = created.len(), "One or more lists failed to create");
        let rolled_back = self.rollback(&created).await;
        Err(AdblockError::PartialCreate {
            failed,
            created: created.len(),
            rolled_back,
        })
    }

    /// Delete lists created during this attempt, returning how many were removed
    async fn rollback(&self, created: &[GatewayList]) -> usize {
        let results = join_all(created.iter().map(|l| {
            info!(name = %l.name, id = %l.id, "Cleaning up created list");
            self.delete_list(l)
        }))
        .await;
        results.iter().filter(|r| r.is_ok()).count()
    }
}
