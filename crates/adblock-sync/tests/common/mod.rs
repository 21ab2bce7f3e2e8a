//! In-memory gateway used by the reconciliation tests.

#![allow(dead_code)]

use adblock_core::{
    traffic_expression, AdblockError, CanonicalDomain, GatewayApi, GatewayList, GatewayRule,
    Result, RuleAction,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListLists,
    CreateList(String, usize),
    DeleteList(String),
    ListPolicies,
    CreatePolicy(Vec<String>),
    UpdatePolicy(String, Vec<String>),
    DeletePolicy(String),
}

impl Call {
    pub const fn is_mutation(&self) -> bool {
        !matches!(self, Self::ListLists | Self::ListPolicies)
    }
}

#[derive(Default)]
pub struct FakeGateway {
    pub lists: Mutex<Vec<GatewayList>>,
    pub policies: Mutex<Vec<GatewayRule>>,
    pub calls: Mutex<Vec<Call>>,
    /// Chunk names whose creation returns a list without an id
    pub fail_create: Mutex<HashSet<String>>,
    pub fail_policy_create: Mutex<bool>,
    /// Refuse list deletion while any policy exists
    pub lists_in_use: Mutex<bool>,
    next_id: AtomicUsize,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(self, name: &str, count: u64) -> Self {
        let id = self.fresh_id("list");
        self.lists.lock().unwrap().push(GatewayList {
            id,
            name: name.to_string(),
            count,
            ..GatewayList::default()
        });
        self
    }

    pub fn with_policy(self, name: &str) -> Self {
        let id = self.fresh_id("rule");
        self.policies.lock().unwrap().push(GatewayRule {
            id,
            name: name.to_string(),
            action: RuleAction::Block,
            enabled: true,
            ..GatewayRule::default()
        });
        self
    }

    pub fn failing_create(self, name: &str) -> Self {
        self.fail_create.lock().unwrap().insert(name.to_string());
        self
    }

    pub fn guarding_referenced_lists(self) -> Self {
        *self.lists_in_use.lock().unwrap() = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .lists
            .lock()
            .unwrap()
            .iter()
            .map(|l| l.name.clone())
            .collect();
        names.sort();
        names
    }

    fn fresh_id(&self, kind: &str) -> String {
        format!("{kind}-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl GatewayApi for FakeGateway {
    async fn list_lists(&self, name_prefix: &str) -> Result<Vec<GatewayList>> {
        self.record(Call::ListLists);
        Ok(self
            .lists
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.name.starts_with(name_prefix))
            .cloned()
            .collect())
    }

    async fn create_list(&self, name: &str, domains: &[CanonicalDomain]) -> Result<GatewayList> {
        self.record(Call::CreateList(name.to_string(), domains.len()));
        if self.fail_create.lock().unwrap().contains(name) {
            return Ok(GatewayList::default());
        }
        let list = GatewayList {
            id: self.fresh_id("list"),
            name: name.to_string(),
            count: domains.len() as u64,
            ..GatewayList::default()
        };
        self.lists.lock().unwrap().push(list.clone());
        Ok(list)
    }

    async fn delete_list(&self, id: &str) -> Result<()> {
        self.record(Call::DeleteList(id.to_string()));
        if *self.lists_in_use.lock().unwrap() && !self.policies.lock().unwrap().is_empty() {
            return Err(AdblockError::Api {
                code: 400,
                message: "list in use".into(),
            });
        }
        let mut lists = self.lists.lock().unwrap();
        let before = lists.len();
        lists.retain(|l| l.id != id);
        if lists.len() == before {
            return Err(AdblockError::NotFound {
                resource: id.to_string(),
            });
        }
        Ok(())
    }

    async fn list_policies(&self, name_prefix: &str) -> Result<Vec<GatewayRule>> {
        self.record(Call::ListPolicies);
        Ok(self
            .policies
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.name.starts_with(name_prefix))
            .cloned()
            .collect())
    }

    async fn create_policy(&self, name: &str, list_ids: &[String]) -> Result<GatewayRule> {
        self.record(Call::CreatePolicy(list_ids.to_vec()));
        if *self.fail_policy_create.lock().unwrap() {
            return Err(AdblockError::Api {
                code: 500,
                message: "internal".into(),
            });
        }
        let rule = GatewayRule {
            id: self.fresh_id("rule"),
            name: name.to_string(),
            action: RuleAction::Block,
            enabled: true,
            traffic: traffic_expression(list_ids),
            ..GatewayRule::default()
        };
        self.policies.lock().unwrap().push(rule.clone());
        Ok(rule)
    }

    async fn update_policy(
        &self,
        id: &str,
        _name: &str,
        list_ids: &[String],
    ) -> Result<GatewayRule> {
        self.record(Call::UpdatePolicy(id.to_string(), list_ids.to_vec()));
        let mut policies = self.policies.lock().unwrap();
        let rule = policies
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AdblockError::NotFound {
                resource: id.to_string(),
            })?;
        rule.traffic = traffic_expression(list_ids);
        Ok(rule.clone())
    }

    async fn delete_policy(&self, id: &str) -> Result<()> {
        self.record(Call::DeletePolicy(id.to_string()));
        tokio::task::yield_now().await;
        self.policies.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }
}

pub fn domains(n: usize) -> Vec<CanonicalDomain> {
    let mut out: Vec<_> = (0..n)
        .map(|i| CanonicalDomain::new_unchecked(format!("d{i:06}.example.com")))
        .collect();
    out.sort();
    out
}
