use serde::{Deserialize, Serialize};

use crate::CanonicalDomain;

/// Description attached to every list and rule this tool creates
pub const CREATED_BY: &str = "Created by script.";

/// Precedence given to the managed block rule
pub const DEFAULT_PRECEDENCE: i64 = 5000;

/// A Zero Trust Gateway list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayList {
    /// List identifier (empty if the service did not return one)
    #[serde(default)]
    pub id: String,

    /// List name
    #[serde(default)]
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,

    /// List type (DOMAIN, IP, URL, ...)
    #[serde(default, rename = "type")]
    pub list_type: Option<String>,

    /// Number of items in the list
    #[serde(default)]
    pub count: u64,

    /// Items, only present when the service includes them
    #[serde(default)]
    pub items: Vec<ListItem>,

    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<String>,

    /// Last update timestamp
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl GatewayList {
    /// Returns true if the service assigned this list an identifier
    #[must_use]
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}

/// A single entry of a gateway list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// The domain (or other value) stored in the list
    pub value: String,

    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<&CanonicalDomain> for ListItem {
    fn from(domain: &CanonicalDomain) -> Self {
        Self {
            value: domain.as_str().to_string(),
            created_at: None,
        }
    }
}

/// Action taken by a gateway rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    /// Allow matching traffic
    Allow,
    /// Block matching traffic
    Block,
    /// Any action this tool does not manage
    #[serde(other)]
    Other,
}

impl Default for RuleAction {
    fn default() -> Self {
        Self::Other
    }
}

impl std::fmt::Display for RuleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Block => write!(f, "block"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A Zero Trust Gateway rule (the "policy")
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayRule {
    /// Rule identifier
    #[serde(default)]
    pub id: String,

    /// Rule name
    #[serde(default)]
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,

    /// Action applied to matching traffic
    #[serde(default)]
    pub action: RuleAction,

    /// Whether the rule is active
    #[serde(default)]
    pub enabled: bool,

    /// Traffic filters (dns, http, l4)
    #[serde(default)]
    pub filters: Vec<String>,

    /// Wirefilter traffic expression
    #[serde(default)]
    pub traffic: String,

    /// Evaluation order
    #[serde(default)]
    pub precedence: Option<i64>,
}

impl GatewayRule {
    /// List identifiers referenced by the traffic expression
    #[must_use]
    pub fn referenced_lists(&self) -> Vec<&str> {
        self.traffic
            .split('$')
            .skip(1)
            .filter_map(|rest| {
                let end = rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
                    .unwrap_or(rest.len());
                (end > 0).then(|| &rest[..end])
            })
            .collect()
    }
}

/// Build the traffic expression matching any DNS query for a domain in any of `list_ids`
#[must_use]
pub fn traffic_expression(list_ids: &[String]) -> String {
    list_ids
        .iter()
        .map(|id| format!("any(dns.domains[*] in ${id})"))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Body of a list creation request
#[derive(Debug, Clone, Serialize)]
pub struct CreateListRequest {
    /// List name
    pub name: String,
    /// Description
    pub description: String,
    /// List type
    #[serde(rename = "type")]
    pub list_type: String,
    /// Items
    pub items: Vec<ListItem>,
}

impl CreateListRequest {
    /// A DOMAIN list holding `domains`
    #[must_use]
    pub fn domains(name: impl Into<String>, domains: &[CanonicalDomain]) -> Self {
        Self {
            name: name.into(),
            description: CREATED_BY.to_string(),
            list_type: "DOMAIN".to_string(),
            items: domains.iter().map(ListItem::from).collect(),
        }
    }
}

/// Rule settings sent with a new rule
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSettings {
    /// Show the Cloudflare block page instead of an NXDOMAIN-style answer
    pub block_page_enabled: bool,
}

/// Body of a rule creation request
#[derive(Debug, Clone, Serialize)]
pub struct CreateRuleRequest {
    /// Rule name
    pub name: String,
    /// Description
    pub description: String,
    /// Action
    pub action: RuleAction,
    /// Whether the rule is active
    pub enabled: bool,
    /// Traffic filters
    pub filters: Vec<String>,
    /// Traffic expression
    pub traffic: String,
    /// Rule settings
    pub rule_settings: RuleSettings,
    /// Evaluation order
    pub precedence: i64,
}

impl CreateRuleRequest {
    /// An enabled DNS block rule over `list_ids`
    #[must_use]
    pub fn block(name: impl Into<String>, list_ids: &[String]) -> Self {
        Self {
            name: name.into(),
            description: CREATED_BY.to_string(),
            action: RuleAction::Block,
            enabled: true,
            filters: vec!["dns".to_string()],
            traffic: traffic_expression(list_ids),
            rule_settings: RuleSettings::default(),
            precedence: DEFAULT_PRECEDENCE,
        }
    }
}

/// Body of a rule update request
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRuleRequest {
    /// Rule name
    pub name: String,
    /// Action
    pub action: RuleAction,
    /// Whether the rule is active
    pub enabled: bool,
    /// Traffic filters
    pub filters: Vec<String>,
    /// Traffic expression
    pub traffic: String,
}

impl UpdateRuleRequest {
    /// Point an existing block rule at `list_ids`
    #[must_use]
    pub fn block(name: impl Into<String>, list_ids: &[String]) -> Self {
        Self {
            name: name.into(),
            action: RuleAction::Block,
            enabled: true,
            filters: vec!["dns".to_string()],
            traffic: traffic_expression(list_ids),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traffic_expression() {
        let ids = vec!["aaa-1".to_string(), "bbb-2".to_string()];
        assert_eq!(
            traffic_expression(&ids),
            "any(dns.domains[*] in $aaa-1) or any(dns.domains[*] in $bbb-2)"
        );
    }

    #[test]
    fn test_referenced_lists() {
        let rule = GatewayRule {
            traffic: traffic_expression(&["aaa-1".to_string(), "bbb-2".to_string()]),
            ..GatewayRule::default()
        };
        assert_eq!(rule.referenced_lists(), vec!["aaa-1", "bbb-2"]);
    }

    #[test]
    fn test_rule_deserialize_unknown_action() {
        let rule: GatewayRule =
            serde_json::from_str(r#"{"id":"r1","name":"x","action":"isolate","enabled":true}"#)
                .unwrap();
        assert_eq!(rule.action, RuleAction::Other);
        assert!(rule.enabled);
    }

    #[test]
    fn test_create_list_request_shape() {
        let domains = vec![CanonicalDomain::new_unchecked("ads.example.com")];
        let body = serde_json::to_value(CreateListRequest::domains("[x] 1", &domains)).unwrap();
        assert_eq!(body["type"], "DOMAIN");
        assert_eq!(body["items"][0]["value"], "ads.example.com");
        assert!(body["items"][0].get("created_at").is_none());
    }
}
