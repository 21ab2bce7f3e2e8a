//! Collapsing a domain set to a smaller set with the same blocking coverage.
//!
//! Domains are grouped by their last two labels. A group collapses to its
//! bare two-label domain only when that domain, or its `www.` form, is itself
//! present; otherwise every member is kept. Deeper chains are never collapsed
//! into an intermediate label, so `a.b.example.com` survives next to
//! `b.example.com` unless `example.com` is present too.

use adblock_core::{CanonicalDomain, DomainSet};
use std::collections::HashMap;

/// Reduce `domains` to a minimal covering subset
#[must_use]
pub fn reduce(domains: &DomainSet) -> DomainSet {
    let mut groups: HashMap<&str, Vec<&CanonicalDomain>> = HashMap::new();
    for domain in domains.iter() {
        groups.entry(domain.registrable()).or_default().push(domain);
    }

    let mut reduced = DomainSet::with_capacity(groups.len());
    for (registrable, members) in groups {
        if covers_group(registrable, &members) {
            reduced.insert(CanonicalDomain::new_unchecked(registrable));
        } else {
            reduced.extend(members.into_iter().cloned());
        }
    }
    reduced
}

/// True when the bare registrable domain or its `www.` form is a member
fn covers_group(registrable: &str, members: &[&CanonicalDomain]) -> bool {
    members.iter().any(|d| {
        let d = d.as_str();
        // canonicalize already strips `www.`; the second arm serves callers that bypass it
        d == registrable || d.strip_prefix("www.") == Some(registrable)
    })
}
