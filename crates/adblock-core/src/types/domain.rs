use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

/// A validated, lower-case, punycode-encoded hostname with any leading
/// `www.` label removed.
///
/// Values are produced by the canonicalizer in `adblock-sync`; this type only
/// carries the result and does not re-validate it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalDomain(String);

impl CanonicalDomain {
    /// Wrap a string that is already known to be canonical
    #[must_use]
    pub fn new_unchecked(domain: impl Into<String>) -> Self {
        Self(domain.into())
    }

    /// The domain as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last two labels, a coarse stand-in for the registrable domain
    #[must_use]
    pub fn registrable(&self) -> &str {
        match self.0.rmatch_indices('.').nth(1) {
            Some((idx, _)) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Consume and return the inner string
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CanonicalDomain {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// An unordered, duplicate-free collection of canonical domains
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainSet {
    inner: HashSet<CanonicalDomain>,
}

impl DomainSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set with room for `capacity` domains
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: HashSet::with_capacity(capacity),
        }
    }

    /// Insert a domain, returning true if it was not present
    pub fn insert(&mut self, domain: CanonicalDomain) -> bool {
        self.inner.insert(domain)
    }

    /// Remove a domain, returning true if it was present
    pub fn remove(&mut self, domain: &str) -> bool {
        self.inner.remove(domain)
    }

    /// Exact-match membership test (not suffix aware)
    #[must_use]
    pub fn contains(&self, domain: &str) -> bool {
        self.inner.contains(domain)
    }

    /// Number of domains
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the set holds no domains
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = &CanonicalDomain> {
        self.inner.iter()
    }

    /// Move every domain of `other` into this set
    pub fn merge(&mut self, other: Self) {
        if self.inner.len() < other.inner.len() {
            let mut other = other;
            other.inner.extend(self.inner.drain());
            *self = other;
        } else {
            self.inner.extend(other.inner);
        }
    }

    /// Finalize into a lexicographically sorted vector
    #[must_use]
    pub fn into_sorted_vec(self) -> Vec<CanonicalDomain> {
        let mut list: Vec<_> = self.inner.into_iter().collect();
        list.sort_unstable();
        list
    }
}

impl FromIterator<CanonicalDomain> for DomainSet {
    fn from_iter<I: IntoIterator<Item = CanonicalDomain>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl Extend<CanonicalDomain> for DomainSet {
    fn extend<I: IntoIterator<Item = CanonicalDomain>>(&mut self, iter: I) {
        self.inner.extend(iter);
    }
}

impl IntoIterator for DomainSet {
    type Item = CanonicalDomain;
    type IntoIter = std::collections::hash_set::IntoIter<CanonicalDomain>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registrable() {
        let d = CanonicalDomain::new_unchecked("a.b.example.com");
        assert_eq!(d.registrable(), "example.com");

        let d = CanonicalDomain::new_unchecked("example.com");
        assert_eq!(d.registrable(), "example.com");
    }

    #[test]
    fn test_set_merge_and_sort() {
        let mut a: DomainSet = ["b.com", "a.com"]
            .into_iter()
            .map(CanonicalDomain::new_unchecked)
            .collect();
        let b: DomainSet = ["c.com", "a.com", "d.com"]
            .into_iter()
            .map(CanonicalDomain::new_unchecked)
            .collect();
        a.merge(b);

        let sorted: Vec<_> = a.into_sorted_vec().into_iter().map(CanonicalDomain::into_string).collect();
        assert_eq!(sorted, ["a.com", "b.com", "c.com", "d.com"]);
    }

    #[test]
    fn test_contains_by_str() {
        let mut set = DomainSet::new();
        set.insert(CanonicalDomain::new_unchecked("ads.example.com"));
        assert!(set.contains("ads.example.com"));
        assert!(!set.contains("example.com"));
        assert!(set.remove("ads.example.com"));
        assert!(set.is_empty());
    }
}
