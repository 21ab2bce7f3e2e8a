//! Turning raw adblock / hosts-file lines into canonical domains.

use adblock_core::CanonicalDomain;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Leading hosts-file address or adblock list marker
static PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[0-9.]+|[0-9a-fA-F:.]+)\s+|^(?:\|\||@@\|\|?|\*\.|\*)")
        .expect("valid prefix regex")
});

/// Alphanumeric labels with internal hyphens, at least two of them
static HOSTNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)+$")
        .expect("valid hostname regex")
});

static IPV4_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").expect("valid ipv4 regex"));

/// Hosts-file boilerplate that is never worth blocking
const RESERVED: &[&str] = &[
    "localhost",
    "localhost.localdomain",
    "local",
    "broadcasthost",
    "ip6-localhost",
    "ip6-loopback",
];

const MAX_DOMAIN_LEN: usize = 253;

/// Why a line did not yield a domain
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// Blank after trimming
    #[error("empty line")]
    Empty,
    /// Comment or regex rule
    #[error("comment or regex rule")]
    Comment,
    /// IDNA conversion failed
    #[error("not encodable as a hostname")]
    Encoding,
    /// Failed the hostname grammar
    #[error("invalid hostname")]
    Grammar,
    /// Dotted-quad address
    #[error("IP address literal")]
    IpLiteral,
    /// Local hostname such as `localhost`
    #[error("reserved hostname")]
    Reserved,
}

/// Per-reason rejection counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RejectionStats {
    pub empty: usize,
    pub comment: usize,
    pub encoding: usize,
    pub grammar: usize,
    pub ip_literal: usize,
    pub reserved: usize,
}

impl RejectionStats {
    /// Count one rejection
    pub fn record(&mut self, reason: Rejection) {
        match reason {
            Rejection::Empty => self.empty += 1,
            Rejection::Comment => self.comment += 1,
            Rejection::Encoding => self.encoding += 1,
            Rejection::Grammar => self.grammar += 1,
            Rejection::IpLiteral => self.ip_literal += 1,
            Rejection::Reserved => self.reserved += 1,
        }
    }

    /// Add another set of counters to this one
    pub fn merge(&mut self, other: &Self) {
        self.empty += other.empty;
        self.comment += other.comment;
        self.encoding += other.encoding;
        self.grammar += other.grammar;
        self.ip_literal += other.ip_literal;
        self.reserved += other.reserved;
    }

    /// All rejections
    #[must_use]
    pub const fn total(&self) -> usize {
        self.empty + self.comment + self.encoding + self.grammar + self.ip_literal + self.reserved
    }

    /// Rejections of lines that looked like entries, i.e. excluding blanks and comments
    #[must_use]
    pub const fn invalid(&self) -> usize {
        self.encoding + self.grammar + self.ip_literal + self.reserved
    }
}

/// Canonicalize one line of a block or allow list.
///
/// Returns the lower-case, punycode, `www.`-stripped hostname, or the reason
/// the line holds none. Applying it to its own output is a no-op.
pub fn canonicalize(line: &str) -> Result<CanonicalDomain, Rejection> {
    let line = line.trim();
    if line.is_empty() {
        return Err(Rejection::Empty);
    }
    if line.starts_with(['#', '!', '/']) {
        return Err(Rejection::Comment);
    }

    let lowered = line.to_lowercase();
    let end = lowered.find(['#', '^', '$']).unwrap_or(lowered.len());
    let cleaned = lowered[..end].replace('\r', "");
    let cleaned = cleaned.trim();

    let unmarked = cleaned
        .strip_prefix("*.")
        .or_else(|| cleaned.strip_prefix('.'))
        .unwrap_or(cleaned);
    let entry = PREFIX_RE.replace(unmarked, "");
    let entry = entry.trim();
    if entry.is_empty() {
        return Err(Rejection::Empty);
    }

    let ascii = idna::domain_to_ascii(entry).map_err(|_| Rejection::Encoding)?;

    if RESERVED.contains(&ascii.as_str()) {
        return Err(Rejection::Reserved);
    }
    if ascii.len() > MAX_DOMAIN_LEN || !HOSTNAME_RE.is_match(&ascii) {
        return Err(Rejection::Grammar);
    }
    if IPV4_RE.is_match(&ascii) {
        return Err(Rejection::IpLiteral);
    }

    Ok(CanonicalDomain::new_unchecked(strip_www(&ascii)))
}

/// Drop leading `www.` labels while at least two labels remain
fn strip_www(domain: &str) -> &str {
    let mut domain = domain;
    while let Some(rest) = domain.strip_prefix("www.") {
        if !rest.contains('.') {
            break;
        }
        domain = rest;
    }
    domain
}
