use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One record returned by a search provider. Position in the list is the ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// `None` 代表格式錯誤的紀錄
    pub url: Option<String>,
}

impl SearchResult {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }
}

/// Lower-cases a domain and strips a leading `www.`.
pub fn normalize_domain(domain: &str) -> String {
    let lower = domain.trim().to_lowercase();
    match lower.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

/// A set of normalized domains used as a preference filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainSet(HashSet<String>);

impl DomainSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(domain: &str) -> Self {
        std::iter::once(domain).collect()
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.0.contains(&normalize_domain(domain))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for DomainSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|d| normalize_domain(d.as_ref()))
                .filter(|d| !d.is_empty())
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Confirmed,
    Refuted,
    Indeterminate,
}

impl Verdict {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Verdict::Confirmed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum VerificationOutcome {
    Verified { source_url: String },
    Unverified,
}

impl VerificationOutcome {
    pub fn from_source(source: Option<String>) -> Self {
        match source {
            Some(source_url) => VerificationOutcome::Verified { source_url },
            None => VerificationOutcome::Unverified,
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationOutcome::Verified { .. })
    }

    pub fn source_url(&self) -> Option<&str> {
        match self {
            VerificationOutcome::Verified { source_url } => Some(source_url),
            VerificationOutcome::Unverified => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimOutcome {
    pub claim: String,
    #[serde(flatten)]
    pub outcome: VerificationOutcome,
}

/// The stage of the verification strategy that produced a search attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    OfficialDomain,
    DirectQuery,
    SmartQuery,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::OfficialDomain => "official-domain",
            Stage::DirectQuery => "direct-query",
            Stage::SmartQuery => "smart-query",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Witty,
    Urgent,
    Friendly,
    Luxurious,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tone::Professional => "Professional",
            Tone::Witty => "Witty",
            Tone::Urgent => "Urgent",
            Tone::Friendly => "Friendly",
            Tone::Luxurious => "Luxurious",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct CopyRequest {
    pub product_url: String,
    pub tone: Tone,
    /// `None` 表示使用全部擷取出的 claims
    pub extract_limit: Option<usize>,
    pub verify_limit: Option<usize>,
}

impl CopyRequest {
    pub fn new(product_url: impl Into<String>, tone: Tone) -> Self {
        Self {
            product_url: product_url.into(),
            tone,
            extract_limit: None,
            verify_limit: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyReport {
    pub product_url: String,
    pub tone: Tone,
    pub outcomes: Vec<ClaimOutcome>,
    pub ad_copy: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl CopyReport {
    pub fn verified_claims(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.outcome.is_verified())
            .map(|o| o.claim.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("WWW.Example.COM"), "example.com");
        assert_eq!(normalize_domain("shop.example.com"), "shop.example.com");
        assert_eq!(normalize_domain("wwwexample.com"), "wwwexample.com");
    }

    #[test]
    fn test_domain_set_normalizes_members() {
        let set: DomainSet = ["www.Apple.com", "", "b.com"].into_iter().collect();
        assert!(set.contains("apple.com"));
        assert!(!set.contains(""));
        assert!(set.contains("WWW.B.COM"));
        assert!(!set.contains("c.com"));
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = ClaimOutcome {
            claim: "Battery lasts 20 hours".to_string(),
            outcome: VerificationOutcome::Verified {
                source_url: "https://example.com/specs".to_string(),
            },
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "verified");
        assert_eq!(json["source_url"], "https://example.com/specs");

        let unverified = ClaimOutcome {
            claim: "x".to_string(),
            outcome: VerificationOutcome::Unverified,
        };
        let json = serde_json::to_value(&unverified).unwrap();
        assert_eq!(json["status"], "unverified");
    }

    #[test]
    fn test_report_lists_only_verified_claims() {
        let report = CopyReport {
            product_url: "https://example.com".to_string(),
            tone: Tone::Witty,
            outcomes: vec![
                ClaimOutcome {
                    claim: "a".to_string(),
                    outcome: VerificationOutcome::from_source(Some("https://x.com".to_string())),
                },
                ClaimOutcome {
                    claim: "b".to_string(),
                    outcome: VerificationOutcome::from_source(None),
                },
            ],
            ad_copy: None,
            generated_at: Utc::now(),
        };
        assert_eq!(report.verified_claims(), vec!["a"]);
    }
}
