use crate::domain::model::normalize_domain;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

// 簡單的品牌判斷：首字大寫、其餘小寫的單字
static BRAND_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+$").expect("brand pattern is valid"));

/// Network location of `url` (host plus explicit port), normalized.
/// Returns `None` for anything that does not parse as an absolute URL with a host.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;
    let netloc = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    let domain = normalize_domain(&netloc);
    (!domain.is_empty()).then_some(domain)
}

/// First capitalized word of the claim, lower-cased. "Apple iPhone 15" -> "apple".
pub fn extract_possible_brand(claim: &str) -> Option<String> {
    claim
        .split_whitespace()
        .find(|word| BRAND_WORD.is_match(word))
        .map(str::to_lowercase)
}

/// Candidate official domain for a claim. The product URL wins over the brand guess.
pub fn resolve(claim: &str, product_url: Option<&str>) -> Option<String> {
    if let Some(domain) = product_url.and_then(domain_of) {
        return Some(domain);
    }
    extract_possible_brand(claim).map(|brand| format!("{}.com", brand))
}
