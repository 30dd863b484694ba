use crate::core::domain_resolver::domain_of;
use crate::domain::model::{DomainSet, SearchResult};

/// Picks the first result on a preferred domain, otherwise the first result with a URL.
pub fn select(results: &[SearchResult], preferred: &DomainSet) -> Option<String> {
    let urls = || results.iter().filter_map(|r| r.url.as_deref());

    if !preferred.is_empty() {
        let on_preferred = urls().find(|url| {
            domain_of(url)
                .map(|domain| preferred.contains(&domain))
                .unwrap_or(false)
        });
        if let Some(url) = on_preferred {
            return Some(url.to_string());
        }
    }

    urls().next().map(str::to_string)
}
