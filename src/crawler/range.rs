//! Estimation of the highest chain identifier
use crate::crawler::fetcher::{DataSource, Endpoints};
use crate::crawler::parser::{parse_document, trailing_id, ChainListing};
use crate::{DexError, Result};

/// Determines the highest valid chain identifier
///
/// Reads the listing's `count`, then fetches the last single-entry page and
/// parses the trailing identifier of the chain URL it names. Identifiers are
/// not contiguous at the source, so `count` alone is not the maximum.
///
/// # Returns
///
/// * `Ok(max_id)` - Highest chain identifier
/// * `Err(DexError)` - Fetch failure, malformed listing, or an empty listing
pub async fn estimate_max_chain_id<S>(source: &S, endpoints: &Endpoints) -> Result<u32>
where
    S: DataSource + ?Sized,
{
    let listing_url = endpoints.chain_listing();
    let body = source.fetch_text(&listing_url).await?;
    let listing: ChainListing = parse_document(&listing_url, &body)?;

    if listing.count == 0 {
        return Err(DexError::parse(&listing_url, "chain listing is empty"));
    }

    let page_url = endpoints.chain_listing_page(listing.count - 1);
    let body = source.fetch_text(&page_url).await?;
    let page: ChainListing = parse_document(&page_url, &body)?;

    let last = page
        .results
        .last()
        .ok_or_else(|| DexError::parse(&page_url, "last listing page has no results"))?;

    let max_id = trailing_id(&last.url).ok_or_else(|| {
        DexError::parse(
            &page_url,
            format!("no chain identifier in '{}'", last.url),
        )
    })?;

    tracing::info!(
        "Chain listing reports {} chains, highest identifier {}",
        listing.count,
        max_id
    );
    Ok(max_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fixture::{FixtureSource, BASE};
    use serde_json::json;

    fn endpoints() -> Endpoints {
        Endpoints::new(BASE).unwrap()
    }

    #[tokio::test]
    async fn test_estimate_uses_last_chain_url() {
        let endpoints = endpoints();
        let source = FixtureSource::new()
            .with_json(&endpoints.chain_listing(), json!({ "count": 541, "results": [] }))
            .with_json(
                &endpoints.chain_listing_page(540),
                json!({
                    "count": 541,
                    "results": [{ "url": "https://dex.test/api/v2/evolution-chain/549/" }]
                }),
            );

        assert_eq!(estimate_max_chain_id(&source, &endpoints).await.unwrap(), 549);
    }

    #[tokio::test]
    async fn test_zero_count_is_parse_error() {
        let endpoints = endpoints();
        let source = FixtureSource::new()
            .with_json(&endpoints.chain_listing(), json!({ "count": 0, "results": [] }));

        let result = estimate_max_chain_id(&source, &endpoints).await;
        assert!(matches!(result, Err(DexError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_empty_last_page_is_parse_error() {
        let endpoints = endpoints();
        let source = FixtureSource::new()
            .with_json(&endpoints.chain_listing(), json!({ "count": 3 }))
            .with_json(&endpoints.chain_listing_page(2), json!({ "count": 3, "results": [] }));

        let result = estimate_max_chain_id(&source, &endpoints).await;
        assert!(matches!(result, Err(DexError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let endpoints = endpoints();
        let source = FixtureSource::new();

        let result = estimate_max_chain_id(&source, &endpoints).await;
        assert!(matches!(result, Err(DexError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_non_numeric_chain_url_is_parse_error() {
        let endpoints = endpoints();
        let source = FixtureSource::new()
            .with_json(&endpoints.chain_listing(), json!({ "count": 1 }))
            .with_json(
                &endpoints.chain_listing_page(0),
                json!({ "count": 1, "results": [{ "url": "https://dex.test/api/v2/evolution-chain/latest/" }] }),
            );

        let result = estimate_max_chain_id(&source, &endpoints).await;
        assert!(matches!(result, Err(DexError::Parse { .. })));
    }
}
