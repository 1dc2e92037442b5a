//! Sitemap document assembly.

use std::sync::Arc;
use std::time::Duration;

use quick_xml::escape::partial_escape;

use crate::config::{SitemapConfig, TimeoutConfig};
use crate::resilience::{with_deadline, DeadlineExceeded};
use crate::sitemap::{IdentifierStore, SitemapError};
use crate::upstream::encode_component;

pub const PROLOG: &str = "<?xml version='1.0' encoding='UTF-8'?>\n";
pub const URLSET_OPEN: &str = "<urlset xmlns='http://www.sitemaps.org/schemas/sitemap/0.9'>";
pub const URLSET_CLOSE: &str = "</urlset>";

/// Builds the sitemap from an [`IdentifierStore`].
#[derive(Clone)]
pub struct SitemapBuilder {
    store: Arc<dyn IdentifierStore>,
    base_url: String,
    deadline: Duration,
}

impl SitemapBuilder {
    pub fn new(store: Arc<dyn IdentifierStore>, sitemap: &SitemapConfig, timeouts: &TimeoutConfig) -> Self {
        Self {
            store,
            base_url: sitemap.base_url.clone(),
            deadline: Duration::from_secs(timeouts.query_secs),
        }
    }

    /// Query the store and render the complete document.
    pub async fn build(&self) -> Result<Sitemap, SitemapError> {
        let identifiers = with_deadline(self.deadline, self.store.discoverable_identifiers())
            .await
            .map_err(|DeadlineExceeded(deadline)| SitemapError::QueryTimedOut(deadline))??;

        Ok(Sitemap {
            entries: identifiers.len(),
            document: render_sitemap(&self.base_url, &identifiers),
        })
    }
}

/// A rendered sitemap and how many records it lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sitemap {
    pub entries: usize,
    pub document: String,
}

/// Prolog, root element and one `<url><loc>` per identifier.
pub fn render_sitemap(base_url: &str, identifiers: &[String]) -> String {
    let mut document = String::from(PROLOG);
    document.push_str(URLSET_OPEN);
    for identifier in identifiers {
        let loc = format!("{}{}", base_url, encode_component(identifier));
        document.push_str("<url><loc>");
        document.push_str(&partial_escape(loc.as_str()));
        document.push_str("</loc></url>");
    }
    document.push_str(URLSET_CLOSE);
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::markup;
    use crate::sitemap::{CatalogRow, MemoryStore};
    use serde_json::json;

    const BASE: &str = "http://metadata.usgin.org/record/";

    fn builder(store: MemoryStore, query_secs: u64) -> SitemapBuilder {
        let timeouts = TimeoutConfig {
            query_secs,
            ..TimeoutConfig::default()
        };
        SitemapBuilder::new(Arc::new(store), &SitemapConfig::default(), &timeouts)
    }

    #[test]
    fn test_empty_sitemap_is_complete() {
        let document = render_sitemap(BASE, &[]);
        assert_eq!(document, format!("{}{}{}", PROLOG, URLSET_OPEN, URLSET_CLOSE));
        let parsed = markup::parse(&document).unwrap();
        assert_eq!(
            parsed,
            json!({"urlset": {"xmlns": "http://www.sitemaps.org/schemas/sitemap/0.9"}})
        );
    }

    #[test]
    fn test_entries_are_encoded() {
        let ids = vec!["urn:abc/123".to_string(), "plain".to_string()];
        let document = render_sitemap(BASE, &ids);
        assert_eq!(document.matches("<url><loc>").count(), 2);
        assert!(document.contains(
            "<url><loc>http://metadata.usgin.org/record/urn%3Aabc%2F123</loc></url>"
        ));
        assert!(document.contains("<url><loc>http://metadata.usgin.org/record/plain</loc></url>"));
        assert!(markup::parse(&document).is_ok());
    }

    #[test]
    fn test_base_url_markup_is_escaped() {
        let document = render_sitemap("http://example.org/r?a=1&id=", &["x".to_string()]);
        assert!(document.contains("<loc>http://example.org/r?a=1&amp;id=x</loc>"));
        assert!(markup::parse(&document).is_ok());
    }

    #[tokio::test]
    async fn test_build_counts_entries() {
        let store = MemoryStore::new(vec![
            CatalogRow::discoverable("a"),
            CatalogRow::discoverable("b"),
            CatalogRow::discoverable("c"),
        ]);
        let sitemap = builder(store, 5).build().await.unwrap();
        assert_eq!(sitemap.entries, 3);
        assert_eq!(sitemap.document.matches("<url>").count(), 3);
    }

    #[tokio::test]
    async fn test_query_failure_is_not_empty_result() {
        let store = MemoryStore::failing(SitemapError::QueryFailed("relation missing".into()));
        let err = builder(store, 5).build().await.unwrap_err();
        assert!(matches!(err, SitemapError::QueryFailed(_)));

        let empty = builder(MemoryStore::default(), 5).build().await.unwrap();
        assert_eq!(empty.entries, 0);
    }

    #[tokio::test]
    async fn test_slow_store_times_out() {
        let store = MemoryStore::new(vec![CatalogRow::discoverable("a")])
            .with_delay(Duration::from_secs(3));
        let err = builder(store, 1).build().await.unwrap_err();
        assert_eq!(err, SitemapError::QueryTimedOut(Duration::from_secs(1)));
    }
}
