//! Identifier sources for the sitemap.
//!
//! # Responsibilities
//! - Run the fixed discoverability query against the Geoportal database
//! - Keep "could not connect" apart from "query failed"
//!
//! # Design Decisions
//! - One short-lived connection per sitemap request, no pool
//! - The query text is a constant; nothing from the request reaches SQL
//! - `MemoryStore` applies the same predicate in process for tests and demos

use std::time::Duration;

use async_trait::async_trait;
use tokio_postgres::NoTls;

use crate::config::DatabaseConfig;
use crate::sitemap::SitemapError;

/// Identifiers of records that are findable, approved and non-empty.
pub const DISCOVERABLE_IDENTIFIERS_QUERY: &str = "SELECT fileidentifier FROM gpt_resource \
     WHERE findable = 'true' AND approvalstatus = 'approved' AND NOT fileidentifier = ''";

/// Source of publicly discoverable record identifiers.
#[async_trait]
pub trait IdentifierStore: Send + Sync {
    async fn discoverable_identifiers(&self) -> Result<Vec<String>, SitemapError>;
}

/// Store backed by the Geoportal PostgreSQL schema.
pub struct PostgresStore {
    config: tokio_postgres::Config,
}

impl PostgresStore {
    pub fn new(database: &DatabaseConfig, connect_timeout: Duration) -> Self {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&database.host)
            .port(database.port)
            .user(&database.user)
            .password(&database.password)
            .dbname(&database.name)
            .application_name("csw-record-proxy")
            .connect_timeout(connect_timeout);
        Self { config }
    }
}

#[async_trait]
impl IdentifierStore for PostgresStore {
    async fn discoverable_identifiers(&self) -> Result<Vec<String>, SitemapError> {
        let (client, connection) = self
            .config
            .connect(NoTls)
            .await
            .map_err(|e| SitemapError::DatabaseUnavailable(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %e, "Catalog database connection ended with error");
            }
        });

        let rows = client
            .query(DISCOVERABLE_IDENTIFIERS_QUERY, &[])
            .await
            .map_err(|e| SitemapError::QueryFailed(e.to_string()))?;

        let mut identifiers = Vec::with_capacity(rows.len());
        for row in rows {
            let identifier: Option<String> = row
                .try_get(0)
                .map_err(|e| SitemapError::QueryFailed(e.to_string()))?;
            if let Some(identifier) = identifier.filter(|id| !id.is_empty()) {
                identifiers.push(identifier);
            }
        }
        Ok(identifiers)
    }
}

/// One `gpt_resource` row as far as the sitemap cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub file_identifier: Option<String>,
    pub findable: String,
    pub approval_status: String,
}

impl CatalogRow {
    /// A row that passes the discoverability filter.
    pub fn discoverable(identifier: impl Into<String>) -> Self {
        Self {
            file_identifier: Some(identifier.into()),
            findable: "true".to_string(),
            approval_status: "approved".to_string(),
        }
    }

    pub fn is_discoverable(&self) -> bool {
        self.findable == "true"
            && self.approval_status == "approved"
            && self.file_identifier.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// In-process store holding a fixed table, optionally failing or slow.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Vec<CatalogRow>,
    failure: Option<SitemapError>,
    delay: Option<Duration>,
}

impl MemoryStore {
    pub fn new(rows: Vec<CatalogRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Every call fails with `failure`.
    pub fn failing(failure: SitemapError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    /// Wait `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl IdentifierStore for MemoryStore {
    async fn discoverable_identifiers(&self) -> Result<Vec<String>, SitemapError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        Ok(self
            .rows
            .iter()
            .filter(|row| row.is_discoverable())
            .filter_map(|row| row.file_identifier.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discoverability_predicate() {
        assert!(CatalogRow::discoverable("a").is_discoverable());

        let mut hidden = CatalogRow::discoverable("b");
        hidden.findable = "false".into();
        assert!(!hidden.is_discoverable());

        let mut draft = CatalogRow::discoverable("c");
        draft.approval_status = "draft".into();
        assert!(!draft.is_discoverable());

        assert!(!CatalogRow::discoverable("").is_discoverable());

        let mut missing = CatalogRow::discoverable("d");
        missing.file_identifier = None;
        assert!(!missing.is_discoverable());
    }

    #[tokio::test]
    async fn test_memory_store_filters_rows() {
        let mut hidden = CatalogRow::discoverable("hidden");
        hidden.findable = "false".into();
        let store = MemoryStore::new(vec![
            CatalogRow::discoverable("first"),
            hidden,
            CatalogRow::discoverable(""),
            CatalogRow::discoverable("second"),
        ]);
        assert_eq!(
            store.discoverable_identifiers().await.unwrap(),
            vec!["first".to_string(), "second".to_string()]
        );
    }

    #[test]
    fn test_query_text_is_fixed_filter() {
        assert!(DISCOVERABLE_IDENTIFIERS_QUERY.contains("findable = 'true'"));
        assert!(DISCOVERABLE_IDENTIFIERS_QUERY.contains("approvalstatus = 'approved'"));
        assert!(DISCOVERABLE_IDENTIFIERS_QUERY.contains("NOT fileidentifier = ''"));
    }

    #[tokio::test]
    async fn test_unreachable_database_is_unavailable() {
        let database = DatabaseConfig {
            host: "127.0.0.1".into(),
            port: 1,
            user: "geoportal".into(),
            password: "secret".into(),
            name: "geoportal".into(),
        };
        let store = PostgresStore::new(&database, Duration::from_secs(2));
        let err = store.discoverable_identifiers().await.unwrap_err();
        assert!(matches!(err, SitemapError::DatabaseUnavailable(_)));
    }
}
