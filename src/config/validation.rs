//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check required collaborator settings are present (upstream, database)
//! - Validate value ranges (timeouts > 0, attempts >= 1)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Error messages name the field, never its value (credentials stay out of logs)

use std::net::SocketAddr;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g., "upstream.host").
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            "must be a socket address such as 0.0.0.0:3000",
        ));
    }

    if config.upstream.host.trim().is_empty() {
        errors.push(ValidationError::new("upstream.host", "is required"));
    }
    if config.upstream.port == 0 {
        errors.push(ValidationError::new("upstream.port", "must be non-zero"));
    }
    if config.upstream.root_path.is_empty() {
        errors.push(ValidationError::new("upstream.root_path", "is required"));
    } else if !config.upstream.root_path.starts_with('/') {
        errors.push(ValidationError::new("upstream.root_path", "must start with '/'"));
    }

    let db = &config.database;
    let required = [
        ("database.host", db.host.as_str()),
        ("database.user", db.user.as_str()),
        ("database.password", db.password.as_str()),
        ("database.name", db.name.as_str()),
    ];
    for (field, value) in required {
        if value.is_empty() {
            errors.push(ValidationError::new(field, "is required"));
        }
    }
    if db.port == 0 {
        errors.push(ValidationError::new("database.port", "must be non-zero"));
    }

    match Url::parse(&config.sitemap.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(_) => errors.push(ValidationError::new("sitemap.base_url", "must be an http(s) URL")),
        Err(e) => errors.push(ValidationError::new("sitemap.base_url", format!("invalid URL ({})", e))),
    }

    let timeouts = [
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.upstream_secs", config.timeouts.upstream_secs),
        ("timeouts.query_secs", config.timeouts.query_secs),
        ("timeouts.connect_secs", config.timeouts.connect_secs),
    ];
    for (field, secs) in timeouts {
        if secs == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be at least 1"));
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        _ => errors.push(ValidationError::new(
            "observability.log_format",
            "must be \"pretty\" or \"json\"",
        )),
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "must be a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ProxyConfig {
        let mut config = ProxyConfig::default();
        config.upstream.host = "catalog.example.org".into();
        config.upstream.root_path = "/geoportal/csw".into();
        config.database.host = "localhost".into();
        config.database.user = "geoportal".into();
        config.database.password = "secret".into();
        config.database.name = "geoportal".into();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_default_config_reports_every_missing_field() {
        let errors = validate_config(&ProxyConfig::default()).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"upstream.host"));
        assert!(fields.contains(&"upstream.root_path"));
        assert!(fields.contains(&"database.host"));
        assert!(fields.contains(&"database.user"));
        assert!(fields.contains(&"database.password"));
        assert!(fields.contains(&"database.name"));
    }

    #[test]
    fn test_root_path_must_be_absolute() {
        let mut config = valid_config();
        config.upstream.root_path = "geoportal/csw".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "upstream.root_path");
    }

    #[test]
    fn test_ranges_checked() {
        let mut config = valid_config();
        config.timeouts.upstream_secs = 0;
        config.retries.max_attempts = 0;
        config.observability.log_format = "xml".into();
        config.sitemap.base_url = "ftp://example.org/".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_errors_never_echo_password() {
        let mut config = valid_config();
        config.database.password = "hunter2".into();
        config.database.host.clear();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().all(|e| !e.to_string().contains("hunter2")));
    }
}
