use crate::config::types::{Config, CrawlerConfig, OutputConfig, SearchConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_crawler_config(&config.crawler)?;
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the required search inputs
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.search_query.trim().is_empty() {
        return Err(ConfigError::MissingField("search-query"));
    }

    if config.location.trim().is_empty() {
        return Err(ConfigError::MissingField("location"));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_results < 1 {
        return Err(ConfigError::Validation(
            "max_results must be >= 1, got 0".to_string(),
        ));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(
            "max_retries must be >= 1 (it counts total attempts), got 0".to_string(),
        ));
    }

    if config.max_concurrency < 1 || config.max_concurrency > 16 {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and 16, got {}",
            config.max_concurrency
        )));
    }

    if config.navigation_timeout_secs == 0
        || config.request_timeout_secs == 0
        || config.network_idle_timeout_secs == 0
    {
        return Err(ConfigError::Validation(
            "timeouts must be greater than zero".to_string(),
        ));
    }

    if config.settle_jitter_min_ms > config.settle_jitter_max_ms {
        return Err(ConfigError::Validation(format!(
            "settle_jitter_min_ms ({}) cannot exceed settle_jitter_max_ms ({})",
            config.settle_jitter_min_ms, config.settle_jitter_max_ms
        )));
    }

    if config.max_requests_per_crawl == Some(0) {
        return Err(ConfigError::Validation(
            "max_requests_per_crawl must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates the target site origin
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' has no host",
            config.base_url
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.jsonl_path.as_deref() == Some("") {
        return Err(ConfigError::Validation(
            "jsonl_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}
