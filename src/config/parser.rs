use crate::config::types::{Config, SearchOverrides};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Parses configuration from TOML text without validating it
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    Ok(config)
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use listing_ripple::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Searching for: {}", config.search.search_query);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_overrides(path, &SearchOverrides::default())
}

/// Loads a configuration file, applies command-line search overrides, then validates
///
/// Overrides are applied before validation so a file without a `[search]`
/// table is accepted as long as the CLI supplies both inputs.
pub fn load_config_with_overrides(
    path: &Path,
    overrides: &SearchOverrides,
) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;

    overrides.apply(&mut config.search);

    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is stored on each run row so runs made with different settings
/// can be told apart.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration with overrides and returns both the config and its hash
pub fn load_config_with_hash(
    path: &Path,
    overrides: &SearchOverrides,
) -> Result<(Config, String), ConfigError> {
    let config = load_config_with_overrides(path, overrides)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
