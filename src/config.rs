//! Configuration management for ollamactl
//!
//! Provides TOML-based host profiles and settings with defaults and
//! validation. Sources, lowest priority first:
//! - `<config_dir>/ollama-ctl/config.toml`
//! - `./.ollama-ctl.toml`
//! - `OLLAMA_HOST`, `OLLAMA_PORT`, `OLLAMA_PROTOCOL`
//!
//! An explicit `--config` path replaces both files.

use crate::errors::ConfigError;
use crate::profile::{split_host_port, ConnectionProfile, Scheme};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use toml::{Table, Value};

type Result<T> = std::result::Result<T, ConfigError>;

/// File name of the per-directory config
pub const LOCAL_CONFIG_FILE: &str = ".ollama-ctl.toml";

/// Alias given to the host defined by `OLLAMA_HOST`
pub const ENV_HOST_ALIAS: &str = "env";

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host_alias")]
    pub default_host: String,

    #[serde(default = "default_hosts")]
    pub hosts: BTreeMap<String, ConnectionProfile>,

    #[serde(default)]
    pub settings: Settings,
}

/// Client behaviour settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Stream responses by default
    #[serde(default = "default_stream")]
    pub stream: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

fn default_host_alias() -> String {
    "local".to_string()
}

fn default_hosts() -> BTreeMap<String, ConnectionProfile> {
    BTreeMap::from([("local".to_string(), ConnectionProfile::new("localhost"))])
}

fn default_timeout() -> u64 {
    120
}

fn default_stream() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_host: default_host_alias(),
            hosts: default_hosts(),
            settings: Settings::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            stream: default_stream(),
            default_model: None,
        }
    }
}

impl Config {
    /// Load configuration from the standard sources and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let search = Self::search_paths();
        Self::load_with(path, &search, |key| std::env::var(key).ok())
    }

    /// Load configuration from `explicit`, or by merging `search` (lowest
    /// priority first), then apply environment overrides from `env`
    pub fn load_with<F>(explicit: Option<&Path>, search: &[PathBuf], env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut merged = Table::new();

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            merged = read_table(path)?;
        } else {
            for path in search.iter().filter(|p| p.exists()) {
                merge_tables(&mut merged, read_table(path)?);
            }
        }

        if let Some(overrides) = env_overrides(env) {
            merge_tables(&mut merged, overrides);
        }

        let config: Config = Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Invalid(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Global then local config file locations
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(global) = Self::global_path() {
            paths.push(global);
        }
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(LOCAL_CONFIG_FILE));
        }
        paths
    }

    /// `<config_dir>/ollama-ctl/config.toml`
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ollama-ctl").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.settings.timeout == 0 {
            return Err(ConfigError::Invalid(
                "settings.timeout must be greater than 0".to_string(),
            ));
        }

        if let Some((alias, _)) = self.hosts.iter().find(|(_, p)| p.hostname().trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "host '{}' has an empty hostname",
                alias
            )));
        }

        Ok(())
    }

    /// Resolve a host alias, `host:port`, or hostname into a profile
    ///
    /// `None` selects `default_host`.
    pub fn profile(&self, host: Option<&str>) -> ConnectionProfile {
        let alias = host.unwrap_or(&self.default_host);

        if let Some(profile) = self.hosts.get(alias) {
            return profile.clone();
        }

        match split_host_port(alias) {
            Some((hostname, port)) => ConnectionProfile::new(hostname).with_port(port),
            None => ConnectionProfile::new(alias),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.settings.timeout)
    }

    /// Add hosts whose alias is not configured yet
    pub fn merge_hosts(&mut self, hosts: BTreeMap<String, ConnectionProfile>) {
        for (alias, profile) in hosts {
            self.hosts.entry(alias).or_insert(profile);
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let write_error = |message: String| ConfigError::Write {
            path: path.to_path_buf(),
            message,
        };

        let contents = toml::to_string_pretty(self).map_err(|e| write_error(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
        }

        std::fs::write(path, contents).map_err(|e| write_error(e.to_string()))
    }

    /// Example configuration written by `init-config`
    pub fn example() -> Self {
        let hosts = BTreeMap::from([
            (
                "local".to_string(),
                ConnectionProfile::new("localhost"),
            ),
            (
                "remote".to_string(),
                ConnectionProfile::new("192.168.1.100").with_scheme(Scheme::Https),
            ),
            (
                "cloud".to_string(),
                ConnectionProfile::new("ollama.example.com")
                    .with_scheme(Scheme::Https)
                    .with_port(443),
            ),
        ]);

        Self {
            default_host: "local".to_string(),
            hosts,
            settings: Settings {
                timeout: 30,
                stream: true,
                default_model: Some("llama2".to_string()),
            },
        }
    }
}

fn read_table(path: &Path) -> Result<Table> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let table = contents.parse::<Table>().map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(table)
}

/// Merge `overlay` into `base`; nested tables merge, everything else replaces
pub fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Table(existing)), Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Overrides from `OLLAMA_HOST`, `OLLAMA_PORT` and `OLLAMA_PROTOCOL`
///
/// Only applies when `OLLAMA_HOST` is set; the resulting host becomes the
/// default.
pub fn env_overrides<F>(env: F) -> Option<Table>
where
    F: Fn(&str) -> Option<String>,
{
    let host = env("OLLAMA_HOST").filter(|h| !h.trim().is_empty())?;
    let mut profile = ConnectionProfile::parse(host.trim());

    if let Some(port) = env("OLLAMA_PORT").filter(|p| !p.is_empty()) {
        match port.parse::<u16>() {
            Ok(port) => profile = profile.with_port(port),
            Err(_) => tracing::warn!(value = %port, "ignoring invalid OLLAMA_PORT"),
        }
    }

    if let Some(protocol) = env("OLLAMA_PROTOCOL").filter(|p| !p.is_empty()) {
        match protocol.parse::<Scheme>() {
            Ok(scheme) => profile = profile.with_scheme(scheme),
            Err(_) => tracing::warn!(value = %protocol, "ignoring invalid OLLAMA_PROTOCOL"),
        }
    }

    let profile = Value::try_from(&profile).ok()?;
    let mut hosts = Table::new();
    hosts.insert(ENV_HOST_ALIAS.to_string(), profile);

    let mut overrides = Table::new();
    overrides.insert("hosts".to_string(), Value::Table(hosts));
    overrides.insert(
        "default_host".to_string(),
        Value::String(ENV_HOST_ALIAS.to_string()),
    );
    Some(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn temp_config(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(format!("{}.toml", name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_host, "local");
        assert_eq!(config.settings.timeout, 120);
        assert!(config.settings.stream);
        assert_eq!(config.profile(None).base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_load_without_sources_uses_defaults() {
        let config = Config::load_with(None, &[], no_env).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        let err = Config::load_with(Some(&missing), &[], no_env).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_local_overrides_global() {
        let dir = TempDir::new().unwrap();
        let global = temp_config(
            &dir,
            "global",
            r#"
            default_host = "gpu"

            [hosts.gpu]
            hostname = "10.0.0.5"
            port = 8080

            [settings]
            timeout = 60
            default_model = "llama2"
            "#,
        );
        let local = temp_config(
            &dir,
            "local",
            r#"
            [hosts.gpu]
            port = 9090

            [settings]
            timeout = 15
            "#,
        );

        let config = Config::load_with(None, &[global, local], no_env).unwrap();
        let profile = config.profile(None);
        assert_eq!(profile.hostname(), "10.0.0.5");
        assert_eq!(profile.port(), 9090);
        assert_eq!(config.settings.timeout, 15);
        assert_eq!(config.settings.default_model.as_deref(), Some("llama2"));
    }

    #[test]
    fn test_env_host_becomes_default() {
        let env = env_from(&[("OLLAMA_HOST", "gpu-box:8080"), ("OLLAMA_PROTOCOL", "https")]);
        let config = Config::load_with(None, &[], env).unwrap();
        assert_eq!(config.default_host, ENV_HOST_ALIAS);
        assert_eq!(config.profile(None).base_url(), "https://gpu-box:8080");
    }

    #[test]
    fn test_env_port_overrides_host_port() {
        let env = env_from(&[("OLLAMA_HOST", "gpu-box:8080"), ("OLLAMA_PORT", "9000")]);
        let overrides = env_overrides(env).unwrap();
        let port = overrides["hosts"][ENV_HOST_ALIAS]["port"].as_integer();
        assert_eq!(port, Some(9000));
    }

    #[test]
    fn test_env_invalid_values_ignored() {
        let env = env_from(&[
            ("OLLAMA_HOST", "gpu-box"),
            ("OLLAMA_PORT", "not-a-port"),
            ("OLLAMA_PROTOCOL", "gopher"),
        ]);
        let config = Config::load_with(None, &[], env).unwrap();
        assert_eq!(config.profile(None).base_url(), "http://gpu-box:11434");
    }

    #[test]
    fn test_env_requires_host() {
        assert!(env_overrides(env_from(&[("OLLAMA_PORT", "1234")])).is_none());
    }

    #[test]
    fn test_profile_resolution() {
        let config = Config::example();
        assert_eq!(config.profile(Some("cloud")).base_url(), "https://ollama.example.com:443");
        assert_eq!(config.profile(Some("10.1.1.1:7000")).base_url(), "http://10.1.1.1:7000");
        assert_eq!(config.profile(Some("studio")).base_url(), "http://studio:11434");
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut config = Config::default();
        config.settings.timeout = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_hosts_keeps_existing() {
        let mut config = Config::default();
        config.merge_hosts(BTreeMap::from([
            ("local".to_string(), ConnectionProfile::new("elsewhere")),
            ("mcp".to_string(), ConnectionProfile::new("mcp-host")),
        ]));
        assert_eq!(config.hosts["local"].hostname(), "localhost");
        assert_eq!(config.hosts["mcp"].hostname(), "mcp-host");
    }

    #[test]
    fn test_save_and_reload_example() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config::example();
        config.save(&path).unwrap();

        let loaded = Config::load_with(Some(&path), &[], no_env).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_merge_tables_recurses() {
        let mut base: Table = "[a]\nx = 1\ny = 2\n".parse().unwrap();
        let overlay: Table = "[a]\ny = 3\n[b]\nz = true\n".parse().unwrap();
        merge_tables(&mut base, overlay);
        assert_eq!(base["a"]["x"].as_integer(), Some(1));
        assert_eq!(base["a"]["y"].as_integer(), Some(3));
        assert_eq!(base["b"]["z"].as_bool(), Some(true));
    }
}
