//! Host discovery from MCP client configuration files
//!
//! Reads the `mcpServers` map used by Cursor and Claude Desktop and turns
//! every server that looks like an Ollama server into a host profile.

use crate::config::Config;
use crate::profile::ConnectionProfile;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Parsed MCP client configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct McpConfig {
    #[serde(default, rename = "mcpServers")]
    pub servers: BTreeMap<String, McpServer>,
}

/// One entry of `mcpServers`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct McpServer {
    #[serde(default)]
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl McpServer {
    fn is_ollama(&self, name: &str) -> bool {
        name.to_lowercase().contains("ollama")
            || self.command.to_lowercase().contains("ollama")
            || self.env.contains_key("OLLAMA_HOST")
    }
}

impl McpConfig {
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str(contents)
    }

    /// Host profiles keyed by sanitized server name
    ///
    /// Servers without an `OLLAMA_HOST` are skipped.
    pub fn ollama_hosts(&self) -> BTreeMap<String, ConnectionProfile> {
        self.servers
            .iter()
            .filter(|(name, server)| server.is_ollama(name))
            .filter_map(|(name, server)| {
                let host = server.env.get("OLLAMA_HOST").filter(|h| !h.is_empty())?;
                Some((sanitize_alias(name), ConnectionProfile::parse(host)))
            })
            .filter(|(alias, _)| !alias.is_empty())
            .collect()
    }
}

/// Lowercase, hyphen-separated alias limited to `[a-z0-9-]`
pub fn sanitize_alias(name: &str) -> String {
    let mut alias = String::with_capacity(name.len());

    for c in name.to_lowercase().chars() {
        let c = match c {
            ' ' | '_' => '-',
            c => c,
        };
        if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
            continue;
        }
        if c == '-' && alias.ends_with('-') {
            continue;
        }
        alias.push(c);
    }

    alias.trim_matches('-').to_string()
}

/// Standard MCP config locations, in lookup order
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".cursor").join("mcp.json"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".cursor").join("mcp.json"));
        paths.push(
            home.join("Library")
                .join("Application Support")
                .join("Claude")
                .join("claude_desktop_config.json"),
        );
        paths.push(
            home.join(".config")
                .join("Claude")
                .join("claude_desktop_config.json"),
        );
    }

    paths
}

/// First existing MCP config file
pub fn find_config() -> Option<PathBuf> {
    search_paths().into_iter().find(|p| p.exists())
}

/// Load an MCP config; unreadable or invalid files count as absent
pub fn load(path: &Path) -> Option<McpConfig> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "cannot read MCP config");
            return None;
        }
    };

    match McpConfig::from_json(&contents) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring invalid MCP config");
            None
        }
    }
}

/// Import Ollama hosts from the first MCP config found into `config`
///
/// Returns the number of hosts added.
pub fn import_hosts(config: &mut Config) -> usize {
    let Some(path) = find_config() else {
        tracing::debug!("no MCP config found");
        return 0;
    };

    let Some(mcp) = load(&path) else {
        return 0;
    };

    let before = config.hosts.len();
    config.merge_hosts(mcp.ollama_hosts());
    let added = config.hosts.len() - before;

    tracing::debug!(path = %path.display(), added, "imported MCP hosts");
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Scheme;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{
        "mcpServers": {
            "Ollama Local": {
                "command": "ollama",
                "args": ["serve"],
                "env": {"OLLAMA_HOST": "localhost:11434"}
            },
            "gpu_box": {
                "command": "ssh",
                "args": ["user@remote", "ollama", "serve"],
                "env": {"OLLAMA_HOST": "https://192.168.1.100:8443"}
            },
            "filesystem": {
                "command": "npx",
                "args": ["@modelcontextprotocol/server-filesystem"]
            },
            "ollama-nohost": {
                "command": "ollama"
            }
        }
    }"#;

    #[test]
    fn test_extract_ollama_hosts() {
        let hosts = McpConfig::from_json(SAMPLE).unwrap().ollama_hosts();
        assert_eq!(hosts.len(), 2);

        let local = &hosts["ollama-local"];
        assert_eq!(local.base_url(), "http://localhost:11434");

        let gpu = &hosts["gpu-box"];
        assert_eq!(gpu.scheme(), Scheme::Https);
        assert_eq!(gpu.port(), 8443);
    }

    #[test]
    fn test_non_numeric_port_keeps_default() {
        let json = r#"{"mcpServers": {"x": {"env": {"OLLAMA_HOST": "box:abc"}}}}"#;
        let hosts = McpConfig::from_json(json).unwrap().ollama_hosts();
        assert_eq!(hosts["x"].port(), 11434);
        assert_eq!(hosts["x"].hostname(), "box:abc");
    }

    #[test]
    fn test_missing_servers_map() {
        let config = McpConfig::from_json("{}").unwrap();
        assert!(config.ollama_hosts().is_empty());
    }

    #[test]
    fn test_sanitize_alias() {
        assert_eq!(sanitize_alias("Ollama Local"), "ollama-local");
        assert_eq!(sanitize_alias("my__server!!"), "my-server");
        assert_eq!(sanitize_alias("  -GPU box-  "), "gpu-box");
        assert_eq!(sanitize_alias("héllo wörld"), "hllo-wrld");
    }

    #[test]
    fn test_merge_does_not_overwrite() {
        let json = r#"{"mcpServers": {"local": {"env": {"OLLAMA_HOST": "elsewhere"}}}}"#;
        let mut config = Config::default();
        config.merge_hosts(McpConfig::from_json(json).unwrap().ollama_hosts());
        assert_eq!(config.hosts["local"].hostname(), "localhost");
    }

    #[test]
    fn test_invalid_file_is_absent() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load(file.path()).is_none());

        assert!(load(Path::new("/nonexistent/ollamactl/mcp.json")).is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"mcpServers": {{"ollama": {{"env": {{"OLLAMA_HOST": "gpu:9000"}}}}}}}}"#
        )
        .unwrap();

        let hosts = load(file.path()).unwrap().ollama_hosts();
        assert_eq!(hosts["ollama"].hostname(), "gpu");
        assert_eq!(hosts["ollama"].port(), 9000);
    }
}
