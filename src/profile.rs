//! Connection profiles
//!
//! A profile identifies one Ollama server: hostname, port, scheme and
//! whether TLS certificates are verified. Config files use the field names
//! `hostname`, `port`, `protocol` and `verify_ssl`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default Ollama API port
pub const DEFAULT_PORT: u16 = 11434;

/// URL scheme used to reach the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            other => Err(format!("unsupported protocol '{}'", other)),
        }
    }
}

/// Resolved server identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    hostname: String,

    #[serde(default = "default_port")]
    port: u16,

    #[serde(default, rename = "protocol")]
    scheme: Scheme,

    #[serde(default = "default_verify", rename = "verify_ssl")]
    verify_tls: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_verify() -> bool {
    true
}

impl ConnectionProfile {
    /// Profile for `hostname` with the default port, http, and TLS verification on
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            port: DEFAULT_PORT,
            scheme: Scheme::Http,
            verify_tls: true,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    /// `scheme://hostname:port`
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.hostname, self.port)
    }

    /// Parse `host`, `host:port`, or either with an `http://` / `https://`
    /// prefix. A non-numeric port leaves the whole remainder as the hostname.
    pub fn parse(value: &str) -> Self {
        let (scheme, rest) = if let Some(rest) = value.strip_prefix("https://") {
            (Scheme::Https, rest)
        } else if let Some(rest) = value.strip_prefix("http://") {
            (Scheme::Http, rest)
        } else {
            (Scheme::Http, value)
        };
        let rest = rest.trim_end_matches('/');

        let profile = match split_host_port(rest) {
            Some((host, port)) => ConnectionProfile::new(host).with_port(port),
            None => ConnectionProfile::new(rest),
        };
        profile.with_scheme(scheme)
    }
}

impl Default for ConnectionProfile {
    fn default() -> Self {
        Self::new("localhost")
    }
}

impl fmt::Display for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url())
    }
}

/// Split on the last colon when the suffix is a valid port
pub(crate) fn split_host_port(value: &str) -> Option<(&str, u16)> {
    let (host, port) = value.rsplit_once(':')?;
    port.parse::<u16>().ok().map(|port| (host, port))
}
