//! Client configuration.

use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{FortiError, Result};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// TLS certificate handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// Verify against the system roots.
    #[default]
    Verify,
    /// Accept any certificate. FortiGates ship self-signed by default.
    AcceptInvalid,
}

/// Connection settings for [`FortiClient`](crate::FortiClient).
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL, always ending in `/`.
    pub base_url: Url,
    pub token: String,
    /// VDOM applied when a call does not choose one.
    pub vdom: Option<String>,
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("vdom", &self.vdom)
            .field("tls", &self.tls)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Build a config for `host` with defaults for everything else.
    ///
    /// `host` may be a full URL or a bare `host[:port]`, which gets `https://`.
    ///
    /// # Errors
    ///
    /// Returns an error if `host` does not form a valid URL.
    pub fn new(host: &str, token: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(host)?,
            token: token.to_string(),
            vdom: None,
            tls: TlsMode::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Load from `FORTIOS_*` environment variables.
    ///
    /// - `FORTIOS_HOST` (required)
    /// - `FORTIOS_TOKEN` (required)
    /// - `FORTIOS_VDOM`
    /// - `FORTIOS_VERIFY_TLS` (`false`, `0` or `no` disables verification)
    /// - `FORTIOS_TIMEOUT_SECS` (default 300)
    ///
    /// # Errors
    ///
    /// Returns [`FortiError::ConfigMissing`] if a required variable is unset
    /// or a value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| {
                    FortiError::ConfigMissing(format!("{key} environment variable not set"))
                })
        };

        let mut config = Self::new(&required("FORTIOS_HOST")?, &required("FORTIOS_TOKEN")?)?;

        config.vdom = lookup("FORTIOS_VDOM").filter(|v| !v.trim().is_empty());

        if let Some(verify) = lookup("FORTIOS_VERIFY_TLS") {
            if matches!(verify.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no") {
                config.tls = TlsMode::AcceptInvalid;
            }
        }

        if let Some(timeout) = lookup("FORTIOS_TIMEOUT_SECS") {
            let secs = timeout.trim().parse::<u64>().map_err(|_| {
                FortiError::ConfigMissing(format!(
                    "FORTIOS_TIMEOUT_SECS must be a whole number of seconds, got '{timeout}'"
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_vdom(mut self, vdom: impl Into<String>) -> Self {
        self.vdom = Some(vdom.into());
        self
    }

    pub fn with_tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_base_url(host: &str) -> Result<Url> {
    let host = host.trim();
    let with_scheme = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };

    // Ensure base URL ends with /
    let with_slash = if with_scheme.ends_with('/') {
        with_scheme
    } else {
        format!("{with_scheme}/")
    };

    Ok(Url::parse(&with_slash)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_bare_host_gets_https() {
        let config = ClientConfig::new("fw.example.com:8443", "t").unwrap();
        assert_eq!(config.base_url.as_str(), "https://fw.example.com:8443/");

        let config = ClientConfig::new("http://127.0.0.1:8080", "t").unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("FORTIOS_HOST", "fw.example.com"),
            ("FORTIOS_TOKEN", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.vdom, None);
        assert_eq!(config.tls, TlsMode::Verify);
        assert_eq!(config.timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("FORTIOS_HOST", "fw.example.com"),
            ("FORTIOS_TOKEN", "secret"),
            ("FORTIOS_VDOM", "dmz"),
            ("FORTIOS_VERIFY_TLS", "No"),
            ("FORTIOS_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.vdom.as_deref(), Some("dmz"));
        assert_eq!(config.tls, TlsMode::AcceptInvalid);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_required() {
        let err = ClientConfig::from_lookup(lookup(&[("FORTIOS_HOST", "fw")])).unwrap_err();
        match err {
            FortiError::ConfigMissing(msg) => assert!(msg.contains("FORTIOS_TOKEN")),
            other => panic!("expected ConfigMissing, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_timeout() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("FORTIOS_HOST", "fw"),
            ("FORTIOS_TOKEN", "t"),
            ("FORTIOS_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, FortiError::ConfigMissing(_)));
    }

    #[test]
    fn test_token_not_in_debug() {
        let config = ClientConfig::new("fw", "super-secret").unwrap();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
