// src/config/app.rs
use anyhow::{bail, Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_BACKUP_POLL_INTERVAL_SECS: u64 = 120;
pub const DEFAULT_STORE_CAPACITY: usize = 50;
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_OFFICIAL_THRESHOLD: u8 = 90;

/// Runtime settings, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub poll_interval: Duration,
    pub backup_poll_interval: Duration,
    pub store_capacity: usize,
    pub source_timeout: Duration,
    /// Source confidence at or above this marks a move as official.
    pub official_threshold: u8,
    pub sources_path: Option<PathBuf>,
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            backup_poll_interval: Duration::from_secs(DEFAULT_BACKUP_POLL_INTERVAL_SECS),
            store_capacity: DEFAULT_STORE_CAPACITY,
            source_timeout: Duration::from_secs(DEFAULT_SOURCE_TIMEOUT_SECS),
            official_threshold: DEFAULT_OFFICIAL_THRESHOLD,
            sources_path: None,
            json_logs: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup; unset or blank keys fall back to defaults.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let val = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = Self::default();

        if let Some(v) = val("BIND_ADDR") {
            cfg.bind_addr = v.parse().with_context(|| format!("BIND_ADDR={v}"))?;
        }
        if let Some(v) = val("PORT") {
            cfg.port = v.parse().with_context(|| format!("PORT={v}"))?;
        }
        if let Some(v) = val("POLL_INTERVAL_SECS") {
            cfg.poll_interval = secs("POLL_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = val("BACKUP_POLL_INTERVAL_SECS") {
            cfg.backup_poll_interval = secs("BACKUP_POLL_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = val("STORE_CAPACITY") {
            cfg.store_capacity = v
                .parse()
                .with_context(|| format!("STORE_CAPACITY={v}"))?;
            if cfg.store_capacity == 0 {
                bail!("STORE_CAPACITY must be > 0");
            }
        }
        if let Some(v) = val("SOURCE_TIMEOUT_SECS") {
            cfg.source_timeout = secs("SOURCE_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = val("OFFICIAL_CONFIDENCE_THRESHOLD") {
            let t: i64 = v
                .parse()
                .with_context(|| format!("OFFICIAL_CONFIDENCE_THRESHOLD={v}"))?;
            cfg.official_threshold = t.clamp(0, 100) as u8;
        }
        cfg.sources_path = val("MOVES_SOURCES_PATH").map(PathBuf::from);
        cfg.json_logs = val("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json"));

        Ok(cfg)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn secs(key: &str, v: &str) -> Result<Duration> {
    let n: u64 = v.parse().with_context(|| format!("{key}={v}"))?;
    if n == 0 {
        bail!("{key} must be > 0");
    }
    Ok(Duration::from_secs(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let m: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| m.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let c = cfg(&[]).unwrap();
        assert_eq!(c, AppConfig::default());
        assert_eq!(c.poll_interval, Duration::from_secs(30));
        assert_eq!(c.store_capacity, 50);
        assert_eq!(c.official_threshold, 90);
    }

    #[test]
    fn overrides_and_clamp() {
        let c = cfg(&[
            ("PORT", "9001"),
            ("POLL_INTERVAL_SECS", "5"),
            ("OFFICIAL_CONFIDENCE_THRESHOLD", "250"),
            ("LOG_FORMAT", "JSON"),
            ("MOVES_SOURCES_PATH", " config/alt.toml "),
        ])
        .unwrap();
        assert_eq!(c.port, 9001);
        assert_eq!(c.poll_interval, Duration::from_secs(5));
        assert_eq!(c.official_threshold, 100);
        assert!(c.json_logs);
        assert_eq!(c.sources_path, Some(PathBuf::from("config/alt.toml")));
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(cfg(&[("PORT", "eighty")]).is_err());
        assert!(cfg(&[("STORE_CAPACITY", "0")]).is_err());
        assert!(cfg(&[("POLL_INTERVAL_SECS", "0")]).is_err());
        let err = cfg(&[("SOURCE_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(format!("{err:#}").contains("SOURCE_TIMEOUT_SECS"));
    }

    #[test]
    fn blank_is_default() {
        let c = cfg(&[("PORT", "  ")]).unwrap();
        assert_eq!(c.port, DEFAULT_PORT);
    }
}
