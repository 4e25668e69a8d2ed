use std::fmt;

use chrono::TimeDelta;

use crate::models::student::DEFAULT_STUCK_MINUTES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String },
    Missing(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value } => write!(f, "Invalid value for {key}: '{value}'"),
            ConfigError::Missing(key) => write!(f, "Missing required setting {key}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Process settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: String,
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub session_key: Option<String>,
    pub stuck_threshold_minutes: i64,
    pub stuck_scan_interval_secs: u64,
    pub provision: bool,
    pub admin_password: String,
    pub event_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            backend: StoreBackend::Postgres,
            database_url: None,
            session_key: None,
            stuck_threshold_minutes: DEFAULT_STUCK_MINUTES,
            stuck_scan_interval_secs: 300,
            provision: false,
            admin_password: "admin123".to_string(),
            event_name: "UDAAN Campus Arrival".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment (after `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; missing keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = AppConfig::default();

        if let Some(bind) = lookup("UDAAN_BIND") {
            cfg.bind = bind;
        }
        if let Some(store) = lookup("UDAAN_STORE") {
            cfg.backend = match store.trim().to_lowercase().as_str() {
                "postgres" => StoreBackend::Postgres,
                "memory" => StoreBackend::Memory,
                _ => return Err(ConfigError::Invalid { key: "UDAAN_STORE", value: store }),
            };
        }
        cfg.database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        cfg.session_key = lookup("SESSION_KEY");

        if let Some(v) = lookup("STUCK_THRESHOLD_MINUTES") {
            cfg.stuck_threshold_minutes = v
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0 && TimeDelta::try_minutes(*m).is_some())
                .ok_or(ConfigError::Invalid { key: "STUCK_THRESHOLD_MINUTES", value: v })?;
        }
        if let Some(v) = lookup("STUCK_SCAN_INTERVAL_SECS") {
            cfg.stuck_scan_interval_secs = v
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid { key: "STUCK_SCAN_INTERVAL_SECS", value: v })?;
        }
        if let Some(v) = lookup("UDAAN_PROVISION") {
            cfg.provision = match v.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => return Err(ConfigError::Invalid { key: "UDAAN_PROVISION", value: v }),
            };
        }
        if let Some(v) = lookup("ADMIN_PASSWORD").filter(|v| !v.is_empty()) {
            cfg.admin_password = v;
        }
        if let Some(v) = lookup("UDAAN_EVENT_NAME").filter(|v| !v.trim().is_empty()) {
            cfg.event_name = v;
        }

        if cfg.backend == StoreBackend::Postgres && cfg.database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        Ok(cfg)
    }

    pub fn stuck_threshold(&self) -> TimeDelta {
        TimeDelta::try_minutes(self.stuck_threshold_minutes)
            .unwrap_or_else(|| TimeDelta::minutes(DEFAULT_STUCK_MINUTES))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn memory_store_needs_no_database_url() {
        let cfg = load(&[("UDAAN_STORE", "memory")]).unwrap();
        assert_eq!(cfg.backend, StoreBackend::Memory);
        assert_eq!(cfg.stuck_threshold_minutes, 45);
        assert_eq!(cfg.bind, "127.0.0.1:8080");
    }

    #[test]
    fn postgres_store_requires_database_url() {
        assert!(matches!(load(&[]), Err(ConfigError::Missing("DATABASE_URL"))));
        let cfg = load(&[("DATABASE_URL", "postgres://localhost/udaan")]).unwrap();
        assert_eq!(cfg.backend, StoreBackend::Postgres);
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = load(&[("UDAAN_STORE", "memory"), ("STUCK_THRESHOLD_MINUTES", "soon")]);
        assert!(matches!(err, Err(ConfigError::Invalid { key: "STUCK_THRESHOLD_MINUTES", .. })));
        let err = load(&[("UDAAN_STORE", "memory"), ("STUCK_THRESHOLD_MINUTES", "0")]);
        assert!(err.is_err());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let huge = i64::MAX.to_string();
        let err = load(&[("UDAAN_STORE", "memory"), ("STUCK_THRESHOLD_MINUTES", &huge)]);
        assert!(matches!(err, Err(ConfigError::Invalid { key: "STUCK_THRESHOLD_MINUTES", .. })));

        let cfg = load(&[("UDAAN_STORE", "memory"), ("STUCK_THRESHOLD_MINUTES", "90")]).unwrap();
        assert_eq!(cfg.stuck_threshold(), TimeDelta::minutes(90));
    }
}
