use std::env;
use std::time::Duration;

/// Application configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Upper bound on a single ledger write, in milliseconds
    pub tx_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup, e.g. a map in tests
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| "DATABASE_URL must be set".to_string())?;

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "8095".to_string())
            .parse()
            .map_err(|_| "PORT must be a valid u16".to_string())?;

        let tx_timeout_ms: u64 = lookup("LEDGER_TX_TIMEOUT_MS")
            .unwrap_or_else(|| "5000".to_string())
            .parse()
            .map_err(|_| "LEDGER_TX_TIMEOUT_MS must be a positive integer".to_string())?;
        if tx_timeout_ms == 0 {
            return Err("LEDGER_TX_TIMEOUT_MS must be greater than zero".to_string());
        }

        Ok(Config {
            database_url,
            host,
            port,
            tx_timeout_ms,
        })
    }

    pub fn tx_timeout(&self) -> Duration {
        Duration::from_millis(self.tx_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply() {
        let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8095);
        assert_eq!(config.tx_timeout(), Duration::from_millis(5000));
    }

    #[test]
    fn test_missing_database_url_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.contains("DATABASE_URL"));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("LEDGER_TX_TIMEOUT_MS", "0"),
        ]))
        .unwrap_err();
        assert!(err.contains("greater than zero"));
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("PORT", "http"),
        ]))
        .unwrap_err();
        assert!(err.contains("PORT"));
    }
}
