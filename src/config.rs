use crate::relay::ConnectionSettings;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub send_timeout: Duration,
    pub outbound_queue: usize,
    pub match_idle_ttl: Duration,
    pub reap_interval: Duration,
    pub session_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: "sqlite::memory:".to_string(),
            send_timeout: Duration::from_millis(5000),
            outbound_queue: 64,
            match_idle_ttl: Duration::from_secs(600),
            reap_interval: Duration::from_secs(60),
            session_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values keep their default
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.parse::<u64>().ok());

        Self {
            port: parse_or(&lookup, "PORT", defaults.port),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            send_timeout: parsed("SEND_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.send_timeout),
            outbound_queue: parse_or(&lookup, "OUTBOUND_QUEUE", defaults.outbound_queue),
            match_idle_ttl: parsed("MATCH_IDLE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.match_idle_ttl),
            reap_interval: parsed("REAP_INTERVAL_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.reap_interval),
            session_ttl: parsed("SESSION_TTL_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_ttl),
        }
    }

    pub fn addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            outbound_queue: self.outbound_queue,
            send_timeout: self.send_timeout,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}
