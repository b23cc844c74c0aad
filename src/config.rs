//! Gateway Configuration
//!
//! Settings are read from `GATEWAY_*` environment variables with defaults for
//! everything; `main` applies command-line overrides on top.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: String,
    pub elastic_url: String,
    pub redis_url: String,
    pub request_timeout_ms: u64,
    pub recent_limit: usize,
    /// Keep only the newest N journal entries per user. `None` keeps everything.
    pub journal_retention: Option<usize>,
    pub journal_queue: usize,
    pub max_hits: usize,
    pub default_user: String,
    pub in_memory: bool,
    pub seed_csv: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".into(),
            elastic_url: "http://127.0.0.1:9200".into(),
            redis_url: "redis://127.0.0.1:6379/".into(),
            request_timeout_ms: 5_000,
            recent_limit: 3,
            journal_retention: None,
            journal_queue: 1_024,
            max_hits: 10,
            default_user: "userID".into(),
            in_memory: false,
            seed_csv: None,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = std::env::var("GATEWAY_BIND").unwrap_or(defaults.bind_addr);
        let elastic_url = std::env::var("GATEWAY_ELASTIC_URL").unwrap_or(defaults.elastic_url);
        let redis_url = std::env::var("GATEWAY_REDIS_URL").unwrap_or(defaults.redis_url);
        let request_timeout_ms =
            env_parse("GATEWAY_REQUEST_TIMEOUT_MS").unwrap_or(defaults.request_timeout_ms);
        let recent_limit = env_parse("GATEWAY_RECENT_LIMIT").unwrap_or(defaults.recent_limit);
        let journal_retention = env_parse::<usize>("GATEWAY_JOURNAL_RETENTION").filter(|n| *n > 0);
        let journal_queue = env_parse("GATEWAY_JOURNAL_QUEUE").unwrap_or(defaults.journal_queue);
        let max_hits = env_parse("GATEWAY_MAX_HITS").unwrap_or(defaults.max_hits);
        let default_user = std::env::var("GATEWAY_DEFAULT_USER")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or(defaults.default_user);
        let in_memory = std::env::var("GATEWAY_IN_MEMORY")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let seed_csv = std::env::var("GATEWAY_SEED_CSV").ok().filter(|p| !p.is_empty());

        Self {
            bind_addr,
            elastic_url,
            redis_url,
            request_timeout_ms,
            recent_limit,
            journal_retention,
            journal_queue,
            max_hits,
            default_user,
            in_memory,
            seed_csv,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::GatewayConfig;

    #[test]
    fn from_env_reads_overrides() {
        unsafe {
            std::env::set_var("GATEWAY_BIND", "127.0.0.1:9999");
            std::env::set_var("GATEWAY_REQUEST_TIMEOUT_MS", "250");
            std::env::set_var("GATEWAY_JOURNAL_RETENTION", "50");
            std::env::set_var("GATEWAY_IN_MEMORY", "true");
        }

        let cfg = GatewayConfig::from_env();

        assert_eq!(cfg.bind_addr, "127.0.0.1:9999");
        assert_eq!(cfg.request_timeout_ms, 250);
        assert_eq!(cfg.journal_retention, Some(50));
        assert!(cfg.in_memory);
        assert_eq!(cfg.recent_limit, 3);
        assert_eq!(cfg.default_user, "userID");

        unsafe {
            std::env::remove_var("GATEWAY_BIND");
            std::env::remove_var("GATEWAY_REQUEST_TIMEOUT_MS");
            std::env::remove_var("GATEWAY_JOURNAL_RETENTION");
            std::env::remove_var("GATEWAY_IN_MEMORY");
        }
    }

    #[test]
    fn defaults_match_observed_behavior() {
        let cfg = GatewayConfig::default();
        assert_eq!(cfg.recent_limit, 3);
        assert_eq!(cfg.max_hits, 10);
        assert!(cfg.journal_retention.is_none());
        assert!(cfg.seed_csv.is_none());
    }
}
